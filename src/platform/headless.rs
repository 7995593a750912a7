//=========================================================================
// Headless Platform
//=========================================================================
//
// Window and presentation backends that need no display server.
//
// Architecture:
// ```text
//   EventInjector (any thread) ──Sender──> HeadlessWindow
//                                            └─ EventCollector::collect_frame()
//
//   HeadlessBackend: counts begin/end/present calls, records resizes
//                    and the requested vsync mode
// ```
//
// Used by the demo binary, CI and integration tests.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Sender};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{EventCollector, PresentBackend, WindowBackend, WindowEvent};

//=== EventInjector =======================================================

/// Cloneable handle for feeding events into a [`HeadlessWindow`].
#[derive(Debug, Clone)]
pub struct EventInjector {
    sender: Sender<WindowEvent>,
}

impl EventInjector {
    /// Queues `event` for the next poll. Returns `false` once the window is gone.
    pub fn send(&self, event: WindowEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

//=== HeadlessWindow ======================================================

/// Window backend fed by an [`EventInjector`].
///
/// With a frame limit set, `CloseRequested` is emitted on the poll that
/// reaches the limit.
#[derive(Debug)]
pub struct HeadlessWindow {
    collector: EventCollector,
    sender: Sender<WindowEvent>,
    size: (u32, u32),
    frame_limit: Option<u64>,
    polls: u64,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        let (sender, receiver) = unbounded();
        debug!(target: "platform", "Headless window created: {}x{}", width, height);
        Self {
            collector: EventCollector::new(receiver),
            sender,
            size: (width, height),
            frame_limit: None,
            polls: 0,
        }
    }

    /// Requests close after `frames` polls.
    ///
    /// # Panics
    ///
    /// Panics if `frames == 0`.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        assert!(frames > 0, "Frame limit must be positive");
        self.frame_limit = Some(frames);
        self
    }

    pub fn injector(&self) -> EventInjector {
        EventInjector {
            sender: self.sender.clone(),
        }
    }

    /// Number of completed polls.
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl WindowBackend for HeadlessWindow {
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        self.polls += 1;

        for event in self.collector.collect_frame() {
            if let WindowEvent::Resized { width, height } = *event {
                self.size = (width, height);
            }
            events.push(*event);
        }

        if self.frame_limit.is_some_and(|limit| self.polls >= limit) {
            trace!(target: "platform", "Frame limit reached after {} polls", self.polls);
            events.push(WindowEvent::CloseRequested);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}

//=== HeadlessBackend =====================================================

/// Presentation backend that only counts calls.
#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    begun: u64,
    ended: u64,
    presented: u64,
    resizes: Vec<(u32, u32)>,
    vsync: Option<bool>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_begun(&self) -> u64 {
        self.begun
    }

    pub fn frames_ended(&self) -> u64 {
        self.ended
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Every non-zero resize, oldest first.
    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    /// Last vsync mode requested, `None` before any request.
    pub fn vsync(&self) -> Option<bool> {
        self.vsync
    }
}

impl PresentBackend for HeadlessBackend {
    fn begin_frame(&mut self) {
        self.begun += 1;
    }

    fn end_frame(&mut self) {
        self.ended += 1;
    }

    fn present(&mut self) {
        self.presented += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn set_vsync(&mut self, vsync: bool) {
        self.vsync = Some(vsync);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
