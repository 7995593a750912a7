//=========================================================================
// Winit Window
//=========================================================================
//
// Desktop window backend driven by Winit's pump-events API.
//
// Architecture:
// ```text
//   Producer Thread (per frame):
//     WinitWindow::poll_events()
//       └─ EventLoop::pump_app_events(timeout = 0)
//            └─ WinitHandler (ApplicationHandler)
//                 ├─ InputProcessor: Winit input → InputEvent
//                 └─ Sender<WindowEvent>
//       └─ EventCollector::collect_frame() → frame loop
// ```
//
// The frame loop owns pacing, so the event loop is pumped without
// blocking instead of taking over the thread with `run_app`.
//
// Must be created and polled on the main thread (macOS requirement).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use log::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent as WinitWindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::input_processor::InputProcessor;
use crate::core::config::AppConfig;
use crate::core::platform_bridge::{EventCollector, PlatformError, WindowBackend, WindowEvent};

//=== WinitHandler ========================================================

/// Receives Winit callbacks during a pump and forwards engine events.
struct WinitHandler {
    window: Option<Window>,
    title: String,
    size: (u32, u32),
    resizable: bool,
    sender: Sender<WindowEvent>,
    input_processor: InputProcessor,
    creation_error: Option<String>,
}

impl WinitHandler {
    fn new(config: &AppConfig, sender: Sender<WindowEvent>) -> Self {
        Self {
            window: None,
            title: config.name.clone(),
            size: (config.window_width, config.window_height),
            resizable: config.resizable,
            sender,
            input_processor: InputProcessor::new(),
            creation_error: None,
        }
    }

    fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1))
            .with_resizable(self.resizable)
    }

    fn forward(&self, event: WindowEvent) {
        if self.sender.send(event).is_err() {
            warn!(target: "platform", "Event channel closed, dropping {:?}", event);
        }
    }

    /// Maps a Winit window event to its engine counterpart, updating
    /// modifier and size state on the way.
    fn translate(&mut self, event: &WinitWindowEvent) -> Option<WindowEvent> {
        match event {
            WinitWindowEvent::CloseRequested => Some(WindowEvent::CloseRequested),

            WinitWindowEvent::Resized(size) => {
                self.size = (size.width, size.height);
                Some(WindowEvent::Resized {
                    width: size.width,
                    height: size.height,
                })
            }

            WinitWindowEvent::Occluded(occluded) => Some(WindowEvent::Minimized(*occluded)),

            WinitWindowEvent::Focused(focused) => Some(WindowEvent::Focused(*focused)),

            WinitWindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
                None
            }

            WinitWindowEvent::KeyboardInput { event: key_event, .. } => {
                let event = self.input_processor.process_key_event(key_event);
                if event.is_none() {
                    trace!(target: "platform::input", "Unmapped key ignored");
                }
                event.map(WindowEvent::Input)
            }

            WinitWindowEvent::MouseInput { state, button, .. } => Some(WindowEvent::Input(
                self.input_processor.process_mouse_button(*button, *state),
            )),

            WinitWindowEvent::CursorMoved { position, .. } => Some(WindowEvent::Input(
                self.input_processor
                    .process_mouse_move(position.x as f32, position.y as f32),
            )),

            WinitWindowEvent::MouseWheel { delta, .. } => Some(WindowEvent::Input(
                self.input_processor.process_mouse_wheel(*delta),
            )),

            _ => None,
        }
    }
}

impl ApplicationHandler for WinitHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (resume)");
            return;
        }

        match event_loop.create_window(self.attributes()) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.size = (size.width, size.height);
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.creation_error = Some(e.to_string());
                self.forward(WindowEvent::CloseRequested);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WinitWindowEvent,
    ) {
        if matches!(event, WinitWindowEvent::CloseRequested) {
            info!(target: "platform", "Window close requested");
            event_loop.exit();
        }

        if let Some(event) = self.translate(&event) {
            self.forward(event);
        }
    }
}

//=== WinitWindow =========================================================

/// OS window polled once per frame by the frame loop.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    handler: WinitHandler,
    collector: EventCollector,
    exited: bool,
}

impl WinitWindow {
    /// Creates the event loop and the window described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop or the window cannot
    /// be created.
    pub fn new(config: &AppConfig) -> Result<Self, PlatformError> {
        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;
        let (sender, receiver) = unbounded();

        let mut window = Self {
            event_loop,
            handler: WinitHandler::new(config, sender),
            collector: EventCollector::new(receiver),
            exited: false,
        };

        // Windows are created lazily in `resumed`, which the first pump delivers.
        window.pump();
        if let Some(reason) = window.handler.creation_error.take() {
            return Err(PlatformError::WindowCreation(reason));
        }

        Ok(window)
    }

    /// Underlying Winit window, for surface creation by a present backend.
    pub fn window(&self) -> Option<&Window> {
        self.handler.window.as_ref()
    }

    fn pump(&mut self) {
        if self.exited {
            return;
        }

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let PumpStatus::Exit(code) = status {
            debug!(target: "platform", "Event loop exited with code {}", code);
            self.exited = true;
            self.handler.window = None;
        }
    }
}

impl WindowBackend for WinitWindow {
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        let was_exited = self.exited;
        self.pump();

        events.extend_from_slice(self.collector.collect_frame());

        if self.exited && !was_exited && !events.contains(&WindowEvent::CloseRequested) {
            events.push(WindowEvent::CloseRequested);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.handler.size
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
