//=========================================================================
// Layer Stack
//=========================================================================
//
// Ordered collection of per-frame update units.
//
// Architecture:
// ```text
//   layers: [ L0, L1, L2 | O0, O1 ]
//                         ↑ overlay_start
//
//   update order: L0 → L1 → L2 → O0 → O1
//   event order:  O1 → O0 → L2 → L1 → L0   (stops once handled)
// ```
//
// Overlays (debug UI, consoles) always sit above regular layers.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::input::InputState;
use crate::core::platform_bridge::WindowEvent;
use crate::core::render::{CommandQueue, ConsumerProbe, DoubleBufferedQueue};
use crate::core::time::{FrameTime, Timestep};

//=== FrameContext ========================================================

/// Per-frame view handed to [`Layer::on_update`].
///
/// Commands submitted here are recorded into the writable buffer and run
/// during this frame's pump.
pub struct FrameContext<'a> {
    queue: &'a Arc<DoubleBufferedQueue>,
    input: &'a InputState,
    probe: &'a ConsumerProbe,
    time: FrameTime,
    frame: u64,
    close_requested: bool,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        queue: &'a Arc<DoubleBufferedQueue>,
        input: &'a InputState,
        probe: &'a ConsumerProbe,
        time: FrameTime,
        frame: u64,
    ) -> Self {
        Self {
            queue,
            input,
            probe,
            time,
            frame,
            close_requested: false,
        }
    }

    /// Records a render command for this frame.
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit(Box::new(command));
    }

    /// Shared queue handle, for subsystems that submit from elsewhere.
    pub fn queue(&self) -> &Arc<DoubleBufferedQueue> {
        self.queue
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Render-thread identity probe, for commands that assert their context.
    pub fn consumer_probe(&self) -> &ConsumerProbe {
        self.probe
    }

    /// Clamped simulation step.
    pub fn timestep(&self) -> Timestep {
        self.time.timestep
    }

    pub fn frame_time(&self) -> FrameTime {
        self.time
    }

    /// Index of the frame being recorded (pumps completed so far).
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Asks the application to stop after this frame.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

//=== Layer Trait =========================================================

/// A unit of per-frame application logic.
///
/// Only `on_update` is required.
pub trait Layer {
    fn name(&self) -> &str {
        "Layer"
    }

    /// Called when pushed onto the stack.
    fn on_attach(&mut self) {}

    /// Called when popped from the stack or at shutdown.
    fn on_detach(&mut self) {}

    /// Called once per non-minimized frame, between backend begin/end.
    fn on_update(&mut self, context: &mut FrameContext<'_>);

    /// Returns `true` if the event was handled and must not propagate.
    fn on_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    /// Disabled layers are skipped for updates and events.
    fn is_enabled(&self) -> bool {
        true
    }
}

//=== LayerStack ==========================================================

/// Layers followed by overlays, with attach/detach lifecycle.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
    overlay_start: usize,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Stack Operations -------------------------------------------------

    /// Inserts a regular layer below every overlay and attaches it.
    pub fn push_layer(&mut self, mut layer: Box<dyn Layer>) {
        debug!(target: "layer_stack", "Attaching layer '{}'", layer.name());
        layer.on_attach();
        self.layers.insert(self.overlay_start, layer);
        self.overlay_start += 1;
    }

    /// Pushes an overlay on top of the stack and attaches it.
    pub fn push_overlay(&mut self, mut overlay: Box<dyn Layer>) {
        debug!(target: "layer_stack", "Attaching overlay '{}'", overlay.name());
        overlay.on_attach();
        self.layers.push(overlay);
    }

    /// Detaches and returns the topmost regular layer.
    pub fn pop_layer(&mut self) -> Option<Box<dyn Layer>> {
        if self.overlay_start == 0 {
            return None;
        }
        self.overlay_start -= 1;
        let mut layer = self.layers.remove(self.overlay_start);
        layer.on_detach();
        Some(layer)
    }

    /// Detaches and returns the topmost overlay.
    pub fn pop_overlay(&mut self) -> Option<Box<dyn Layer>> {
        if self.layers.len() == self.overlay_start {
            return None;
        }
        let mut overlay = self.layers.pop()?;
        overlay.on_detach();
        Some(overlay)
    }

    /// Detaches every layer, top to bottom, and empties the stack.
    pub fn clear(&mut self) {
        while let Some(mut layer) = self.layers.pop() {
            layer.on_detach();
        }
        self.overlay_start = 0;
    }

    //--- Frame Dispatch ---------------------------------------------------

    /// Updates enabled layers bottom to top.
    pub fn update(&mut self, context: &mut FrameContext<'_>) {
        for layer in self.layers.iter_mut().filter(|layer| layer.is_enabled()) {
            layer.on_update(context);
        }
    }

    /// Offers `event` to enabled layers top to bottom.
    ///
    /// Returns `true` if some layer handled it.
    pub fn dispatch_event(&mut self, event: &WindowEvent) -> bool {
        self.layers
            .iter_mut()
            .rev()
            .filter(|layer| layer.is_enabled())
            .any(|layer| layer.on_event(event))
    }

    //--- Queries ----------------------------------------------------------

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names bottom to top.
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
