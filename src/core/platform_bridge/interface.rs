//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Contract between window/presentation backends and the frame loop.
//
// The frame loop only ever sees these types; Winit, headless and test
// backends all implement the same two traits.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== WindowEvent =========================================================

/// Window-level event delivered to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// User or OS asked the window to close.
    CloseRequested,

    /// Client area changed size. Zero sizes are reported as-is.
    Resized { width: u32, height: u32 },

    /// Window was minimized (`true`) or restored (`false`).
    Minimized(bool),

    /// Window gained (`true`) or lost (`false`) focus.
    Focused(bool),

    /// Keyboard or mouse input.
    Input(InputEvent),
}

//=== WindowBackend =======================================================

/// Source of window events, polled once per frame on the producer thread.
pub trait WindowBackend {
    /// Appends every event that arrived since the previous poll.
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>);

    /// Current client-area size in physical pixels.
    fn size(&self) -> (u32, u32);
}

//=== PresentBackend ======================================================

/// Presentation collaborator driven by the frame loop.
///
/// Called on the producer thread, never inside the pump boundary:
/// `begin_frame` → [layer updates] → `end_frame` → pump → `present`.
pub trait PresentBackend {
    fn begin_frame(&mut self);

    fn end_frame(&mut self);

    /// Presents / swaps the finished frame.
    fn present(&mut self);

    /// Called for non-zero resizes.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Applies the configured vsync mode. Called once before the first frame.
    fn set_vsync(&mut self, _vsync: bool) {}
}

//=== PlatformError =======================================================

/// Platform initialization errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(String),

    /// The OS refused to create the window.
    #[error("window creation failed: {0}")]
    WindowCreation(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
