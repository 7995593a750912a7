//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges window/presentation backends (winit, headless) with the
// frame loop.
//
// Components:
// - `interface`: WindowEvent, WindowBackend, PresentBackend, PlatformError
// - `event_collector`: bounded per-frame drain of an event channel
//
//=========================================================================

//=== Module Declarations =================================================

mod event_collector;
mod interface;

//=== Public API ==========================================================

pub use event_collector::EventCollector;
pub use interface::{PlatformError, PresentBackend, WindowBackend, WindowEvent};
