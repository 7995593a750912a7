//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use zenith_runtime::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Application
pub use crate::engine::{AppError, Application};

// Configuration
pub use crate::core::config::{AppConfig, AppConfigBuilder};

// Render thread
pub use crate::core::render::{CommandQueue, DoubleBufferedQueue, RenderThread, ThreadingPolicy};

// Layers
pub use crate::core::layer::{FrameContext, Layer};

// Input
pub use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

// Platform
pub use crate::core::platform_bridge::{PresentBackend, WindowBackend, WindowEvent};
