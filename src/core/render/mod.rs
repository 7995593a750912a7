//=========================================================================
// Render Synchronization
//=========================================================================
//
// Frame-pump protocol between the producer (frame loop) and the
// consumer (render thread).
//
// Architecture:
//   RenderThread
//     ├─ RenderSync: Mutex<RenderState> + Condvar + running flag
//     ├─ Worker("Render Thread")        (MultiThreaded only)
//     └─ Arc<dyn CommandQueue>          (DoubleBufferedQueue)
//
//=========================================================================

//=== Module Declarations =================================================

mod command_queue;
mod render_thread;
mod state;

//=== Public API ==========================================================

pub use command_queue::{CommandQueue, DoubleBufferedQueue, RenderCommand};
pub use render_thread::{ConsumerProbe, RenderThread};
pub use state::{RenderState, ThreadingPolicy};
