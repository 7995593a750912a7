//=========================================================================
// Threading Primitives
//=========================================================================
//
// Building blocks shared by the render-thread coordinator:
// - `signal`: binary wait/notify event (auto-reset / manual-reset)
// - `worker`: named background execution context
//
//=========================================================================

//=== Module Declarations =================================================

mod signal;
mod worker;

//=== Public API ==========================================================

pub use signal::{SignalMode, ThreadSignal};
pub use worker::{ThreadError, Worker};
