//=========================================================================
// Render State
//=========================================================================
//
// Threading policy and the producer/consumer handshake states.
//
// Cycle:
// ```text
//   Idle ──kick()──> Kicked ──consumer dequeues──> Running
//    ↑                                               │
//    └──────────────consumer finishes────────────────┘
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== ThreadingPolicy =====================================================

/// Whether rendering work runs on a dedicated thread.
///
/// Fixed when the coordinator is created. Under `SingleThreaded` every
/// wait/set operation is a no-op and work executes inline on the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadingPolicy {
    SingleThreaded,
    MultiThreaded,
}

impl ThreadingPolicy {
    pub fn is_multi_threaded(self) -> bool {
        matches!(self, Self::MultiThreaded)
    }
}

impl Default for ThreadingPolicy {
    fn default() -> Self {
        Self::MultiThreaded
    }
}

//=== RenderState =========================================================

/// Coordinator-wide handshake state. Starts at [`RenderState::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// Consumer finished its last batch and is available.
    Idle,

    /// Producer handed off a batch; consumer has not started it.
    Kicked,

    /// Consumer is executing the batch.
    Running,
}

impl RenderState {
    /// Returns `true` if `self → next` is an edge of the handshake cycle.
    pub fn can_transition_to(self, next: RenderState) -> bool {
        matches!(
            (self, next),
            (RenderState::Idle, RenderState::Kicked)
                | (RenderState::Kicked, RenderState::Running)
                | (RenderState::Running, RenderState::Idle)
        )
    }

    /// The state that follows `self` in the cycle.
    pub fn successor(self) -> RenderState {
        match self {
            RenderState::Idle => RenderState::Kicked,
            RenderState::Kicked => RenderState::Running,
            RenderState::Running => RenderState::Idle,
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::Idle
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
