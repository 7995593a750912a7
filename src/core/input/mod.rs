//=========================================================================
// Input
//=========================================================================
//
// Platform-independent input events and per-frame input state.
//
// Components:
// - `event`: InputEvent, KeyCode, MouseButton, Modifiers
// - `input_state`: pressed / held / released tracking
//
// Notes:
// The application transitions input state at the start of each frame
// and clears released keys at the end, around the render pump.
//
//=========================================================================

//=== Module Declarations =================================================

mod event;
mod input_state;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use input_state::{InputState, KeyState};
