//=========================================================================
// Input Event Types
//=========================================================================
//
// Platform-independent keyboard and mouse events.
//
// Event Flow:
// ```text
// Platform Layer (Winit / headless script)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputState (pressed / held / released per frame)
//         ↓
//    Layers (queried during update)
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button (side buttons, thumb buttons, macro keys).
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ControlLeft,
    AltLeft,
}

//=== Modifiers ===========================================================

/// Modifier key state captured with each discrete event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

//=== InputEvent ==========================================================

/// Low-level input event delivered by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown { key: KeyCode, modifiers: Modifiers },
    KeyUp { key: KeyCode, modifiers: Modifiers },
    MouseButtonDown { button: MouseButton, modifiers: Modifiers },
    MouseButtonUp { button: MouseButton, modifiers: Modifiers },

    /// Cursor position in window space (pixels, top-left origin).
    MouseMoved { x: f32, y: f32 },

    /// Wheel movement in lines (positive y scrolls up).
    MouseScrolled { dx: f32, dy: f32 },
}

impl InputEvent {
    /// Modifier state carried by discrete events, `None` otherwise.
    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::MouseButtonDown { modifiers, .. }
            | Self::MouseButtonUp { modifiers, .. } => Some(*modifiers),
            Self::MouseMoved { .. } | Self::MouseScrolled { .. } => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
