//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit input events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent → WindowEvent::Input
//
// Stateful modifier tracking: the last ModifiersChanged state is applied
// to every subsequent key/button event. Unmapped keys return None.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

// Touchpads report pixels; the engine reports wheel lines.
const PIXELS_PER_LINE: f32 = 20.0;

//=== InputProcessor ======================================================

/// Converts Winit events to engine InputEvents with sticky modifiers.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    pub(crate) fn update_modifiers(&mut self, state: ModifiersState) {
        self.current_modifiers = Modifiers {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        };
    }

    #[cfg(test)]
    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a keyboard event; unmapped keys are filtered out.
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = key_event.physical_key else {
            return None;
        };
        let key = map_key_code(code)?;
        Some(self.key_input_event(key, key_event.state))
    }

    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> InputEvent {
        let button = map_mouse_button(button);
        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown {
                button,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::MouseButtonUp {
                button,
                modifiers: self.current_modifiers,
            },
        }
    }

    pub(crate) fn process_mouse_move(&self, x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    pub(crate) fn process_mouse_wheel(&self, delta: MouseScrollDelta) -> InputEvent {
        let (dx, dy) = match delta {
            MouseScrollDelta::LineDelta(dx, dy) => (dx, dy),
            MouseScrollDelta::PixelDelta(position) => (
                position.x as f32 / PIXELS_PER_LINE,
                position.y as f32 / PIXELS_PER_LINE,
            ),
        };
        InputEvent::MouseScrolled { dx, dy }
    }

    //--- Internal Helpers -------------------------------------------------

    fn key_input_event(&self, key: KeyCode, state: ElementState) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::KeyDown {
                key,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::KeyUp {
                key,
                modifiers: self.current_modifiers,
            },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Maps Winit physical key codes to engine key codes.
///
/// Covers A-Z, 0-9, arrows and common special keys; anything else
/// (function keys, numpad, media keys) is `None`.
fn map_key_code(code: WinitKeyCode) -> Option<KeyCode> {
    use WinitKeyCode as W;
    let key = match code {
        //--- Digits -------------------------------------------------------
        W::Digit0 => KeyCode::Digit0,
        W::Digit1 => KeyCode::Digit1,
        W::Digit2 => KeyCode::Digit2,
        W::Digit3 => KeyCode::Digit3,
        W::Digit4 => KeyCode::Digit4,
        W::Digit5 => KeyCode::Digit5,
        W::Digit6 => KeyCode::Digit6,
        W::Digit7 => KeyCode::Digit7,
        W::Digit8 => KeyCode::Digit8,
        W::Digit9 => KeyCode::Digit9,

        //--- Letters ------------------------------------------------------
        W::KeyA => KeyCode::KeyA,
        W::KeyB => KeyCode::KeyB,
        W::KeyC => KeyCode::KeyC,
        W::KeyD => KeyCode::KeyD,
        W::KeyE => KeyCode::KeyE,
        W::KeyF => KeyCode::KeyF,
        W::KeyG => KeyCode::KeyG,
        W::KeyH => KeyCode::KeyH,
        W::KeyI => KeyCode::KeyI,
        W::KeyJ => KeyCode::KeyJ,
        W::KeyK => KeyCode::KeyK,
        W::KeyL => KeyCode::KeyL,
        W::KeyM => KeyCode::KeyM,
        W::KeyN => KeyCode::KeyN,
        W::KeyO => KeyCode::KeyO,
        W::KeyP => KeyCode::KeyP,
        W::KeyQ => KeyCode::KeyQ,
        W::KeyR => KeyCode::KeyR,
        W::KeyS => KeyCode::KeyS,
        W::KeyT => KeyCode::KeyT,
        W::KeyU => KeyCode::KeyU,
        W::KeyV => KeyCode::KeyV,
        W::KeyW => KeyCode::KeyW,
        W::KeyX => KeyCode::KeyX,
        W::KeyY => KeyCode::KeyY,
        W::KeyZ => KeyCode::KeyZ,

        //--- Arrows -------------------------------------------------------
        W::ArrowUp => KeyCode::ArrowUp,
        W::ArrowDown => KeyCode::ArrowDown,
        W::ArrowLeft => KeyCode::ArrowLeft,
        W::ArrowRight => KeyCode::ArrowRight,

        //--- Special ------------------------------------------------------
        W::Space => KeyCode::Space,
        W::Enter => KeyCode::Enter,
        W::Escape => KeyCode::Escape,
        W::Tab => KeyCode::Tab,
        W::Backspace => KeyCode::Backspace,
        W::Delete => KeyCode::Delete,
        W::ShiftLeft => KeyCode::ShiftLeft,
        W::ControlLeft => KeyCode::ControlLeft,
        W::AltLeft => KeyCode::AltLeft,

        _ => return None,
    };
    Some(key)
}

/// Left/Right/Middle map directly; Back/Forward/Other → Other.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    #[test]
    fn starts_with_no_modifiers() {
        let processor = InputProcessor::new();
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);
    }

    #[test]
    fn update_modifiers_works() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, true));

        let mods = processor.current_modifiers();
        assert!(mods.shift && !mods.ctrl && mods.alt);
    }

    #[test]
    fn key_events_carry_sticky_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, true, false));

        let down = processor.key_input_event(KeyCode::KeyS, ElementState::Pressed);
        let up = processor.key_input_event(KeyCode::KeyS, ElementState::Released);

        assert_eq!(down, InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL });
        assert_eq!(up, InputEvent::KeyUp { key: KeyCode::KeyS, modifiers: Modifiers::CTRL });
    }

    #[test]
    fn mouse_button_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, false, true));

        let event = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);
        assert_eq!(
            event,
            InputEvent::MouseButtonDown { button: MouseButton::Left, modifiers: Modifiers::ALT }
        );
    }

    #[test]
    fn mouse_move_correct() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.process_mouse_move(123.5, 456.7),
            InputEvent::MouseMoved { x: 123.5, y: 456.7 }
        );
    }

    #[test]
    fn wheel_lines_pass_through_and_pixels_scale() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.process_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 2.0)),
            InputEvent::MouseScrolled { dx: 0.0, dy: 2.0 }
        );
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(40.0, -20.0));
        assert_eq!(
            processor.process_mouse_wheel(pixels),
            InputEvent::MouseScrolled { dx: 2.0, dy: -1.0 }
        );
    }

    #[test]
    fn keycode_conversion_filters_unmapped() {
        assert_eq!(map_key_code(WinitKeyCode::F13), None);
    }

    #[test]
    fn keycode_conversion_alphabetic_and_special() {
        assert_eq!(map_key_code(WinitKeyCode::KeyA), Some(KeyCode::KeyA));
        assert_eq!(map_key_code(WinitKeyCode::KeyZ), Some(KeyCode::KeyZ));
        assert_eq!(map_key_code(WinitKeyCode::Space), Some(KeyCode::Space));
        assert_eq!(map_key_code(WinitKeyCode::Escape), Some(KeyCode::Escape));
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Right), MouseButton::Right);
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other);
    }
}
