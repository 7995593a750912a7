//=========================================================================
// Input State
//=========================================================================
//
// Per-frame key and mouse-button state with edge tracking.
//
// Key lifecycle across frames:
// ```text
//   KeyDown ──> Pressed ──begin_frame()──> Held
//   KeyUp   ──> Released ──clear_released()──> (absent)
// ```
//
// Frame lifecycle (driven by the application):
//   begin_frame() → process_event()* → [update layers] → clear_released()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::hash::Hash;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== KeyState ============================================================

/// Edge-aware state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Went down this frame.
    Pressed,

    /// Down since an earlier frame.
    Held,

    /// Went up this frame.
    Released,
}

//=== InputState ==========================================================

/// Tracks keyboard, mouse button and cursor state between frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<KeyCode, KeyState>,
    buttons: HashMap<MouseButton, KeyState>,
    modifiers: Modifiers,
    mouse_position: (f32, f32),
    scroll: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Frame Processing -------------------------------------------------

    /// Promotes last frame's presses to held and resets scroll.
    pub fn begin_frame(&mut self) {
        promote_pressed(&mut self.keys);
        promote_pressed(&mut self.buttons);
        self.scroll = (0.0, 0.0);
    }

    /// Applies one platform event.
    pub fn process_event(&mut self, event: &InputEvent) {
        if let Some(modifiers) = event.modifiers() {
            self.modifiers = modifiers;
        }

        match *event {
            InputEvent::KeyDown { key, .. } => press(&mut self.keys, key),
            InputEvent::KeyUp { key, .. } => release(&mut self.keys, key),
            InputEvent::MouseButtonDown { button, .. } => press(&mut self.buttons, button),
            InputEvent::MouseButtonUp { button, .. } => release(&mut self.buttons, button),
            InputEvent::MouseMoved { x, y } => self.mouse_position = (x, y),
            InputEvent::MouseScrolled { dx, dy } => {
                self.scroll.0 += dx;
                self.scroll.1 += dy;
            }
        }
    }

    /// Drops keys and buttons released this frame.
    pub fn clear_released(&mut self) {
        self.keys.retain(|_, state| *state != KeyState::Released);
        self.buttons.retain(|_, state| *state != KeyState::Released);
    }

    //=====================================================================
    // Query API - Keyboard
    //=====================================================================

    pub fn key_state(&self, key: KeyCode) -> Option<KeyState> {
        self.keys.get(&key).copied()
    }

    /// Returns `true` only on the frame the key went down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.key_state(key) == Some(KeyState::Pressed)
    }

    /// Returns `true` while the key is down (pressed or held).
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        matches!(self.key_state(key), Some(KeyState::Pressed | KeyState::Held))
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.key_state(key) == Some(KeyState::Released)
    }

    //=====================================================================
    // Query API - Mouse
    //=====================================================================

    pub fn button_state(&self, button: MouseButton) -> Option<KeyState> {
        self.buttons.get(&button).copied()
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.button_state(button) == Some(KeyState::Pressed)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        matches!(self.button_state(button), Some(KeyState::Pressed | KeyState::Held))
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.button_state(button) == Some(KeyState::Released)
    }

    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    /// Scroll accumulated this frame.
    pub fn scroll(&self) -> (f32, f32) {
        self.scroll
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

//--- Internal Helpers ----------------------------------------------------

fn promote_pressed<K>(states: &mut HashMap<K, KeyState>) {
    for state in states.values_mut() {
        if *state == KeyState::Pressed {
            *state = KeyState::Held;
        }
    }
}

fn press<K: Eq + Hash>(states: &mut HashMap<K, KeyState>, key: K) {
    // OS key repeat must not re-trigger Pressed.
    let state = states.entry(key).or_insert(KeyState::Released);
    if *state == KeyState::Released {
        *state = KeyState::Pressed;
    }
}

fn release<K: Eq + Hash>(states: &mut HashMap<K, KeyState>, key: K) {
    if let Some(state) = states.get_mut(&key) {
        *state = KeyState::Released;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
