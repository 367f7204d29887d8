use std::collections::HashSet;

use super::types::{Key, Modifiers, MouseButton};
use crate::events::{Event, EventPayload};

/// Current input state for a single window.
///
/// Updated by the platform receiver before the corresponding event reaches
/// any handler, so a handler polling `key_down` sees the new state.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Pointer position in logical pixels; `None` while outside the window.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds one event into the held-state sets.
    pub fn apply_event(&mut self, event: &Event) {
        match event.payload() {
            EventPayload::KeyPress(e) => {
                self.keys_down.insert(e.key);
            }
            EventPayload::KeyRepeat(e) => {
                self.keys_down.insert(e.key);
            }
            EventPayload::KeyRelease(e) => {
                self.keys_down.remove(&e.key);
            }
            EventPayload::MouseButtonPress(e) => {
                self.buttons_down.insert(e.button);
            }
            EventPayload::MouseButtonRelease(e) => {
                self.buttons_down.remove(&e.button);
            }
            EventPayload::MouseMove(e) => {
                self.pointer_pos = Some((e.x, e.y));
            }
            EventPayload::MouseLeave(_) => {
                self.pointer_pos = None;
            }
            EventPayload::WindowFocusLost(_) => {
                // Releases delivered while unfocused never arrive.
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    pub fn pointer_position(&self) -> Option<(f32, f32)> {
        self.pointer_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        KeyPress, KeyRelease, MouseButtonPress, MouseLeave, MouseMove, WindowFocusLost,
    };

    fn apply(state: &mut InputState, ev: impl Into<Event>) {
        state.apply_event(&ev.into());
    }

    #[test]
    fn key_press_then_release() {
        let mut s = InputState::default();
        apply(&mut s, KeyPress { key: Key::W, code: 17 });
        assert!(s.key_down(Key::W));

        apply(&mut s, KeyRelease { key: Key::W, code: 17 });
        assert!(!s.key_down(Key::W));
    }

    #[test]
    fn pointer_tracks_move_and_leave() {
        let mut s = InputState::default();
        apply(&mut s, MouseMove { x: 4.0, y: 8.0 });
        assert_eq!(s.pointer_position(), Some((4.0, 8.0)));

        apply(&mut s, MouseLeave);
        assert_eq!(s.pointer_position(), None);
    }

    #[test]
    fn focus_loss_clears_held_state() {
        let mut s = InputState::default();
        apply(&mut s, KeyPress { key: Key::A, code: 30 });
        apply(&mut s, MouseButtonPress { button: MouseButton::Left });

        apply(&mut s, WindowFocusLost);

        assert!(!s.key_down(Key::A));
        assert!(!s.button_down(MouseButton::Left));
    }
}
