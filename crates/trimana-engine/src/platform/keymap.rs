use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::input::{Key, Modifiers, MouseButton};

pub(super) fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

pub(super) fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Physical key to `(Key, scancode)`. Scancode is `0` for unidentified keys.
pub(super) fn map_key(pk: PhysicalKey) -> (Key, u32) {
    match pk {
        PhysicalKey::Code(code) => (key_for(code), code as u32),
        PhysicalKey::Unidentified(_) => (Key::Unknown(0), 0),
    }
}

fn key_for(code: KeyCode) -> Key {
    use KeyCode as C;

    match code {
        C::Escape => Key::Escape,
        C::Enter | C::NumpadEnter => Key::Enter,
        C::Tab => Key::Tab,
        C::Backspace => Key::Backspace,
        C::Space => Key::Space,

        C::Insert => Key::Insert,
        C::Delete => Key::Delete,
        C::Home => Key::Home,
        C::End => Key::End,
        C::PageUp => Key::PageUp,
        C::PageDown => Key::PageDown,

        C::ArrowUp => Key::ArrowUp,
        C::ArrowDown => Key::ArrowDown,
        C::ArrowLeft => Key::ArrowLeft,
        C::ArrowRight => Key::ArrowRight,

        C::ShiftLeft | C::ShiftRight => Key::Shift,
        C::ControlLeft | C::ControlRight => Key::Control,
        C::AltLeft | C::AltRight => Key::Alt,
        C::SuperLeft | C::SuperRight => Key::Meta,

        C::KeyA => Key::A,
        C::KeyB => Key::B,
        C::KeyC => Key::C,
        C::KeyD => Key::D,
        C::KeyE => Key::E,
        C::KeyF => Key::F,
        C::KeyG => Key::G,
        C::KeyH => Key::H,
        C::KeyI => Key::I,
        C::KeyJ => Key::J,
        C::KeyK => Key::K,
        C::KeyL => Key::L,
        C::KeyM => Key::M,
        C::KeyN => Key::N,
        C::KeyO => Key::O,
        C::KeyP => Key::P,
        C::KeyQ => Key::Q,
        C::KeyR => Key::R,
        C::KeyS => Key::S,
        C::KeyT => Key::T,
        C::KeyU => Key::U,
        C::KeyV => Key::V,
        C::KeyW => Key::W,
        C::KeyX => Key::X,
        C::KeyY => Key::Y,
        C::KeyZ => Key::Z,

        C::Digit0 | C::Numpad0 => Key::Digit0,
        C::Digit1 | C::Numpad1 => Key::Digit1,
        C::Digit2 | C::Numpad2 => Key::Digit2,
        C::Digit3 | C::Numpad3 => Key::Digit3,
        C::Digit4 | C::Numpad4 => Key::Digit4,
        C::Digit5 | C::Numpad5 => Key::Digit5,
        C::Digit6 | C::Numpad6 => Key::Digit6,
        C::Digit7 | C::Numpad7 => Key::Digit7,
        C::Digit8 | C::Numpad8 => Key::Digit8,
        C::Digit9 | C::Numpad9 => Key::Digit9,

        C::F1 => Key::F1,
        C::F2 => Key::F2,
        C::F3 => Key::F3,
        C::F4 => Key::F4,
        C::F5 => Key::F5,
        C::F6 => Key::F6,
        C::F7 => Key::F7,
        C::F8 => Key::F8,
        C::F9 => Key::F9,
        C::F10 => Key::F10,
        C::F11 => Key::F11,
        C::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_and_right_modifiers_collapse() {
        let (left, _) = map_key(PhysicalKey::Code(KeyCode::ShiftLeft));
        let (right, _) = map_key(PhysicalKey::Code(KeyCode::ShiftRight));
        assert_eq!(left, Key::Shift);
        assert_eq!(right, Key::Shift);
    }

    #[test]
    fn numpad_digits_map_to_digits() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Numpad7)).0, Key::Digit7);
    }

    #[test]
    fn unmapped_codes_keep_their_scancode() {
        let (key, code) = map_key(PhysicalKey::Code(KeyCode::CapsLock));
        assert_eq!(key, Key::Unknown(code));
        assert_ne!(code, 0);
    }

    #[test]
    fn modifier_state_flags() {
        let m = map_modifiers(ModifiersState::SHIFT | ModifiersState::SUPER);
        assert!(m.shift && m.meta);
        assert!(!m.ctrl && !m.alt);
    }
}
