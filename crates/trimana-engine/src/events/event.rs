use std::fmt;

use crate::input::{Key, MouseButton};

/// Coarse grouping of event kinds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventCategory {
    Window,
    Keyboard,
    Mouse,
}

// ── payloads ──────────────────────────────────────────────────────────────

/// Window content area resized, in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowResize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowClose;

/// Outer window position changed, in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowPosChange {
    pub x: i32,
    pub y: i32,
}

/// `maximized == false` means the window was restored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowMaximized {
    pub maximized: bool,
}

/// `minimized == false` means the window was restored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowMinimized {
    pub minimized: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowFocusLost;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowFocusGain;

/// Drawable (framebuffer) resized, in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowFrameResize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Stable platform scancode, `0` when unavailable.
    pub code: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyRelease {
    pub key: Key,
    pub code: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyRepeat {
    pub key: Key,
    pub code: u32,
}

/// One committed unicode scalar value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CharInput {
    pub codepoint: char,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonPress {
    pub button: MouseButton,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonRelease {
    pub button: MouseButton,
}

/// Scroll offsets in lines (pixel deltas are converted by the platform layer).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseScroll {
    pub x_offset: f32,
    pub y_offset: f32,
}

/// Pointer position in logical pixels, relative to the content area.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseMove {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseEnter;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseLeave;

// ── tagging ───────────────────────────────────────────────────────────────

/// Implemented by every payload type; ties it to its static tag.
pub trait EventType: Sized + 'static {
    const KIND: EventKind;

    /// Borrows the payload if `payload` carries this type.
    fn from_payload(payload: &EventPayload) -> Option<&Self>;

    fn into_payload(self) -> EventPayload;
}

macro_rules! event_kinds {
    ($($kind:ident => $category:ident),* $(,)?) => {
        /// Runtime tag of an event.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum EventKind {
            $($kind),*
        }

        impl EventKind {
            pub const ALL: &'static [EventKind] = &[$(EventKind::$kind),*];

            pub fn category(self) -> EventCategory {
                match self {
                    $(EventKind::$kind => EventCategory::$category),*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(EventKind::$kind => stringify!($kind)),*
                }
            }
        }

        /// Tagged union over every payload type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum EventPayload {
            $($kind($kind)),*
        }

        impl EventPayload {
            pub fn kind(&self) -> EventKind {
                match self {
                    $(EventPayload::$kind(_) => EventKind::$kind),*
                }
            }
        }

        impl fmt::Display for EventPayload {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(EventPayload::$kind(e) => write!(f, "{:?}", e)),*
                }
            }
        }

        $(
            impl EventType for $kind {
                const KIND: EventKind = EventKind::$kind;

                fn from_payload(payload: &EventPayload) -> Option<&Self> {
                    match payload {
                        EventPayload::$kind(e) => Some(e),
                        _ => None,
                    }
                }

                fn into_payload(self) -> EventPayload {
                    EventPayload::$kind(self)
                }
            }

            impl From<$kind> for Event {
                fn from(payload: $kind) -> Self {
                    Event::new(payload)
                }
            }
        )*
    };
}

event_kinds! {
    WindowResize => Window,
    WindowClose => Window,
    WindowPosChange => Window,
    WindowMaximized => Window,
    WindowMinimized => Window,
    WindowFocusLost => Window,
    WindowFocusGain => Window,
    WindowFrameResize => Window,
    KeyPress => Keyboard,
    KeyRelease => Keyboard,
    KeyRepeat => Keyboard,
    CharInput => Keyboard,
    MouseButtonPress => Mouse,
    MouseButtonRelease => Mouse,
    MouseScroll => Mouse,
    MouseMove => Mouse,
    MouseEnter => Mouse,
    MouseLeave => Mouse,
}

// ── event ─────────────────────────────────────────────────────────────────

/// One platform event in flight.
///
/// `handled` starts false and is only ever raised (see `EventDispatcher`).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub handled: bool,
    payload: EventPayload,
}

impl Event {
    pub fn new<T: EventType>(payload: T) -> Self {
        Self {
            handled: false,
            payload: payload.into_payload(),
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    #[inline]
    pub fn category(&self) -> EventCategory {
        self.kind().category()
    }

    #[inline]
    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.category() == category
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Borrows the payload as `T` if the tags match.
    pub fn get<T: EventType>(&self) -> Option<&T> {
        T::from_payload(&self.payload)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)?;
        if self.handled {
            write!(f, " (handled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eighteen_kinds_in_three_categories() {
        assert_eq!(EventKind::ALL.len(), 18);

        let count = |c| EventKind::ALL.iter().filter(|k| k.category() == c).count();
        assert_eq!(count(EventCategory::Window), 8);
        assert_eq!(count(EventCategory::Keyboard), 4);
        assert_eq!(count(EventCategory::Mouse), 6);
    }

    #[test]
    fn new_event_is_unhandled_and_tagged() {
        let ev = Event::new(WindowResize { width: 800, height: 600 });
        assert!(!ev.handled);
        assert_eq!(ev.kind(), EventKind::WindowResize);
        assert!(ev.is_in_category(EventCategory::Window));
        assert!(!ev.is_in_category(EventCategory::Mouse));
    }

    #[test]
    fn get_borrows_only_matching_payload() {
        let ev: Event = CharInput { codepoint: 'x' }.into();
        assert_eq!(ev.get::<CharInput>().map(|c| c.codepoint), Some('x'));
        assert!(ev.get::<KeyPress>().is_none());
    }

    #[test]
    fn display_names_payload() {
        let mut ev = Event::new(MouseMove { x: 1.0, y: 2.0 });
        assert_eq!(ev.to_string(), "MouseMove { x: 1.0, y: 2.0 }");
        ev.handled = true;
        assert!(ev.to_string().ends_with("(handled)"));
    }
}
