//! Event system.
//!
//! A closed set of event kinds, each carried by its own payload type, plus a
//! dispatcher that matches one event against one handler type at a time.
//!
//! Events are created by the platform layer when a native callback fires,
//! passed by `&mut` through the routing chain, and dropped when the callback
//! returns. Nothing stores them.

mod dispatcher;
mod event;

pub use dispatcher::EventDispatcher;
pub use event::{
    CharInput, Event, EventCategory, EventKind, EventPayload, EventType, KeyPress, KeyRelease,
    KeyRepeat, MouseButtonPress, MouseButtonRelease, MouseEnter, MouseLeave, MouseMove,
    MouseScroll, WindowClose, WindowFocusGain, WindowFocusLost, WindowFrameResize,
    WindowMaximized, WindowMinimized, WindowPosChange, WindowResize,
};
