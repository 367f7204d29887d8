use super::event::{Event, EventType};

/// Matches one event against handlers for specific payload types.
///
/// ```ignore
/// let mut dispatcher = EventDispatcher::new(event);
/// dispatcher.dispatch::<WindowResize>(|e| on_resize(e));
/// dispatcher.dispatch::<WindowClose>(|_| on_close());
/// ```
pub struct EventDispatcher<'a> {
    event: &'a mut Event,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(event: &'a mut Event) -> Self {
        Self { event }
    }

    /// Invokes `handler` if the event carries a `T`.
    ///
    /// Returns whether the tag matched. On a match, `handled` is OR-ed with the
    /// handler result, so a consumed event stays consumed.
    pub fn dispatch<T: EventType>(&mut self, handler: impl FnOnce(&T) -> bool) -> bool {
        let Some(payload) = T::from_payload(self.event.payload()) else {
            return false;
        };

        let consumed = handler(payload);
        self.event.handled |= consumed;
        true
    }

    #[inline]
    pub fn handled(&self) -> bool {
        self.event.handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyPress, WindowClose, WindowResize};
    use crate::input::Key;

    #[test]
    fn mismatched_tag_returns_false_without_side_effects() {
        let mut ev = Event::new(WindowClose);
        let mut called = false;

        let matched = EventDispatcher::new(&mut ev).dispatch::<WindowResize>(|_| {
            called = true;
            true
        });

        assert!(!matched);
        assert!(!called);
        assert!(!ev.handled);
    }

    #[test]
    fn close_routes_past_resize_then_consumes() {
        let mut ev = Event::new(WindowClose);
        let mut d = EventDispatcher::new(&mut ev);

        assert!(!d.dispatch::<WindowResize>(|_| true));
        assert!(!d.handled());

        assert!(d.dispatch::<WindowClose>(|_| true));
        assert!(d.handled());
    }

    #[test]
    fn handled_is_sticky_across_dispatches() {
        let mut ev = Event::new(KeyPress { key: Key::A, code: 30 });
        let mut d = EventDispatcher::new(&mut ev);

        assert!(d.dispatch::<KeyPress>(|_| true));
        assert!(d.dispatch::<KeyPress>(|_| false));
        assert!(ev.handled);
    }

    #[test]
    fn handler_returning_false_leaves_event_unhandled() {
        let mut ev = Event::new(WindowResize { width: 10, height: 20 });
        let mut seen = None;

        let matched = EventDispatcher::new(&mut ev).dispatch::<WindowResize>(|e| {
            seen = Some((e.width, e.height));
            false
        });

        assert!(matched);
        assert_eq!(seen, Some((10, 20)));
        assert!(!ev.handled);
    }
}
