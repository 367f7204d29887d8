use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::Result;

use super::window::{Window, WindowConfig};
use crate::events::Event;

/// Receives every event routed to one window.
pub type EventCallback = Box<dyn FnMut(&mut Event)>;

/// Platform event source.
///
/// Events are delivered only from inside `poll_events`, synchronously, on the
/// calling thread.
pub trait EventPump {
    fn create_window(&mut self, config: &WindowConfig) -> Result<Rc<RefCell<Window>>>;

    /// Registers the callback for `window`, replacing any previous one. The
    /// pump keeps only a weak reference to the window.
    fn set_events_callback(&mut self, window: &Rc<RefCell<Window>>, callback: EventCallback);

    fn poll_events(&mut self) -> Result<()>;
}

/// Routes events for one window into its callback.
pub(crate) struct EventReceiver {
    window: Weak<RefCell<Window>>,
    callback: EventCallback,
}

impl EventReceiver {
    pub fn new(window: &Rc<RefCell<Window>>, callback: EventCallback) -> Self {
        Self {
            window: Rc::downgrade(window),
            callback,
        }
    }

    pub fn window(&self) -> Option<Rc<RefCell<Window>>> {
        self.window.upgrade()
    }

    /// Updates the window records, then hands the event to the callback.
    /// Events for a window that no longer exists are dropped.
    pub fn deliver(&mut self, mut event: Event) {
        {
            let Some(window) = self.window.upgrade() else {
                return;
            };
            window.borrow_mut().apply_event(&event);
        }

        log::trace!(target: "trimana_engine::events", "{event}");
        (self.callback)(&mut event);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::events::{EventKind, MouseMove, WindowClose};

    fn window() -> Rc<RefCell<Window>> {
        Rc::new(RefCell::new(Window::headless(&WindowConfig::default())))
    }

    #[test]
    fn records_are_updated_before_the_callback_runs() {
        let window = window();
        let seen = Rc::new(Cell::new(None));

        let probe = Rc::clone(&window);
        let out = Rc::clone(&seen);
        let mut receiver = EventReceiver::new(
            &window,
            Box::new(move |_: &mut Event| out.set(probe.borrow().input.pointer_position())),
        );

        receiver.deliver(MouseMove { x: 4.0, y: 2.0 }.into());
        assert_eq!(seen.get(), Some((4.0, 2.0)));
    }

    #[test]
    fn expired_window_drops_events() {
        let window = window();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        let mut receiver = EventReceiver::new(
            &window,
            Box::new(move |_: &mut Event| counter.set(counter.get() + 1)),
        );

        receiver.deliver(WindowClose.into());
        drop(window);
        receiver.deliver(WindowClose.into());

        assert_eq!(calls.get(), 1);
        assert!(receiver.window().is_none());
    }

    #[test]
    fn receiver_does_not_keep_the_window_alive() {
        let window = window();
        let receiver = EventReceiver::new(&window, Box::new(|_: &mut Event| {}));
        assert_eq!(Rc::strong_count(&window), 1);
        drop(receiver);

        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&kinds);
        let mut receiver = EventReceiver::new(
            &window,
            Box::new(move |e: &mut Event| sink.borrow_mut().push(e.kind())),
        );
        receiver.deliver(WindowClose.into());
        assert_eq!(*kinds.borrow(), vec![EventKind::WindowClose]);
    }
}
