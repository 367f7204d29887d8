use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;

use super::pump::{EventCallback, EventPump, EventReceiver};
use super::window::{Window, WindowConfig};
use crate::events::Event;

/// Queue of per-poll event batches, shared with the test that feeds it.
#[derive(Clone, Default)]
pub(crate) struct Script {
    frames: Rc<RefCell<VecDeque<Vec<Event>>>>,
}

impl Script {
    /// Queues `events` for one future `poll_events` call.
    pub fn push_frame(&self, events: impl IntoIterator<Item = Event>) {
        self.frames.borrow_mut().push_back(events.into_iter().collect());
    }

    pub fn pending(&self) -> usize {
        self.frames.borrow().len()
    }
}

/// Event pump without a display. Each `poll_events` delivers the next queued
/// batch through the same receiver path the desktop pump uses.
#[derive(Default)]
pub(crate) struct ScriptedPump {
    script: Script,
    receiver: Option<EventReceiver>,
    polls: usize,
}

impl ScriptedPump {
    pub fn new() -> (Self, Script) {
        let pump = Self::default();
        let script = pump.script.clone();
        (pump, script)
    }
}

impl EventPump for ScriptedPump {
    fn create_window(&mut self, config: &WindowConfig) -> Result<Rc<RefCell<Window>>> {
        Ok(Rc::new(RefCell::new(Window::headless(config))))
    }

    fn set_events_callback(&mut self, window: &Rc<RefCell<Window>>, callback: EventCallback) {
        self.receiver = Some(EventReceiver::new(window, callback));
    }

    fn poll_events(&mut self) -> Result<()> {
        self.polls += 1;
        let batch = self.script.frames.borrow_mut().pop_front().unwrap_or_default();
        if let Some(receiver) = &mut self.receiver {
            batch.into_iter().for_each(|event| receiver.deliver(event));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::events::{WindowClose, WindowResize};

    #[test]
    fn one_batch_per_poll() {
        let (mut pump, script) = ScriptedPump::new();
        let window = pump.create_window(&WindowConfig::default()).unwrap();

        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        pump.set_events_callback(
            &window,
            Box::new(move |_: &mut Event| seen.set(seen.get() + 1)),
        );

        script.push_frame([
            Event::from(WindowResize { width: 10, height: 10 }),
            Event::from(WindowClose),
        ]);
        script.push_frame([Event::from(WindowClose)]);

        pump.poll_events().unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(window.borrow().size, (10, 10));

        pump.poll_events().unwrap();
        pump.poll_events().unwrap();
        assert_eq!(count.get(), 3);
        assert_eq!(pump.polls, 3);
        assert_eq!(script.pending(), 0);
    }
}
