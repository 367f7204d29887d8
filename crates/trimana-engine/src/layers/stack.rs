use std::rc::Rc;

use super::layer::{FrameCtx, LayerHandle};
use crate::events::Event;

/// Ordered layers, split at `insert_index` into layers (front) and overlays
/// (back).
///
/// Layers are borrowed mutably while a hook runs; a hook must not reach back
/// into the stack.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<LayerHandle>,
    insert_index: usize,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts after the last layer, in front of every overlay.
    pub fn push_layer(&mut self, layer: LayerHandle) {
        log::debug!("push layer `{}`", layer.borrow().name());
        self.layers.insert(self.insert_index, layer);
        self.insert_index += 1;
    }

    pub fn push_overlay(&mut self, overlay: LayerHandle) {
        log::debug!("push overlay `{}`", overlay.borrow().name());
        self.layers.push(overlay);
    }

    /// Detaches and removes `layer` if it is in the layer partition.
    pub fn pop_layer(&mut self, layer: &LayerHandle) -> Option<LayerHandle> {
        let index = self.position(layer, 0..self.insert_index)?;
        self.insert_index -= 1;
        Some(self.detach_at(index))
    }

    /// Detaches and removes `overlay` if it is in the overlay partition.
    pub fn pop_overlay(&mut self, overlay: &LayerHandle) -> Option<LayerHandle> {
        let index = self.position(overlay, self.insert_index..self.layers.len())?;
        Some(self.detach_at(index))
    }

    #[inline]
    pub fn insert_index(&self) -> usize {
        self.insert_index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Front-to-back.
    pub fn iter(&self) -> std::slice::Iter<'_, LayerHandle> {
        self.layers.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.borrow().name().to_string()).collect()
    }

    /// Runs `on_update` front-to-back, overlays last.
    pub fn update(&self, ctx: &mut FrameCtx<'_>) {
        for layer in &self.layers {
            layer.borrow_mut().on_update(ctx);
        }
    }

    /// Runs `on_ui_update` front-to-back.
    pub fn ui_update(&self, ctx: &mut FrameCtx<'_>) {
        for layer in &self.layers {
            layer.borrow_mut().on_ui_update(ctx);
        }
    }

    /// Offers `event` back-to-front, overlays first. Stops as soon as the
    /// event is handled; an already handled event reaches no layer.
    pub fn dispatch_event(&self, event: &mut Event) {
        for layer in self.layers.iter().rev() {
            if event.handled {
                break;
            }
            layer.borrow_mut().on_event(event);
        }
    }

    fn position(&self, layer: &LayerHandle, range: std::ops::Range<usize>) -> Option<usize> {
        let start = range.start;
        self.layers[range]
            .iter()
            .position(|l| Rc::ptr_eq(l, layer))
            .map(|i| start + i)
    }

    fn detach_at(&mut self, index: usize) -> LayerHandle {
        let layer = self.layers.remove(index);
        layer.borrow_mut().on_detach();
        log::debug!("popped `{}`", layer.borrow().name());
        layer
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a LayerHandle;
    type IntoIter = std::slice::Iter<'a, LayerHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        for layer in self.layers.drain(..) {
            match layer.try_borrow_mut() {
                Ok(mut layer) => layer.on_detach(),
                Err(_) => log::warn!("layer still borrowed while its stack drops; not detached"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::{KeyPress, WindowClose};
    use crate::gapi::Graphics;
    use crate::input::Key;
    use crate::layers::Layer;
    use crate::platform::{Window, WindowConfig};
    use crate::time::TimeStep;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        consumes: bool,
    }

    impl Layer for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_detach(&mut self) {
            self.log.borrow_mut().push(format!("detach {}", self.name));
        }

        fn on_update(&mut self, _: &mut FrameCtx<'_>) {
            self.log.borrow_mut().push(format!("update {}", self.name));
        }

        fn on_event(&mut self, event: &mut Event) {
            self.log.borrow_mut().push(format!("event {}", self.name));
            event.handled |= self.consumes;
        }
    }

    fn probe(name: &'static str, log: &Log, consumes: bool) -> LayerHandle {
        Rc::new(RefCell::new(Probe {
            name,
            log: Rc::clone(log),
            consumes,
        }))
    }

    /// [A, B, D, C] with C as the only overlay.
    fn stack(log: &Log, consuming: &str) -> (LayerStack, [LayerHandle; 4]) {
        let [a, b, c, d] = ["A", "B", "C", "D"].map(|n| probe(n, log, n == consuming));
        let mut stack = LayerStack::new();
        stack.push_layer(Rc::clone(&a));
        stack.push_layer(Rc::clone(&b));
        stack.push_overlay(Rc::clone(&c));
        stack.push_layer(Rc::clone(&d));
        (stack, [a, b, c, d])
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn layers_stay_in_front_of_overlays() {
        let log = Log::default();
        let mut stack = LayerStack::new();
        stack.push_layer(probe("A", &log, false));
        stack.push_layer(probe("B", &log, false));
        stack.push_overlay(probe("C", &log, false));
        assert_eq!(stack.names(), ["A", "B", "C"]);
        assert_eq!(stack.insert_index(), 2);

        stack.push_layer(probe("D", &log, false));
        assert_eq!(stack.names(), ["A", "B", "D", "C"]);
        assert_eq!(stack.insert_index(), 3);
    }

    #[test]
    fn update_runs_front_to_back() {
        let log = Log::default();
        let (stack, _) = stack(&log, "");
        let (graphics, _) = Graphics::headless();
        let window = Window::headless(&WindowConfig::default());

        let mut ctx = FrameCtx {
            time: TimeStep::new(0.016, 0),
            window: &window,
            graphics: &graphics,
        };
        stack.update(&mut ctx);

        assert_eq!(take(&log), ["update A", "update B", "update D", "update C"]);
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn dispatch_runs_back_to_front_until_handled() {
        let log = Log::default();
        let (stack, _) = stack(&log, "B");

        let mut event = Event::from(KeyPress { key: Key::Space, code: 57 });
        stack.dispatch_event(&mut event);

        assert!(event.handled);
        assert_eq!(take(&log), ["event C", "event D", "event B"]);
    }

    #[test]
    fn unhandled_event_reaches_every_layer() {
        let log = Log::default();
        let (stack, _) = stack(&log, "");

        let mut event = Event::from(WindowClose);
        stack.dispatch_event(&mut event);

        assert!(!event.handled);
        assert_eq!(take(&log), ["event C", "event D", "event B", "event A"]);
    }

    #[test]
    fn handled_event_reaches_no_layer() {
        let log = Log::default();
        let (stack, _) = stack(&log, "");

        let mut event = Event::from(WindowClose);
        event.handled = true;
        stack.dispatch_event(&mut event);

        assert!(take(&log).is_empty());
    }

    // ── removal ───────────────────────────────────────────────────────────

    #[test]
    fn popping_a_layer_detaches_and_moves_the_split() {
        let log = Log::default();
        let (mut stack, [_, b, c, _]) = stack(&log, "");

        assert!(stack.pop_layer(&b).is_some());
        assert_eq!(take(&log), ["detach B"]);
        assert_eq!(stack.names(), ["A", "D", "C"]);
        assert_eq!(stack.insert_index(), 2);

        // an overlay is not in the layer partition
        assert!(stack.pop_layer(&c).is_none());
        assert!(stack.pop_overlay(&c).is_some());
        assert_eq!(take(&log), ["detach C"]);
        assert_eq!(stack.insert_index(), 2);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn popping_twice_detaches_once() {
        let log = Log::default();
        let (mut stack, [a, ..]) = stack(&log, "");

        assert!(stack.pop_layer(&a).is_some());
        assert!(stack.pop_layer(&a).is_none());
        assert_eq!(take(&log), ["detach A"]);
    }

    #[test]
    fn dropping_the_stack_detaches_the_rest() {
        let log = Log::default();
        let (stack, handles) = stack(&log, "");
        drop(stack);

        assert_eq!(take(&log), ["detach A", "detach B", "detach D", "detach C"]);
        // external holders keep the layers alive
        assert_eq!(Rc::strong_count(&handles[0]), 1);
    }
}
