use std::cell::RefCell;
use std::rc::Rc;

use crate::events::Event;
use crate::gapi::Graphics;
use crate::input::InputState;
use crate::platform::Window;
use crate::renderer::Renderer;
use crate::time::TimeStep;

/// Per-frame context handed to `Layer::on_update` and `Layer::on_ui_update`.
pub struct FrameCtx<'a> {
    pub time: TimeStep,
    pub window: &'a Window,
    pub graphics: &'a Graphics,
}

impl<'a> FrameCtx<'a> {
    #[inline]
    pub fn input(&self) -> &'a InputState {
        &self.window.input
    }

    /// Scene submission entry points for this frame.
    #[inline]
    pub fn renderer(&self) -> Renderer<'a> {
        self.graphics.renderer()
    }
}

/// Application-defined unit of per-frame behavior.
///
/// Every hook has an empty default.
pub trait Layer {
    fn name(&self) -> &str;

    /// Called once when the application pushes the layer. Create GPU
    /// resources here.
    fn on_attach(&mut self, graphics: &Graphics) {
        let _ = graphics;
    }

    /// Called once when the layer is popped or its stack is dropped.
    fn on_detach(&mut self) {}

    fn on_update(&mut self, ctx: &mut FrameCtx<'_>) {
        let _ = ctx;
    }

    fn on_ui_update(&mut self, ctx: &mut FrameCtx<'_>) {
        let _ = ctx;
    }

    /// Set `event.handled` to stop propagation to the layers below.
    fn on_event(&mut self, event: &mut Event) {
        let _ = event;
    }
}

/// Layers are shared between the stack and whoever else addresses them.
pub type LayerHandle = Rc<RefCell<dyn Layer>>;
