use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use anyhow::{Context, Result};

use super::config::ApplicationConfig;
use super::overlay::UiOverlay;
use crate::events::{Event, EventDispatcher, WindowClose, WindowFrameResize};
use crate::gapi::Graphics;
use crate::layers::{FrameCtx, LayerHandle, LayerStack};
use crate::platform::{EventCallback, EventPump, WinitPlatform, Window};
use crate::time::FrameClock;

struct UiSlot {
    layer: LayerHandle,
    hooks: Rc<RefCell<dyn UiOverlay>>,
}

/// The main loop and everything it owns.
pub struct Application {
    pump: Box<dyn EventPump>,
    window: Rc<RefCell<Window>>,
    graphics: Rc<Graphics>,
    layers: Rc<RefCell<LayerStack>>,
    ui: Option<UiSlot>,
    clock: FrameClock,
}

impl Application {
    /// Opens the desktop window and brings up the configured backend.
    pub fn new(config: ApplicationConfig) -> Result<Self> {
        let mut pump = WinitPlatform::new()?;
        let window = pump.create_window(&config.window)?;
        let graphics = Graphics::new(config.graphics_api, &window.borrow(), &config.gpu)
            .context("failed to initialize graphics")?;

        Ok(Self::from_parts(Box::new(pump), window, graphics, &config))
    }

    /// Assembles an application over an existing pump, window and backend.
    ///
    /// Registers the window's event callback, replacing any previous one.
    pub fn from_parts(
        mut pump: Box<dyn EventPump>,
        window: Rc<RefCell<Window>>,
        graphics: Graphics,
        config: &ApplicationConfig,
    ) -> Self {
        let renderer = graphics.renderer();
        renderer.init();
        renderer.set_clear_color(config.clear_color);
        graphics.set_vsync(window.borrow().attributes.is_vsync_enabled);

        let graphics = Rc::new(graphics);
        let layers = Rc::new(RefCell::new(LayerStack::new()));
        pump.set_events_callback(&window, event_router(&window, &graphics, &layers));

        let (dt_min, dt_max) = config.clock_clamps;
        Self {
            pump,
            window,
            graphics,
            layers,
            ui: None,
            clock: FrameClock::with_clamps(dt_min, dt_max),
        }
    }

    pub fn push_layer(&mut self, layer: LayerHandle) {
        self.layers.borrow_mut().push_layer(Rc::clone(&layer));
        layer.borrow_mut().on_attach(&self.graphics);
    }

    pub fn push_overlay(&mut self, overlay: LayerHandle) {
        self.layers.borrow_mut().push_overlay(Rc::clone(&overlay));
        overlay.borrow_mut().on_attach(&self.graphics);
    }

    pub fn pop_layer(&mut self, layer: &LayerHandle) -> Option<LayerHandle> {
        let popped = self.layers.borrow_mut().pop_layer(layer);
        self.forget_ui(popped.as_ref());
        popped
    }

    pub fn pop_overlay(&mut self, overlay: &LayerHandle) -> Option<LayerHandle> {
        let popped = self.layers.borrow_mut().pop_overlay(overlay);
        self.forget_ui(popped.as_ref());
        popped
    }

    /// A popped layer that was the UI overlay stops bracketing the UI pass.
    fn forget_ui(&mut self, popped: Option<&LayerHandle>) {
        let Some(popped) = popped else { return };
        if self.ui.as_ref().is_some_and(|ui| Rc::ptr_eq(&ui.layer, popped)) {
            self.ui = None;
        }
    }

    /// Installs the UI overlay, popping the previous one. Returns the typed
    /// handle so the caller can keep addressing it.
    pub fn set_ui_overlay<O: UiOverlay + 'static>(&mut self, overlay: O) -> Rc<RefCell<O>> {
        if let Some(previous) = self.ui.take() {
            self.pop_overlay(&previous.layer);
        }

        let overlay = Rc::new(RefCell::new(overlay));
        let layer: LayerHandle = overlay.clone();
        let hooks: Rc<RefCell<dyn UiOverlay>> = overlay.clone();

        self.push_overlay(Rc::clone(&layer));
        self.ui = Some(UiSlot { layer, hooks });
        overlay
    }

    /// Runs frames until the window is closed.
    pub fn run(&mut self) -> Result<()> {
        log::info!("entering main loop");
        self.clock.reset();

        let mut frames = 0u64;
        while self.is_running() {
            self.run_frame()?;
            frames += 1;
        }

        log::info!("main loop exited after {frames} frames");
        Ok(())
    }

    /// One loop iteration.
    pub fn run_frame(&mut self) -> Result<()> {
        let time = self.clock.tick();
        self.pump.poll_events().context("event pump failed")?;

        self.graphics.renderer().clear();

        {
            let window = self.window.borrow();
            let layers = self.layers.borrow();
            let mut ctx = FrameCtx {
                time,
                window: &window,
                graphics: &self.graphics,
            };

            layers.update(&mut ctx);

            if let Some(ui) = &self.ui {
                ui.hooks.borrow_mut().begin(&mut ctx);
            }
            layers.ui_update(&mut ctx);
            if let Some(ui) = &self.ui {
                ui.hooks.borrow_mut().end(&mut ctx);
            }
        }

        self.graphics.present().context("present failed")
    }

    /// Ends the loop after the current frame.
    pub fn close(&self) {
        self.window.borrow_mut().attributes.is_active = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.window.borrow().attributes.is_active
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.window.borrow_mut().set_vsync(enabled);
        self.graphics.set_vsync(enabled);
    }

    pub fn window(&self) -> Ref<'_, Window> {
        self.window.borrow()
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    pub fn layers(&self) -> Ref<'_, LayerStack> {
        self.layers.borrow()
    }
}

/// Built-in handlers first, then the layer stack.
///
/// Holds the window weakly: the pump owning this callback must not keep the
/// window alive.
fn event_router(
    window: &Rc<RefCell<Window>>,
    graphics: &Rc<Graphics>,
    layers: &Rc<RefCell<LayerStack>>,
) -> EventCallback {
    let window: Weak<RefCell<Window>> = Rc::downgrade(window);
    let graphics = Rc::clone(graphics);
    let layers = Rc::clone(layers);

    Box::new(move |event: &mut Event| {
        let mut dispatcher = EventDispatcher::new(event);

        dispatcher.dispatch::<WindowClose>(|_| {
            if let Some(window) = window.upgrade() {
                window.borrow_mut().attributes.is_active = false;
            }
            log::info!("window close requested");
            true
        });

        dispatcher.dispatch::<WindowFrameResize>(|e| {
            graphics.resize(e.width, e.height);
            false
        });

        layers.borrow().dispatch_event(event);
    })
}
