use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Ime, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as NativeWindow, WindowId};

use super::keymap::{map_key, map_modifiers, map_mouse_button};
use super::pump::{EventCallback, EventPump, EventReceiver};
use super::window::{Window, WindowConfig, WindowState};
use crate::events::{
    CharInput, Event, KeyPress, KeyRelease, KeyRepeat, MouseButtonPress, MouseButtonRelease,
    MouseEnter, MouseLeave, MouseMove, MouseScroll, WindowClose, WindowFocusGain,
    WindowFocusLost, WindowFrameResize, WindowMaximized, WindowMinimized, WindowPosChange,
    WindowResize,
};

/// Logical pixels per scroll line when the platform reports pixel deltas.
const PIXELS_PER_LINE: f64 = 20.0;

const CREATE_PUMP_ATTEMPTS: u32 = 200;
const CREATE_PUMP_TIMEOUT: Duration = Duration::from_millis(5);

/// Desktop event pump over a winit `EventLoop`.
///
/// The loop is pumped, not run: `poll_events` drains whatever the OS has
/// queued and returns, so the application keeps ownership of its frame loop.
/// One window per pump.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    handler: PumpHandler,
}

#[derive(Default)]
struct PumpHandler {
    pending: Option<WindowConfig>,
    native: Option<Arc<NativeWindow>>,
    receiver: Option<EventReceiver>,
    error: Option<anyhow::Error>,
}

impl WinitPlatform {
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        Ok(Self {
            event_loop,
            handler: PumpHandler::default(),
        })
    }

    fn pump(&mut self, timeout: Duration) -> Result<PumpStatus> {
        let status = self
            .event_loop
            .pump_app_events(Some(timeout), &mut self.handler);
        match self.handler.error.take() {
            Some(err) => Err(err),
            None => Ok(status),
        }
    }
}

impl EventPump for WinitPlatform {
    fn create_window(&mut self, config: &WindowConfig) -> Result<Rc<RefCell<Window>>> {
        if self.handler.native.is_some() {
            bail!("WinitPlatform drives a single window");
        }
        self.handler.pending = Some(config.clone());

        for _ in 0..CREATE_PUMP_ATTEMPTS {
            if let PumpStatus::Exit(code) = self.pump(CREATE_PUMP_TIMEOUT)? {
                bail!("event loop exited with code {code} before the window was created");
            }
            if let Some(native) = &self.handler.native {
                let window = Window::from_native(Arc::clone(native), config);
                log::info!(
                    "window \"{}\" created: {}x{} logical, {}x{} framebuffer",
                    window.attributes.title,
                    window.size.0,
                    window.size.1,
                    window.framebuffer_size.0,
                    window.framebuffer_size.1
                );
                return Ok(Rc::new(RefCell::new(window)));
            }
        }

        bail!("platform never resumed; no window created")
    }

    fn set_events_callback(&mut self, window: &Rc<RefCell<Window>>, callback: EventCallback) {
        self.handler.receiver = Some(EventReceiver::new(window, callback));
    }

    fn poll_events(&mut self) -> Result<()> {
        if let PumpStatus::Exit(code) = self.pump(Duration::ZERO)? {
            log::info!("event loop exited with code {code}");
            if let Some(receiver) = &mut self.handler.receiver {
                receiver.deliver(WindowClose.into());
            }
        }
        Ok(())
    }
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.pending.take() else {
            return;
        };

        let attrs = NativeWindow::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .with_resizable(config.resizable);

        match event_loop.create_window(attrs).context("failed to create window") {
            Ok(window) => self.native = Some(Arc::new(window)),
            Err(err) => self.error = Some(err),
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let (Some(native), Some(receiver)) = (&self.native, &mut self.receiver) else {
            return;
        };
        if native.id() != window_id {
            return;
        }
        let Some(window) = receiver.window() else {
            return;
        };

        // Modifier changes are state, not events.
        if let WindowEvent::ModifiersChanged(m) = &event {
            window.borrow_mut().input.modifiers = map_modifiers(m.state());
            return;
        }

        let state = window.borrow().attributes.state;
        drop(window);

        translate(native, state, &event, |e| receiver.deliver(e));
    }
}

/// Emits the events describing one native window event, in delivery order.
fn translate(
    native: &NativeWindow,
    state: WindowState,
    event: &WindowEvent,
    mut emit: impl FnMut(Event),
) {
    let scale = native.scale_factor();

    match event {
        WindowEvent::Resized(physical) => {
            let minimized = native
                .is_minimized()
                .unwrap_or(physical.width == 0 || physical.height == 0);
            let maximized = !minimized && native.is_maximized();

            if minimized != (state == WindowState::Minimized) {
                emit(WindowMinimized { minimized }.into());
            }
            if maximized != (state == WindowState::Maximized) {
                emit(WindowMaximized { maximized }.into());
            }

            emit(WindowFrameResize {
                width: physical.width,
                height: physical.height,
            }
            .into());

            let logical = physical.to_logical::<u32>(scale);
            emit(WindowResize {
                width: logical.width,
                height: logical.height,
            }
            .into());
        }

        WindowEvent::Moved(position) => emit(WindowPosChange {
            x: position.x,
            y: position.y,
        }
        .into()),

        WindowEvent::Focused(true) => emit(WindowFocusGain.into()),
        WindowEvent::Focused(false) => emit(WindowFocusLost.into()),

        WindowEvent::CloseRequested => emit(WindowClose.into()),

        WindowEvent::KeyboardInput { event, .. } => {
            let (key, code) = map_key(event.physical_key);
            match (event.state, event.repeat) {
                (ElementState::Released, _) => emit(KeyRelease { key, code }.into()),
                (ElementState::Pressed, true) => emit(KeyRepeat { key, code }.into()),
                (ElementState::Pressed, false) => emit(KeyPress { key, code }.into()),
            }

            if event.state == ElementState::Pressed {
                if let Some(text) = &event.text {
                    text.chars()
                        .filter(|c| !c.is_control())
                        .for_each(|codepoint| emit(CharInput { codepoint }.into()));
                }
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) => {
            text.chars()
                .for_each(|codepoint| emit(CharInput { codepoint }.into()));
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            match state {
                ElementState::Pressed => emit(MouseButtonPress { button }.into()),
                ElementState::Released => emit(MouseButtonRelease { button }.into()),
            }
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (x_offset, y_offset) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => {
                    let logical = p.to_logical::<f64>(scale);
                    (
                        (logical.x / PIXELS_PER_LINE) as f32,
                        (logical.y / PIXELS_PER_LINE) as f32,
                    )
                }
            };
            emit(MouseScroll { x_offset, y_offset }.into());
        }

        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f64>(scale);
            emit(MouseMove {
                x: logical.x as f32,
                y: logical.y as f32,
            }
            .into());
        }

        WindowEvent::CursorEntered { .. } => emit(MouseEnter.into()),
        WindowEvent::CursorLeft { .. } => emit(MouseLeave.into()),

        _ => {}
    }
}
