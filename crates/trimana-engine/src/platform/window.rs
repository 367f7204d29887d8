use std::sync::Arc;

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::events::{Event, EventPayload};
use crate::input::InputState;

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    /// Content size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Trimana Engine".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            resizable: true,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// Mutable window flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAttributes {
    /// Cleared by the application's close handler; ends the main loop.
    pub is_active: bool,
    pub is_focused: bool,
    pub is_vsync_enabled: bool,
    pub state: WindowState,
    pub title: String,
}

/// Platform window record.
///
/// The platform layer updates these records before it constructs the event
/// describing the change, so handlers always observe the new values.
pub struct Window {
    native: Option<Arc<winit::window::Window>>,

    pub attributes: WindowAttributes,

    /// Content size in logical pixels.
    pub size: (u32, u32),

    /// Drawable size in physical pixels.
    pub framebuffer_size: (u32, u32),

    /// Outer position in physical pixels.
    pub position: (i32, i32),

    pub input: InputState,
}

impl Window {
    /// A window record without a native window. Used by the headless backend
    /// and tests.
    pub fn headless(config: &WindowConfig) -> Self {
        Self {
            native: None,
            attributes: WindowAttributes {
                is_active: true,
                is_focused: true,
                is_vsync_enabled: config.vsync,
                state: WindowState::Normal,
                title: config.title.clone(),
            },
            size: (config.width, config.height),
            framebuffer_size: (config.width, config.height),
            position: (0, 0),
            input: InputState::default(),
        }
    }

    pub(crate) fn from_native(native: Arc<winit::window::Window>, config: &WindowConfig) -> Self {
        let physical = native.inner_size();
        let logical = physical.to_logical::<u32>(native.scale_factor());
        let position = native
            .outer_position()
            .map(|p| (p.x, p.y))
            .unwrap_or_default();

        let state = if native.is_minimized().unwrap_or(false) {
            WindowState::Minimized
        } else if native.is_maximized() {
            WindowState::Maximized
        } else {
            WindowState::Normal
        };

        Self {
            attributes: WindowAttributes {
                is_active: true,
                is_focused: native.has_focus(),
                is_vsync_enabled: config.vsync,
                state,
                title: config.title.clone(),
            },
            size: (logical.width, logical.height),
            framebuffer_size: (physical.width, physical.height),
            position,
            input: InputState::default(),
            native: Some(native),
        }
    }

    /// The native window, `None` for headless records.
    pub fn native(&self) -> Option<Arc<winit::window::Window>> {
        self.native.clone()
    }

    /// Records the v-sync flag. The graphics surface is reconfigured by
    /// `Graphics::set_vsync`.
    pub fn set_vsync(&mut self, enabled: bool) {
        self.attributes.is_vsync_enabled = enabled;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.attributes.title = title.into();
        if let Some(native) = &self.native {
            native.set_title(&self.attributes.title);
        }
    }

    /// Folds `event` into the window records and the input state.
    pub fn apply_event(&mut self, event: &Event) {
        match event.payload() {
            EventPayload::WindowResize(e) => self.size = (e.width, e.height),
            EventPayload::WindowFrameResize(e) => self.framebuffer_size = (e.width, e.height),
            EventPayload::WindowPosChange(e) => self.position = (e.x, e.y),
            EventPayload::WindowFocusGain(_) => self.attributes.is_focused = true,
            EventPayload::WindowFocusLost(_) => self.attributes.is_focused = false,
            EventPayload::WindowMaximized(e) => {
                self.attributes.state =
                    transition(self.attributes.state, WindowState::Maximized, e.maximized);
            }
            EventPayload::WindowMinimized(e) => {
                self.attributes.state =
                    transition(self.attributes.state, WindowState::Minimized, e.minimized);
            }
            _ => {}
        }
        self.input.apply_event(event);
    }
}

fn transition(current: WindowState, target: WindowState, entered: bool) -> WindowState {
    match (entered, current == target) {
        (true, _) => target,
        (false, true) => WindowState::Normal,
        (false, false) => current,
    }
}

impl HasWindowHandle for Window {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        match &self.native {
            Some(native) => native.window_handle(),
            None => Err(HandleError::Unavailable),
        }
    }
}

impl HasDisplayHandle for Window {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        match &self.native {
            Some(native) => native.display_handle(),
            None => Err(HandleError::Unavailable),
        }
    }
}
