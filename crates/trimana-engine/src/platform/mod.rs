//! Platform window and event pump.
//!
//! The pump owns the OS event loop and translates native events into
//! `Event`s. Each event first updates the `Window` records and input state,
//! then reaches the registered callback.

mod desktop;
mod keymap;
mod pump;
#[cfg(test)]
pub(crate) mod scripted;
mod window;

pub use desktop::WinitPlatform;
pub use pump::{EventCallback, EventPump};
pub use window::{Window, WindowAttributes, WindowConfig, WindowState};
