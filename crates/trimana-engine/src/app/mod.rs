//! Application loop.
//!
//! Owns the platform pump, the window record, the graphics backend and the
//! layer stack, and drives one iteration per frame:
//! time step, poll, layer update (scene submission), UI pass, present.

mod application;
mod config;
mod overlay;

pub use application::Application;
pub use config::ApplicationConfig;
pub use overlay::UiOverlay;
