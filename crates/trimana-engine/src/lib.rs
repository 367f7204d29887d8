//! Trimana runtime core.
//!
//! Layered update/render loop over a platform window, a closed event system,
//! and a backend-neutral graphics resource abstraction.

pub mod app;
pub mod events;
pub mod gapi;
pub mod input;
pub mod layers;
pub mod logging;
pub mod paint;
pub mod platform;
pub mod renderer;
pub mod time;
