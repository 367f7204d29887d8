//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! platform layer translates native input into events; `InputState` folds
//! those events into pollable "is down" state.

mod state;
mod types;

pub use state::InputState;
pub use types::{Key, Modifiers, MouseButton};
