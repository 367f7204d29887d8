//! Time subsystem.
//!
//! One `FrameClock` per loop; `tick()` once per iteration yields the
//! `TimeStep` handed to every layer.

mod frame_clock;

pub use frame_clock::{FrameClock, TimeStep};
