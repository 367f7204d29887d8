//! Layers and the layer stack.
//!
//! A layer is one unit of per-frame behavior. The stack keeps regular layers
//! in front of overlays; updates run front-to-back, events back-to-front.

mod layer;
mod stack;

pub use layer::{FrameCtx, Layer, LayerHandle};
pub use stack::LayerStack;
