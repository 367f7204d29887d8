//! Color values shared by the render façade and the backends.

mod color;

pub use color::Color;
