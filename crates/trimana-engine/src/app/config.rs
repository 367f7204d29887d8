use std::time::Duration;

use crate::gapi::{GpuInit, GraphicsApi};
use crate::paint::Color;
use crate::platform::WindowConfig;

/// Startup configuration, fixed for the lifetime of an `Application`.
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    pub window: WindowConfig,

    /// Backend every resource factory produces for.
    pub graphics_api: GraphicsApi,
    pub gpu: GpuInit,

    /// Time step clamps `(min, max)`.
    pub clock_clamps: (Duration, Duration),

    /// Applied at the start of every frame.
    pub clear_color: Color,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics_api: GraphicsApi::default(),
            gpu: GpuInit::default(),
            clock_clamps: (Duration::from_micros(100), Duration::from_millis(250)),
            clear_color: Color::rgba(0.1, 0.1, 0.1, 1.0),
        }
    }
}
