mod example_layer;
mod stats_overlay;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use trimana_engine::app::{Application, ApplicationConfig};
use trimana_engine::gapi::GraphicsApi;
use trimana_engine::logging::{init_logging, LoggingConfig};
use trimana_engine::platform::WindowConfig;

use example_layer::ExampleLayer;
use stats_overlay::StatsOverlay;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║         TRIMANA SANDBOX  v0.1          ║");
    println!("  ║   wgpu backend  ·  layered runtime     ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  WASD  move camera    Q/E  rotate      ║");
    println!("  ║  wheel zoom           SPACE  recolor   ║");
    println!("  ║  F3    toggle stats                    ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let graphics_api = if std::env::args().any(|a| a == "--headless") {
        GraphicsApi::Headless
    } else {
        GraphicsApi::Wgpu
    };

    let mut app = Application::new(ApplicationConfig {
        window: WindowConfig {
            title: "Trimana Sandbox".to_string(),
            ..WindowConfig::default()
        },
        graphics_api,
        ..ApplicationConfig::default()
    })?;

    let (width, height) = app.window().size;
    app.push_layer(Rc::new(RefCell::new(ExampleLayer::new(
        assets_dir(),
        width as f32 / height.max(1) as f32,
    ))));
    app.set_ui_overlay(StatsOverlay::default());

    app.run()
}

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}
