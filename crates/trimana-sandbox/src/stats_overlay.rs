use trimana_engine::app::UiOverlay;
use trimana_engine::events::{Event, EventDispatcher, KeyPress};
use trimana_engine::input::Key;
use trimana_engine::layers::{FrameCtx, Layer};

const REPORT_INTERVAL: f32 = 1.0;

/// Frame statistics, reported through the log once per second.
pub struct StatsOverlay {
    visible: bool,
    frames: u32,
    elapsed: f32,
    worst_ms: f32,
}

impl Default for StatsOverlay {
    fn default() -> Self {
        Self {
            visible: true,
            frames: 0,
            elapsed: 0.0,
            worst_ms: 0.0,
        }
    }
}

impl Layer for StatsOverlay {
    fn name(&self) -> &str {
        "stats_overlay"
    }

    fn on_event(&mut self, event: &mut Event) {
        EventDispatcher::new(event).dispatch::<KeyPress>(|e| {
            if e.key != Key::F3 {
                return false;
            }
            self.visible = !self.visible;
            true
        });
    }
}

impl UiOverlay for StatsOverlay {
    fn begin(&mut self, ctx: &mut FrameCtx<'_>) {
        self.frames += 1;
        self.elapsed += ctx.time.seconds();
        self.worst_ms = self.worst_ms.max(ctx.time.milliseconds());
    }

    fn end(&mut self, ctx: &mut FrameCtx<'_>) {
        if self.elapsed < REPORT_INTERVAL {
            return;
        }

        if self.visible {
            let counts = ctx.graphics.resource_counts();
            log::info!(
                "{:.0} fps, worst {:.2} ms, {} live resources ({} shaders, {} textures), window {}x{}",
                self.frames as f32 / self.elapsed,
                self.worst_ms,
                counts.total(),
                counts.shaders,
                counts.textures,
                ctx.window.size.0,
                ctx.window.size.1,
            );
        }

        self.frames = 0;
        self.elapsed = 0.0;
        self.worst_ms = 0.0;
    }
}
