use std::time::{Duration, Instant};

/// Elapsed time between two loop iterations.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimeStep {
    seconds: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl TimeStep {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self { seconds, frame_index }
    }

    #[inline]
    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    #[inline]
    pub fn milliseconds(&self) -> f32 {
        self.seconds * 1000.0
    }
}

/// Frame clock producing `TimeStep` snapshots.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// feed a huge step into layer updates.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock clamped to [0.1 ms, 250 ms].
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after the loop was suspended.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns the step since the previous tick.
    pub fn tick(&mut self) -> TimeStep {
        let now = Instant::now();
        let step = self.step_from(now.saturating_duration_since(self.last));
        self.last = now;
        step
    }

    fn step_from(&mut self, elapsed: Duration) -> TimeStep {
        let dt = elapsed.clamp(self.dt_min, self.dt_max);
        let step = TimeStep::new(dt.as_secs_f32(), self.frame_index);
        self.frame_index = self.frame_index.wrapping_add(1);
        step
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliseconds_follow_seconds() {
        let ts = TimeStep::new(0.016, 0);
        assert!((ts.milliseconds() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn step_is_clamped_to_bounds() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(50));
        assert_eq!(clock.step_from(Duration::ZERO).seconds(), 0.001);
        assert_eq!(clock.step_from(Duration::from_secs(3)).seconds(), 0.05);
        assert_eq!(clock.step_from(Duration::from_millis(20)).seconds(), 0.02);
    }

    #[test]
    fn frame_index_increments_per_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }
}
