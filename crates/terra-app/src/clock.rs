//! Variable-rate frame clock.

use std::time::Instant;

use tracing::warn;

/// Longest interval handed to a frame update, in seconds.
pub const MAX_FRAME_INTERVAL: f64 = 0.25;

/// Clamp a measured frame time to `[0, MAX_FRAME_INTERVAL]`.
pub fn clamp_interval(raw: f64) -> f64 {
    if raw > MAX_FRAME_INTERVAL {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            raw * 1000.0,
            MAX_FRAME_INTERVAL * 1000.0
        );
        MAX_FRAME_INTERVAL
    } else {
        raw.max(0.0)
    }
}

/// Produces `(interval, elapsed)` for every frame.
///
/// `elapsed` is the sum of clamped intervals, so it stops advancing while
/// the app is stalled.
#[derive(Debug)]
pub struct FrameClock {
    previous: Option<Instant>,
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous: None,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Measure the time since the last tick. The first tick reports a zero interval.
    pub fn tick(&mut self) -> (f64, f64) {
        let now = Instant::now();
        let raw = self
            .previous
            .map_or(0.0, |previous| now.duration_since(previous).as_secs_f64());
        self.previous = Some(now);
        self.advance(raw)
    }

    /// Advance by an explicit frame time.
    pub fn advance(&mut self, raw: f64) -> (f64, f64) {
        let interval = clamp_interval(raw);
        self.elapsed += interval;
        self.frames += 1;
        (interval, self.elapsed)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
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
    fn test_short_interval_passes_through() {
        let mut clock = FrameClock::new();
        let (interval, elapsed) = clock.advance(0.016);
        assert!((interval - 0.016).abs() < 1e-12);
        assert!((elapsed - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let (interval, _) = clock.advance(3.0);
        assert_eq!(interval, MAX_FRAME_INTERVAL);
        assert_eq!(clock.elapsed(), MAX_FRAME_INTERVAL);
    }

    #[test]
    fn test_negative_time_is_zero() {
        assert_eq!(clamp_interval(-0.5), 0.0);
    }

    #[test]
    fn test_elapsed_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..10 {
            clock.advance(0.02);
        }
        assert_eq!(clock.frames(), 10);
        assert!((clock.elapsed() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        let (interval, elapsed) = clock.tick();
        assert_eq!(interval, 0.0);
        assert_eq!(elapsed, 0.0);
    }
}
