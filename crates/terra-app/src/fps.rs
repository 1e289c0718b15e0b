//! Frames-per-second logging.

use tracing::info;

/// Counts frames and reports the rate once per second of elapsed time.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: f64,
    last: Option<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns the rate when a one-second window closes.
    pub fn tick(&mut self, elapsed: f64) -> Option<f64> {
        self.frames += 1;
        let span = elapsed - self.window_start;
        if span < 1.0 {
            return None;
        }
        let fps = f64::from(self.frames) / span;
        info!(fps = format_args!("{fps:.1}"), "frame rate");
        self.frames = 0;
        self.window_start = elapsed;
        self.last = Some(fps);
        Some(fps)
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}
