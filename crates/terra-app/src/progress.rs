//! Loading progress feedback while textures load.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use winit::window::Window;

/// Delay after the final report before the indicator clears.
pub const FINAL_DELAY: Duration = Duration::from_millis(100);

/// Shows load progress in the window title and the log.
pub struct LoadingProgress {
    window: Option<Arc<Window>>,
    title: String,
    reports: Vec<f32>,
}

impl LoadingProgress {
    pub fn new(window: Option<Arc<Window>>, title: impl Into<String>) -> Self {
        Self {
            window,
            title: title.into(),
            reports: Vec::new(),
        }
    }

    /// Report a fraction in `[0, 1]`.
    pub fn report(&mut self, fraction: f32) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round();
        info!(fraction, "loading {percent}%");
        if let Some(window) = &self.window {
            window.set_title(&format!("{} (loading {percent}%)", self.title));
        }
        self.reports.push(fraction);
    }

    /// Wait `delay`, then restore the plain window title.
    pub fn finish(&mut self, delay: Option<Duration>) {
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if let Some(window) = &self.window {
            window.set_title(&self.title);
        }
    }

    /// Every fraction reported so far.
    pub fn reports(&self) -> &[f32] {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_are_recorded_in_order() {
        let mut progress = LoadingProgress::new(None, "Terra Globe");
        for fraction in [0.2, 0.5, 1.0] {
            progress.report(fraction);
        }
        progress.finish(None);
        assert_eq!(progress.reports(), &[0.2, 0.5, 1.0]);
    }

    #[test]
    fn test_finish_waits_for_delay() {
        let mut progress = LoadingProgress::new(None, "Terra Globe");
        let started = std::time::Instant::now();
        progress.finish(Some(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
