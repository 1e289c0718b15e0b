//! Sequential, fail-fast texture loading with progress checkpoints.

use std::time::Instant;

use tracing::{error, info, instrument};

use crate::{AssetError, ProgressSchedule, TextureLoader, TextureRequest, TextureResource};

/// Loads texture requests one at a time and reports fixed progress checkpoints.
///
/// Each load is awaited to completion before the next one starts, so the
/// reported progress always follows issue order.
pub struct TextureAssetPipeline<L> {
    loader: L,
    checkpoints: Option<Vec<f32>>,
}

impl<L: TextureLoader> TextureAssetPipeline<L> {
    /// Pipeline with evenly spaced checkpoints.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            checkpoints: None,
        }
    }

    /// Use custom checkpoints, one per request.
    pub fn with_checkpoints(mut self, checkpoints: Vec<f32>) -> Self {
        self.checkpoints = Some(checkpoints);
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Resolve the checkpoint schedule for `count` requests.
    pub fn schedule(&self, count: usize) -> Result<ProgressSchedule, AssetError> {
        let Some(custom) = &self.checkpoints else {
            return Ok(ProgressSchedule::even(count));
        };
        let schedule = ProgressSchedule::custom(custom.clone())?;
        if schedule.len() != count {
            return Err(AssetError::CountMismatch {
                expected: count,
                actual: schedule.len(),
            });
        }
        Ok(schedule)
    }

    /// Load every request in order.
    ///
    /// `on_progress` is called with the request's checkpoint after its load
    /// resolves. On the first failure the error is returned and nothing that
    /// was already loaded is handed back.
    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn load<F>(
        &self,
        requests: &[TextureRequest],
        mut on_progress: F,
    ) -> Result<Vec<TextureResource>, AssetError>
    where
        F: FnMut(f32),
    {
        let schedule = self.schedule(requests.len())?;
        let mut loaded = Vec::with_capacity(requests.len());

        for (request, &checkpoint) in requests.iter().zip(schedule.checkpoints()) {
            let started = Instant::now();
            let texture = match self.loader.load(request).await {
                Ok(texture) => texture,
                Err(err) => {
                    error!(path = %request.path.display(), "texture load failed: {err}");
                    return Err(err);
                }
            };
            info!(
                label = %texture.label,
                width = texture.width,
                height = texture.height,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "loaded texture"
            );
            loaded.push(texture);
            on_progress(checkpoint);
        }

        Ok(loaded)
    }
}
