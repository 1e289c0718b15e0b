//! Asset loading error types.

use std::path::PathBuf;

/// Errors raised while loading texture assets.
///
/// Any of these aborts scene initialization.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but could not be decoded as an image.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Decoded pixel data does not describe a usable texture.
    #[error("invalid texture '{label}': {reason}")]
    InvalidTexture { label: String, reason: String },

    /// Progress checkpoints are not a strictly increasing sequence ending at 1.0.
    #[error("invalid progress schedule: {0}")]
    InvalidSchedule(String),

    /// The number of textures does not match what the caller expected.
    #[error("expected {expected} textures, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}
