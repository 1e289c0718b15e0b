//! Texture asset loading for the globe.
//!
//! [`TextureAssetPipeline`] loads an ordered list of texture requests strictly
//! one after another through a [`TextureLoader`], reporting a pre-assigned
//! progress checkpoint after each load resolves. The first failure aborts the
//! whole batch and no partial result is returned.

mod error;
mod globe;
mod loader;
mod pipeline;
mod progress;
mod texture;

pub use error::AssetError;
pub use globe::GlobeTextures;
pub use loader::{ImageFileLoader, TextureLoader};
pub use pipeline::TextureAssetPipeline;
pub use progress::ProgressSchedule;
pub use texture::{ColorSpace, TextureMapping, TextureRequest, TextureResource};
