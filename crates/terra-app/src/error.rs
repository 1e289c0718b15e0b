use terra_assets::AssetError;
use terra_config::ConfigError;
use terra_materials::ShaderError;
use terra_render::{RenderContextError, RenderError};

use crate::platform::PlatformError;

/// Anything that stops the viewer from starting or keeps it from running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("platform setup failed: {0}")]
    Platform(#[from] PlatformError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("asset loading failed: {0}")]
    Asset(#[from] AssetError),

    #[error("shader compilation failed: {0}")]
    Shader(#[from] ShaderError),

    #[error("GPU initialization failed: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("scene was not initialized")]
    NoScene,
}
