//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Tunable globe parameters.
    pub globe: GlobeParams,
    /// Texture asset locations.
    pub assets: AssetConfig,
    /// Camera placement and projection.
    pub camera: CameraConfig,
    /// Orbit controls.
    pub controls: ControlsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color used when the environment background is disabled (linear RGB).
    pub clear_color: [f32; 3],
    /// Draw the environment texture behind the globe.
    pub background: bool,
    /// Exposure multiplier applied before output.
    pub exposure: f32,
}

/// Tunable parameters of the globe.
///
/// Read by the scene composer at build time and by the animation driver every
/// frame (for `speed_factor`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeParams {
    /// Directional sun light intensity.
    pub sun_intensity: f32,
    /// Rotation speed multiplier.
    pub speed_factor: f64,
    /// Metalness strength of the body material.
    pub metalness: f32,
    /// Atmosphere shell shading.
    pub atmosphere: AtmosphereParams,
}

/// Atmosphere shell shader parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereParams {
    /// Overall opacity of the halo.
    pub opacity: f32,
    /// Exponent applied to the view/normal falloff.
    pub power_factor: f32,
    /// Final intensity multiplier.
    pub multiplier: f32,
}

/// Locations of the six texture maps, relative to `root`.
///
/// The maps are loaded in the order of the fields below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory containing the texture files.
    pub root: PathBuf,
    pub albedo: String,
    pub bump: String,
    pub clouds: String,
    pub ocean: String,
    pub night_lights: String,
    pub environment: String,
    /// Custom progress checkpoints, one per texture. `None` spaces them evenly.
    pub progress_checkpoints: Option<Vec<f32>>,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial camera position in world space.
    pub position: [f32; 3],
}

/// Orbit controls configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Enable pointer interaction.
    pub enabled: bool,
    /// Fraction of the pending motion applied per update (0 disables damping).
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Closest allowed distance from the orbit target.
    pub min_distance: f32,
    /// Farthest allowed distance from the orbit target.
    pub max_distance: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log frames per second once a second.
    pub show_fps: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Terra Globe".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            background: true,
            exposure: 1.0,
        }
    }
}

impl Default for GlobeParams {
    fn default() -> Self {
        Self {
            sun_intensity: 1.3,
            speed_factor: 2.0,
            metalness: 0.1,
            atmosphere: AtmosphereParams::default(),
        }
    }
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            opacity: 0.7,
            power_factor: 4.1,
            multiplier: 9.5,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            albedo: "Albedo.jpg".to_string(),
            bump: "Bump.jpg".to_string(),
            clouds: "Clouds.png".to_string(),
            ocean: "Ocean.png".to_string(),
            night_lights: "night_lights_modified.png".to_string(),
            environment: "Gaia_EDR3_darkened.png".to_string(),
            progress_checkpoints: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 30.0],
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 12.0,
            max_distance: 100.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: false,
            log_level: "info".to_string(),
        }
    }
}

impl AssetConfig {
    /// Full paths of the six maps in load order.
    pub fn paths(&self) -> [PathBuf; 6] {
        [
            self.root.join(&self.albedo),
            self.root.join(&self.bump),
            self.root.join(&self.clouds),
            self.root.join(&self.ocean),
            self.root.join(&self.night_lights),
            self.root.join(&self.environment),
        ]
    }
}

// --- Load / Save / Reload ---

const CONFIG_FILE: &str = "config.ron";

/// Where [`Config::load_or_create`] got its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from an existing `config.ron`.
    Loaded,
    /// No file existed; defaults were written.
    Created,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConfigSource::Loaded => "loaded",
            ConfigSource::Created => "created",
        })
    }
}

impl Config {
    /// `config.ron` inside `config_dir`.
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_or_create_with_source(config_dir).map(|(config, _)| config)
    }

    /// [`Config::load_or_create`], also reporting whether the file existed.
    /// Lets callers that start logging afterwards report the outcome.
    pub fn load_or_create_with_source(
        config_dir: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        let path = Self::file_path(config_dir);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            return Ok((config, ConfigSource::Created));
        }
        let config = read_config(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok((config, ConfigSource::Loaded))
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::file_path(config_dir);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(|source| {
            ConfigError::Encode {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-read `config.ron`; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let on_disk = read_config(&Self::file_path(config_dir))?;
        if on_disk == *self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(on_disk))
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| ConfigError::Syntax {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("speed_factor: 2.0"));
    }

    #[test]
    fn test_globe_defaults_match_tuned_values() {
        let params = GlobeParams::default();
        assert_eq!(params.sun_intensity, 1.3);
        assert_eq!(params.speed_factor, 2.0);
        assert_eq!(params.metalness, 0.1);
        assert_eq!(params.atmosphere.opacity, 0.7);
        assert_eq!(params.atmosphere.power_factor, 4.1);
        assert_eq!(params.atmosphere.multiplier, 9.5);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.assets.progress_checkpoints = Some(vec![0.2, 0.3, 0.4, 0.5, 0.7, 1.0]);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(globe: (speed_factor: 5.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.globe.speed_factor, 5.0);
        assert_eq!(config.globe.atmosphere, AtmosphereParams::default());
        assert_eq!(config.controls, ControlsConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_asset_paths_in_load_order() {
        let assets = AssetConfig {
            root: PathBuf::from("/data"),
            ..AssetConfig::default()
        };
        let paths = assets.paths();
        assert_eq!(paths[0], PathBuf::from("/data/Albedo.jpg"));
        assert_eq!(paths[2], PathBuf::from("/data/Clouds.png"));
        assert_eq!(paths[5], PathBuf::from("/data/Gaia_EDR3_darkened.png"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.globe.metalness = 0.4;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.globe.speed_factor = 8.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().globe.speed_factor, 8.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let (created, source) = Config::load_or_create_with_source(dir.path()).unwrap();
        assert_eq!(source, ConfigSource::Created);
        assert!(Config::file_path(dir.path()).exists());

        let (loaded, source) = Config::load_or_create_with_source(dir.path()).unwrap();
        assert_eq!(source, ConfigSource::Loaded);
        assert_eq!(loaded, created);
        assert_eq!(source.to_string(), "loaded");
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        match result {
            Err(ConfigError::Syntax { path, .. }) => assert!(path.ends_with("config.ron")),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }
}
