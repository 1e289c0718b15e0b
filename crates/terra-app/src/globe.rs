//! The globe viewer: loads the six maps, composes the scene, and spins it.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use terra_animation::AnimationSynchronizer;
use terra_assets::{GlobeTextures, ImageFileLoader, TextureAssetPipeline, TextureLoader};
use terra_config::{CliArgs, Config};
use terra_coords::{DEFAULT_LOCATIONS, Location};
use terra_render::{Camera, create_camera};
use terra_scene::{MarkerPlacer, PlanetaryBodyComposer, Scene, compose_scene, pin_texture};
use tracing::{debug, info, instrument, warn};
use winit::event::WindowEvent;

use crate::progress::FINAL_DELAY;
use crate::{App, AppError, LoadingProgress, OrbitControls};

/// Pixel size of the generated marker icon.
const PIN_SIZE: u32 = 64;

/// Seconds between checks of `config.ron` for changes.
const RELOAD_INTERVAL: f64 = 1.0;

/// Polls `config.ron` and re-applies command-line overrides to new values.
#[derive(Debug, Clone)]
pub struct ConfigWatch {
    dir: PathBuf,
    on_disk: Config,
    overrides: CliArgs,
}

impl ConfigWatch {
    /// `on_disk` is the config as loaded, before overrides.
    pub fn new(dir: PathBuf, on_disk: Config, overrides: CliArgs) -> Self {
        Self {
            dir,
            on_disk,
            overrides,
        }
    }

    /// The effective config when the file changed since the last poll.
    pub fn poll(&mut self) -> Option<Config> {
        match self.on_disk.reload(&self.dir) {
            Ok(Some(config)) => {
                self.on_disk = config.clone();
                let mut effective = config;
                effective.apply_cli_overrides(&self.overrides);
                Some(effective)
            }
            Ok(None) => None,
            Err(err) => {
                debug!("config reload skipped: {err}");
                None
            }
        }
    }
}

pub struct GlobeApp<L = ImageFileLoader> {
    config: Config,
    watch: Option<ConfigWatch>,
    pipeline: TextureAssetPipeline<L>,
    composer: PlanetaryBodyComposer,
    locations: Vec<Location>,
    scene: Option<Scene>,
    camera: Camera,
    controls: OrbitControls,
    synchronizer: AnimationSynchronizer,
    last_reload_check: f64,
}

impl GlobeApp<ImageFileLoader> {
    /// Viewer that reads textures from `config.assets.root`.
    pub fn new(config: Config) -> Self {
        Self::with_loader(config, ImageFileLoader)
    }
}

impl<L: TextureLoader> GlobeApp<L> {
    pub fn with_loader(config: Config, loader: L) -> Self {
        let mut pipeline = TextureAssetPipeline::new(loader);
        if let Some(checkpoints) = &config.assets.progress_checkpoints {
            pipeline = pipeline.with_checkpoints(checkpoints.clone());
        }
        let camera = create_camera(
            config.camera.fov_y_degrees,
            config.camera.near,
            config.camera.far,
            Vec3::from(config.camera.position),
        );
        let controls = OrbitControls::new(&camera, &config.controls);

        Self {
            config,
            watch: None,
            pipeline,
            composer: PlanetaryBodyComposer::default(),
            locations: DEFAULT_LOCATIONS.to_vec(),
            scene: None,
            camera,
            controls,
            synchronizer: AnimationSynchronizer::new(),
            last_reload_check: 0.0,
        }
    }

    /// Hot-reload tunables from disk while running.
    pub fn with_watch(mut self, watch: ConfigWatch) -> Self {
        self.watch = Some(watch);
        self
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn synchronizer(&self) -> &AnimationSynchronizer {
        &self.synchronizer
    }

    /// Load every texture, then compose and compile the scene.
    ///
    /// Nothing is composed unless all loads succeed.
    #[instrument(skip_all)]
    pub async fn build_scene(&self, progress: &mut LoadingProgress) -> Result<Scene, AppError> {
        let requests = GlobeTextures::requests(self.config.assets.paths());
        let loaded = self
            .pipeline
            .load(&requests, |fraction| progress.report(fraction))
            .await?;
        let textures = GlobeTextures::from_loaded(loaded)?;

        let markers = MarkerPlacer::new(Arc::new(pin_texture(PIN_SIZE)));
        let mut scene = compose_scene(
            &self.composer,
            &textures,
            &self.config.globe,
            &self.locations,
            &markers,
        );
        scene.compile_materials()?;
        info!(
            nodes = scene.group.len(),
            markers = self.locations.len(),
            "scene composed"
        );
        Ok(scene)
    }

    /// Pick up edits to `config.ron` while running.
    fn poll_config(&mut self, elapsed: f64) {
        if elapsed - self.last_reload_check < RELOAD_INTERVAL {
            return;
        }
        self.last_reload_check = elapsed;
        if let Some(config) = self.watch.as_mut().and_then(ConfigWatch::poll) {
            self.apply_config(config);
        }
    }

    /// Swap in a new config. Tunables reach the live scene immediately;
    /// asset and window settings need a restart.
    pub fn apply_config(&mut self, config: Config) {
        if config.assets != self.config.assets || config.window != self.config.window {
            warn!("asset and window changes take effect after restart");
        }
        if let Some(scene) = &mut self.scene {
            scene.apply_params(&config.globe);
        }
        self.controls.enabled = config.controls.enabled;
        self.controls.damping_factor = config.controls.damping_factor.clamp(0.0, 1.0);
        self.controls.rotate_speed = config.controls.rotate_speed;
        self.controls.zoom_speed = config.controls.zoom_speed;
        self.controls.min_distance = config.controls.min_distance;
        self.controls.max_distance = config.controls.max_distance;
        info!(speed_factor = config.globe.speed_factor, "applied config");
        self.config = config;
    }
}

impl<L: TextureLoader> App for GlobeApp<L> {
    fn init_scene(&mut self, progress: &mut LoadingProgress) -> Result<(), AppError> {
        let scene = pollster::block_on(self.build_scene(progress))?;
        progress.finish(Some(FINAL_DELAY));
        self.scene = Some(scene);
        Ok(())
    }

    fn update_scene(&mut self, interval: f64, elapsed: f64) {
        self.poll_config(elapsed);
        let Some(scene) = &mut self.scene else {
            return;
        };
        self.synchronizer.update(
            interval,
            elapsed,
            scene,
            &self.config.globe,
            &mut self.controls,
        );
        self.controls.apply(&mut self.camera);
    }

    fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        self.controls.set_viewport_height(height);
    }

    fn window_event(&mut self, event: &WindowEvent) {
        self.controls.handle_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use terra_animation::{BASE_ANGULAR_RATE, uv_offset};
    use terra_assets::{AssetError, TextureRequest, TextureResource};

    /// Solid-color textures; fails on the request at `fail_at`.
    struct SolidLoader {
        calls: Cell<usize>,
        fail_at: Option<usize>,
    }

    impl SolidLoader {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                calls: Cell::new(0),
                fail_at,
            }
        }
    }

    impl TextureLoader for SolidLoader {
        async fn load(&self, request: &TextureRequest) -> Result<TextureResource, AssetError> {
            let index = self.calls.get();
            self.calls.set(index + 1);
            if self.fail_at == Some(index) {
                return Err(AssetError::Io {
                    path: request.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                });
            }
            Ok(TextureResource::solid(request.label(), [120, 140, 200, 255])
                .with_color_space(request.color_space)
                .with_mapping(request.mapping))
        }
    }

    fn app(fail_at: Option<usize>) -> GlobeApp<SolidLoader> {
        GlobeApp::with_loader(Config::default(), SolidLoader::new(fail_at))
    }

    #[test]
    fn test_init_builds_compiled_scene() {
        let mut app = app(None);
        let mut progress = LoadingProgress::new(None, "test");
        app.init_scene(&mut progress).unwrap();

        assert_eq!(progress.reports().len(), 6);
        assert_eq!(progress.reports().last(), Some(&1.0));
        let scene = app.scene().unwrap();
        assert!(scene.has_body());
        assert_eq!(scene.group.len(), 3 + DEFAULT_LOCATIONS.len());
        assert_eq!(uv_offset(scene), Some(0.0));
    }

    #[test]
    fn test_failed_load_leaves_no_scene() {
        let mut app = app(Some(3));
        let mut progress = LoadingProgress::new(None, "test");
        let err = app.init_scene(&mut progress).unwrap_err();

        assert!(matches!(err, AppError::Asset(AssetError::Io { .. })));
        assert!(app.scene().is_none());
        assert_eq!(progress.reports().len(), 3);
    }

    #[test]
    fn test_update_before_init_is_a_no_op() {
        let mut app = app(None);
        app.update_scene(0.016, 0.016);
        assert!(app.scene().is_none());
        assert_eq!(app.synchronizer().frames(), 0);
    }

    #[test]
    fn test_frames_rotate_globe_and_offset() {
        let mut app = app(None);
        app.init_scene(&mut LoadingProgress::new(None, "test"))
            .unwrap();
        let start = app.scene().unwrap().group.yaw();

        let mut elapsed = 0.0;
        for _ in 0..3 {
            elapsed += 0.016;
            app.update_scene(0.016, elapsed);
        }

        let expected = 3.0 * 0.016 * BASE_ANGULAR_RATE * app.config().globe.speed_factor;
        let scene = app.scene().unwrap();
        assert!((scene.group.yaw() - start - expected).abs() < 1e-12);
        let offset = uv_offset(scene).unwrap();
        assert!((f64::from(offset) - expected / std::f64::consts::TAU).abs() < 1e-6);
    }

    #[test]
    fn test_apply_config_updates_live_scene() {
        let mut app = app(None);
        app.init_scene(&mut LoadingProgress::new(None, "test"))
            .unwrap();

        let mut config = Config::default();
        config.globe.sun_intensity = 3.0;
        config.globe.speed_factor = 0.0;
        config.controls.enabled = false;
        app.apply_config(config);

        let scene = app.scene().unwrap();
        assert_eq!(scene.sun.as_ref().unwrap().intensity, 3.0);
        let yaw = scene.group.yaw();
        app.update_scene(0.5, 0.5);
        assert_eq!(app.scene().unwrap().group.yaw(), yaw);
    }

    #[test]
    fn test_custom_checkpoints_are_used() {
        let mut config = Config::default();
        config.assets.progress_checkpoints = Some(vec![0.1, 0.2, 0.3, 0.4, 0.9, 1.0]);
        let mut app = GlobeApp::with_loader(config, SolidLoader::new(None));
        let mut progress = LoadingProgress::new(None, "test");
        app.init_scene(&mut progress).unwrap();
        assert_eq!(progress.reports(), &[0.1, 0.2, 0.3, 0.4, 0.9, 1.0]);
    }

    #[test]
    fn test_watch_reapplies_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = Config::default();
        on_disk.save(dir.path()).unwrap();
        let overrides = CliArgs {
            speed_factor: Some(5.0),
            ..CliArgs::default()
        };
        let mut watch = ConfigWatch::new(dir.path().to_path_buf(), on_disk.clone(), overrides);
        assert!(watch.poll().is_none());

        let mut edited = on_disk;
        edited.globe.sun_intensity = 2.5;
        edited.save(dir.path()).unwrap();
        let effective = watch.poll().unwrap();
        assert_eq!(effective.globe.sun_intensity, 2.5);
        assert_eq!(effective.globe.speed_factor, 5.0);
        assert!(watch.poll().is_none());
    }

    #[test]
    fn test_watch_ignores_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut watch =
            ConfigWatch::new(dir.path().to_path_buf(), Config::default(), CliArgs::default());
        assert!(watch.poll().is_none());
    }
}
