//! The application contract and the winit runner that drives it.
//!
//! [`run_app`] opens the window and the GPU, calls [`App::init_scene`] exactly
//! once and only then starts calling [`App::update_scene`] every frame.

use std::sync::Arc;

use terra_config::Config;
use terra_render::{
    Camera, GlobeRenderer, RenderContext, RenderError, RendererOptions, SurfaceError,
    create_renderer,
};
use terra_scene::Scene;
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::{AppError, FpsCounter, FrameClock, LoadingProgress};

pub trait App {
    /// Build the scene. Runs to completion before the first frame.
    fn init_scene(&mut self, progress: &mut LoadingProgress) -> Result<(), AppError>;

    /// Advance the scene by `interval` seconds; `elapsed` is the clock total.
    fn update_scene(&mut self, interval: f64, elapsed: f64);

    /// `None` until [`App::init_scene`] has succeeded.
    fn scene(&self) -> Option<&Scene>;

    fn camera(&self) -> &Camera;

    /// Called with the new physical size whenever the surface changes.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Input events the runner does not handle itself.
    fn window_event(&mut self, _event: &WindowEvent) {}
}

/// Window attributes from the `window` config section.
pub fn window_attributes(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Renderer options from the `window` and `render` config sections.
pub fn renderer_options(config: &Config) -> RendererOptions {
    RendererOptions {
        vsync: config.window.vsync,
        clear_color: config.render.clear_color,
        exposure: config.render.exposure,
        background: config.render.background,
        ..RendererOptions::default()
    }
}

struct Runner<A> {
    app: A,
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<(RenderContext, GlobeRenderer)>,
    clock: FrameClock,
    fps: Option<FpsCounter>,
    error: Option<AppError>,
}

impl<A: App> Runner<A> {
    fn new(app: A, config: Config) -> Self {
        let fps = config.debug.show_fps.then(FpsCounter::new);
        Self {
            app,
            config,
            window: None,
            gpu: None,
            clock: FrameClock::new(),
            fps,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes(&self.config))?);
        self.window = Some(Arc::clone(&window));

        let (ctx, mut renderer) = create_renderer(
            Arc::clone(&window),
            renderer_options(&self.config),
            |options| options.srgb_output = true,
        )?;
        let (width, height) = ctx.size();
        self.app.resize(width, height);

        let mut progress = LoadingProgress::new(Some(window), self.config.window.title.clone());
        self.app.init_scene(&mut progress)?;
        let scene = self.app.scene().ok_or(AppError::NoScene)?;
        renderer.prepare(&ctx, scene)?;

        self.gpu = Some((ctx, renderer));
        self.clock = FrameClock::new();
        info!("Scene ready, entering frame loop");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            error!("  caused by: {cause}");
            source = cause.source();
        }
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some((ctx, renderer)) = &mut self.gpu else {
            return;
        };
        let (interval, elapsed) = self.clock.tick();
        self.app.update_scene(interval, elapsed);
        if let Some(fps) = &mut self.fps {
            fps.tick(elapsed);
        }

        let Some(scene) = self.app.scene() else {
            return;
        };
        match renderer.render(ctx, scene, self.app.camera()) {
            Ok(()) => {}
            Err(RenderError::Surface(SurfaceError::Lost)) => {
                let (width, height) = ctx.size();
                warn!("Surface lost, reconfiguring {width}x{height}");
                ctx.resize(width, height);
            }
            Err(err) => {
                self.fail(event_loop, err.into());
                return;
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl<A: App> ApplicationHandler for Runner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some((ctx, renderer)) = &mut self.gpu {
                    ctx.resize(size.width, size.height);
                    renderer.resize(ctx);
                    let (width, height) = ctx.size();
                    self.app.resize(width, height);
                    info!("Window resized to {width}x{height}");
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.app.window_event(&other),
        }
    }
}

/// Run `app` until the window closes.
///
/// Initialization failures end the event loop and are returned here.
#[instrument(skip_all)]
pub fn run_app<A: App>(app: A, config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut runner = Runner::new(app, config);
    event_loop.run_app(&mut runner)?;
    match runner.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_follow_config() {
        let mut config = Config::default();
        config.window.title = "Globe".into();
        config.window.width = 800;
        config.window.height = 600;
        let attributes = window_attributes(&config);
        assert_eq!(attributes.title, "Globe");
        assert_eq!(
            attributes.inner_size,
            Some(LogicalSize::new(800.0, 600.0).into())
        );
        assert!(attributes.fullscreen.is_none());
    }

    #[test]
    fn test_fullscreen_is_borderless() {
        let mut config = Config::default();
        config.window.fullscreen = true;
        let attributes = window_attributes(&config);
        assert!(matches!(
            attributes.fullscreen,
            Some(Fullscreen::Borderless(None))
        ));
    }

    #[test]
    fn test_renderer_options_follow_config() {
        let mut config = Config::default();
        config.window.vsync = false;
        config.render.exposure = 1.5;
        config.render.background = false;
        let options = renderer_options(&config);
        assert!(!options.vsync);
        assert_eq!(options.exposure, 1.5);
        assert!(!options.background);
        assert!(options.srgb_output);
    }
}
