//! `terra-globe`: an interactive 3D Earth with location markers.

use clap::Parser;
use terra_app::{AppError, ConfigWatch, GlobeApp, PlatformDirs, run_app};
use terra_config::{CliArgs, Config};
use tracing::info;

fn run(args: CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir.clone()),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let (on_disk, source) = Config::load_or_create_with_source(&dirs.config_dir)?;
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);

    terra_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Terra Globe {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Window: {}x{} | Assets: {}",
        config.window.width,
        config.window.height,
        config.assets.root.display()
    );
    info!(
        "Config {source} from {}",
        Config::file_path(&dirs.config_dir).display()
    );

    let watch = ConfigWatch::new(dirs.config_dir, on_disk, args);
    let app = GlobeApp::new(config.clone()).with_watch(watch);
    run_app(app, config)
}

fn main() {
    let args = CliArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("terra-globe: {err}");
        std::process::exit(1);
    }
}
