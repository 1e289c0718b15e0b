//! Command-line argument parsing for the globe viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terra globe command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "terra-globe", about = "Interactive textured globe viewer")]
pub struct CliArgs {
    #[arg(long, value_name = "PX", help = "Window width in pixels")]
    pub width: Option<u32>,

    #[arg(long, value_name = "PX", help = "Window height in pixels")]
    pub height: Option<u32>,

    #[arg(long, value_name = "BOOL", help = "Start borderless fullscreen")]
    pub fullscreen: Option<bool>,

    /// Multiplies the globe, cloud and marker rotation rates.
    #[arg(short = 's', long, value_name = "FACTOR")]
    pub speed_factor: Option<f64>,

    /// Directory holding the earth texture maps.
    #[arg(short = 'a', long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// One of error, warn, info, debug or trace.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Directory holding `config.ron`, in place of the platform default.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overwrite every setting the command line names; others keep their
    /// loaded value.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let window = &mut self.window;
        window.width = args.width.unwrap_or(window.width);
        window.height = args.height.unwrap_or(window.height);
        window.fullscreen = args.fullscreen.unwrap_or(window.fullscreen);
        self.globe.speed_factor = args.speed_factor.unwrap_or(self.globe.speed_factor);
        if let Some(root) = &args.assets {
            self.assets.root.clone_from(root);
        }
        if let Some(level) = &args.log_level {
            self.debug.log_level.clone_from(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            speed_factor: Some(4.0),
            assets: Some(PathBuf::from("/tmp/maps")),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.globe.speed_factor, 4.0);
        assert_eq!(config.assets.root, PathBuf::from("/tmp/maps"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.globe.metalness, 0.1);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["terra-globe", "--speed-factor", "3.5", "--log-level", "debug"]);
        assert_eq!(args.speed_factor, Some(3.5));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.width.is_none());

        let short = CliArgs::parse_from(["terra-globe", "-s", "2", "-a", "/srv/maps"]);
        assert_eq!(short.speed_factor, Some(2.0));
        assert_eq!(short.assets, Some(PathBuf::from("/srv/maps")));
    }
}
