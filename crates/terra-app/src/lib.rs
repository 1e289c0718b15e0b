//! The Terra globe viewer application.
//!
//! [`run_app`] owns the window, the GPU and the frame loop; [`GlobeApp`] is the
//! [`App`] that loads the textures, composes the globe and keeps it spinning.

mod app;
mod clock;
mod controls;
mod error;
mod fps;
mod globe;
mod platform;
mod progress;

pub use app::{App, renderer_options, run_app, window_attributes};
pub use clock::{FrameClock, MAX_FRAME_INTERVAL, clamp_interval};
pub use controls::OrbitControls;
pub use error::AppError;
pub use fps::FpsCounter;
pub use globe::{ConfigWatch, GlobeApp};
pub use platform::{PlatformDirs, PlatformError};
pub use progress::{FINAL_DELAY, LoadingProgress};
