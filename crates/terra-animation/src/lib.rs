//! Per-frame animation of the globe.
//!
//! [`AnimationSynchronizer`] advances the group's yaw and the body shader's
//! cloud-shadow offset together so the shadows stay under the clouds.

mod synchronizer;

pub use synchronizer::{AnimationSynchronizer, BASE_ANGULAR_RATE, Controls, uv_offset};
