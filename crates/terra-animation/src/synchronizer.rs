use std::f64::consts::TAU;

use terra_config::GlobeParams;
use terra_materials::UV_X_OFFSET;
use terra_scene::Scene;
use tracing::{debug, trace};

/// Yaw rate in radians per second at `speed_factor == 1`.
pub const BASE_ANGULAR_RATE: f64 = 0.005;

/// Camera interaction that needs a damping step once per frame.
pub trait Controls {
    fn update(&mut self, interval: f64);
}

/// Drives rotation and the cloud-shadow offset from frame time.
///
/// Everything scales with `interval`, so the visual speed does not depend on
/// the frame rate.
#[derive(Debug, Default)]
pub struct AnimationSynchronizer {
    frames: u64,
    elapsed: f64,
    shader_live: bool,
    /// Shadow offset in turns, kept in f64 so it tracks the yaw exactly.
    shadow_turns: f64,
    /// Value last stored in the uniform. Anything else there means a fresh
    /// compile, and the accumulator restarts from it.
    written: Option<f32>,
}

impl AnimationSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame. `interval` is the time since the previous frame and
    /// `elapsed` the time since the loop started, both in seconds.
    pub fn update(
        &mut self,
        interval: f64,
        elapsed: f64,
        scene: &mut Scene,
        params: &GlobeParams,
        controls: &mut dyn Controls,
    ) {
        controls.update(interval);

        let delta = interval * BASE_ANGULAR_RATE * params.speed_factor;
        scene.group.rotate_yaw(delta);

        let written = scene
            .group
            .body_material_mut()
            .and_then(|body| body.compiled_mut())
            .and_then(|compiled| {
                let current = compiled.uniforms.float(UV_X_OFFSET)?;
                if self.written != Some(current) {
                    self.shadow_turns = f64::from(current);
                }
                self.shadow_turns = (self.shadow_turns + delta / TAU).rem_euclid(1.0);
                // Rounding to f32 can land exactly on 1.0.
                let value = match self.shadow_turns as f32 {
                    v if v >= 1.0 => 0.0,
                    v => v,
                };
                compiled.uniforms.set_float(UV_X_OFFSET, value).ok()?;
                Some(value)
            });
        self.written = written;
        let live = written.is_some();

        if live && !self.shader_live {
            debug!(frame = self.frames, "cloud shadow offset now tracking rotation");
        }
        self.shader_live = live;
        self.frames += 1;
        self.elapsed = elapsed;
        trace!(interval, elapsed, yaw = scene.group.yaw(), "animation step");
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `elapsed` as of the last update.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether the last update found a compiled body shader to drive.
    pub fn shader_live(&self) -> bool {
        self.shader_live
    }
}

/// Current cloud-shadow offset, once the body shader has compiled.
pub fn uv_offset(scene: &Scene) -> Option<f32> {
    scene
        .group
        .body_material()?
        .compiled()?
        .uniforms
        .float(UV_X_OFFSET)
}
