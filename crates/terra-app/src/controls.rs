//! Orbit camera controls.
//!
//! The camera sits on a sphere around the origin. Dragging adds angular
//! velocity, the wheel scales the distance, and [`Controls::update`] applies
//! the pending motion with damping once per frame.

use std::f32::consts::PI;

use glam::Vec3;
use terra_animation::Controls;
use terra_config::ControlsConfig;
use terra_render::Camera;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Keeps the camera off the poles.
const POLAR_EPSILON: f32 = 1e-6;

/// Pixels per wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, zero on +Z.
    theta: f32,
    delta_phi: f32,
    delta_theta: f32,
    zoom_scale: f32,
    dragging: bool,
    cursor: Option<(f64, f64)>,
    viewport_height: f32,
}

impl OrbitControls {
    /// Start from the camera's current position.
    pub fn new(camera: &Camera, config: &ControlsConfig) -> Self {
        let offset = camera.position;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            enabled: config.enabled,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            radius: radius.clamp(config.min_distance, config.max_distance),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
            delta_phi: 0.0,
            delta_theta: 0.0,
            zoom_scale: 1.0,
            dragging: false,
            cursor: None,
            viewport_height: 1.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    /// Move `camera` to the orbit position, looking at the origin.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position();
        camera.look_at(Vec3::ZERO);
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Rotate by a cursor movement in pixels. A drag across the full viewport
    /// height turns the globe once.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        let per_pixel = 2.0 * PI / self.viewport_height * self.rotate_speed;
        self.delta_theta -= dx * per_pixel;
        self.delta_phi -= dy * per_pixel;
    }

    /// Positive steps zoom in.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.zoom_scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Feed a window event. Returns `true` when it was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if self.dragging
                    && let Some((x, y)) = self.cursor
                {
                    self.rotate_by_pixels((current.0 - x) as f32, (current.1 - y) as f32);
                }
                self.cursor = Some(current);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.zoom(steps);
                true
            }
            _ => false,
        }
    }
}

impl Controls for OrbitControls {
    fn update(&mut self, _interval: f64) {
        let damping = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };
        self.theta += self.delta_theta * damping;
        self.phi = (self.phi + self.delta_phi * damping).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        self.delta_theta *= 1.0 - damping;
        self.delta_phi *= 1.0 - damping;
        self.zoom_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_render::create_camera;

    fn controls() -> (Camera, OrbitControls) {
        let camera = create_camera(45.0, 1.0, 1000.0, Vec3::new(0.0, 0.0, 30.0));
        let controls = OrbitControls::new(&camera, &ControlsConfig::default());
        (camera, controls)
    }

    #[test]
    fn test_starts_at_camera_position() {
        let (camera, controls) = controls();
        assert!((controls.position() - camera.position).length() < 1e-4);
        assert!((controls.distance() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped_to_distance_range() {
        let (_, mut controls) = controls();
        for _ in 0..200 {
            controls.zoom(5.0);
            controls.update(0.016);
        }
        assert!((controls.distance() - 12.0).abs() < 1e-4);

        for _ in 0..200 {
            controls.zoom(-5.0);
            controls.update(0.016);
        }
        assert!((controls.distance() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let (_, mut controls) = controls();
        controls.set_viewport_height(720);
        controls.rotate_by_pixels(100.0, 0.0);
        let start = controls.theta;
        controls.update(0.016);
        let first = controls.theta - start;
        controls.update(0.016);
        let second = controls.theta - start - first;

        assert!(first < 0.0);
        assert!(second < 0.0 && second.abs() < first.abs());
        assert!((second / first - 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_stays_off_the_poles() {
        let (_, mut controls) = controls();
        controls.set_viewport_height(100);
        controls.rotate_by_pixels(0.0, -10_000.0);
        for _ in 0..500 {
            controls.update(0.016);
        }
        assert!(controls.phi > 0.0 && controls.phi < PI);
        assert!(controls.position().is_finite());
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let (_, mut controls) = controls();
        controls.enabled = false;
        controls.zoom(10.0);
        controls.rotate_by_pixels(50.0, 50.0);
        let before = controls.position();
        controls.update(0.016);
        assert_eq!(controls.position(), before);
    }

    #[test]
    fn test_apply_points_camera_at_origin() {
        let (mut camera, mut controls) = controls();
        controls.set_viewport_height(720);
        controls.rotate_by_pixels(200.0, 50.0);
        for _ in 0..100 {
            controls.update(0.016);
        }
        controls.apply(&mut camera);
        let to_origin = (-camera.position).normalize();
        assert!(camera.forward().dot(to_origin) > 0.9999);
    }
}
