//! Perspective camera with reverse-Z projection.

use glam::{Mat4, Quat, Vec3};

/// A camera that generates view and projection matrices for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion. Identity looks down -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

/// Build a perspective camera at `position` looking at the origin.
pub fn create_camera(fov_y_degrees: f32, near: f32, far: f32, position: Vec3) -> Camera {
    let mut camera = Camera {
        position,
        fov_y: fov_y_degrees.to_radians(),
        near,
        far,
        ..Camera::default()
    };
    camera.look_at(Vec3::ZERO);
    camera
}

impl Camera {
    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Perspective projection with near mapped to depth 1 and far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        // Swapping near and far yields reverse-Z.
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Turn the camera toward `target`, keeping world +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or(Vec3::NEG_Z);
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(self.position, forward, up);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let camera = Camera::default();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_create_camera_faces_origin() {
        let camera = create_camera(45.0, 1.0, 1000.0, Vec3::new(0.0, 0.0, 30.0));
        assert!((camera.fov_y - 45.0_f32.to_radians()).abs() < 1e-6);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);

        let camera = create_camera(45.0, 1.0, 1000.0, Vec3::new(20.0, 5.0, -3.0));
        let expected = (-camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn test_look_at_from_pole() {
        let mut camera = Camera {
            position: Vec3::new(0.0, 25.0, 0.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = Camera {
            near: 1.0,
            far: 1000.0,
            ..Camera::default()
        };
        let proj = camera.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -1000.0, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-5);
        assert!((far.z / far.w).abs() < 1e-5);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera {
            position: Vec3::new(10.0, 20.0, 30.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Camera::default()
        };
        let reconstructed = camera.view_matrix().inverse().col(3).truncate();
        assert!((reconstructed - camera.position).length() < 1e-4);
    }

    #[test]
    fn test_aspect_ratio_ignores_zero_size() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(0.0, 0.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
