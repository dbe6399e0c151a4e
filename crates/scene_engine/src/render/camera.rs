//! # Scene Camera
//!
//! Perspective camera used by the viewer. The camera itself never moves: the mouse
//! controls transform the model instead (see [`crate::input`]), so the camera only
//! changes shape when the window is resized.
//!
//! ## Conventions
//! - Right-handed, Y-up view space
//! - OpenGL clip space, depth mapped to [-1, 1]
//! - Column vectors: a point is transformed as `P * V * M * p`

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Field of view used after a window resize, in degrees
pub const RESIZE_FOV_DEGREES: f32 = 45.0;
/// Near plane used after a window resize
pub const RESIZE_NEAR: f32 = 0.05;
/// Far plane used after a window resize
pub const RESIZE_FAR: f32 = 350.0;

/// Perspective camera defined by eye, target and up vectors
///
/// # Example
/// ```rust
/// use scene_engine::foundation::math::Vec3;
/// use scene_engine::render::camera::Camera;
///
/// let mut camera = Camera::new(
///     Vec3::new(0.0, 40.0, -140.0),
///     Vec3::new(0.0, 40.0, 0.0),
///     Vec3::y(),
/// );
/// camera.set_shape(50.0, 1024.0 / 720.0, 10.0, 8000.0);
/// let vp = camera.view_projection_matrix();
/// # let _ = vp;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Vec3,

    /// Point the camera looks at
    pub target: Vec3,

    /// Up vector
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Width / height
    pub aspect: f32,

    /// Near clipping plane
    pub near: f32,

    /// Far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a camera with the viewer's initial shape (50 degrees, 1024x720, 10 to 8000)
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let defaults = CameraConfig::default();
        let mut camera = Self {
            position,
            target,
            up,
            fov: 0.0,
            aspect: 1.0,
            near: defaults.near,
            far: defaults.far,
        };
        camera.set_shape(
            defaults.fov_degrees,
            defaults.width as f32 / defaults.height as f32,
            defaults.near,
            defaults.far,
        );
        camera
    }

    /// Create the initial camera from configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(
            Vec3::from(config.from),
            Vec3::from(config.to),
            Vec3::from(config.up),
        );
        camera.set_shape(
            config.fov_degrees,
            config.width as f32 / config.height.max(1) as f32,
            config.near,
            config.far,
        );
        camera
    }

    /// Set eye, target and up together
    pub fn set(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.position = position;
        self.target = target;
        self.up = up;
        log::trace!("Camera set - from: {:?}, to: {:?}, up: {:?}", position, target, up);
    }

    /// Set the projection shape
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Width / height of the viewport
    /// * `near` - Near clipping plane (must be > 0)
    /// * `far` - Far clipping plane (must be > near)
    pub fn set_shape(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.fov = utils::deg_to_rad(fov_degrees);
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        log::trace!(
            "Camera shape - fov: {:.1}, aspect: {:.3}, near: {}, far: {}",
            fov_degrees,
            aspect,
            near,
            far
        );
    }

    /// Reshape for a new window size
    ///
    /// The viewer switches to a tighter projection once the window has been resized.
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        log::info!("Camera resized to {}x{} (aspect {:.3})", width, height, aspect);
        self.set_shape(RESIZE_FOV_DEGREES, aspect, RESIZE_NEAR, RESIZE_FAR);
    }

    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// View to clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined `P * V`
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matches_initial_scene() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 40.0, -140.0));
        assert_eq!(camera.target, Vec3::new(0.0, 40.0, 0.0));
        assert_relative_eq!(camera.fov, 50.0_f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(camera.aspect, 1024.0 / 720.0, epsilon = 1e-6);
        assert_eq!((camera.near, camera.far), (10.0, 8000.0));
    }

    #[test]
    fn test_resize_uses_tight_projection() {
        let mut camera = Camera::default();
        camera.resize(800, 400);
        assert_relative_eq!(camera.fov, 45.0_f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(camera.aspect, 2.0);
        assert_eq!((camera.near, camera.far), (RESIZE_NEAR, RESIZE_FAR));
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera::default();
        let clip = camera.view_projection_matrix() * Vec4::new(0.0, 40.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > -1.0 && depth < 1.0);
    }
}
