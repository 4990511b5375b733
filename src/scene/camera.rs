//! Pinhole camera with a world-to-camera pose.

use glam::{Quat, Vec3};

/// Camera as consumed by the renderer: image size, pinhole intrinsics and
/// the world-to-camera rotation and translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub width: i64,
    pub height: i64,
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    /// World-to-camera rotation (unit quaternion).
    pub rotation: Quat,
    /// World-to-camera translation.
    pub translation: Vec3,
}

impl Camera {
    /// Build a camera from an interactive viewer camera.
    ///
    /// Intrinsics come from the vertical field of view with the principal
    /// point at the image centre. The pose inverts the viewer's
    /// camera-to-world orientation and position.
    pub fn from_view(view: &ViewCamera, width: i64, height: i64) -> Self {
        let tan_half_fov = (view.fov.to_radians() / 2.0).tan();
        let q_w2c = view.orientation().conjugate();
        Self {
            width,
            height,
            fx: width as f32 / (2.0 * tan_half_fov),
            fy: height as f32 / (2.0 * tan_half_fov),
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
            rotation: q_w2c,
            translation: q_w2c * -view.position,
        }
    }

    /// Map a world point into camera space.
    pub fn world_to_camera(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Project a camera-space point to pixel coordinates.
    /// Returns None for points at or behind the image plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32)> {
        if p.z <= 0.0 {
            return None;
        }
        Some((self.fx * p.x / p.z + self.cx, self.fy * p.y / p.z + self.cy))
    }
}

/// Free-flying viewer camera: position plus yaw/pitch in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
        }
    }
}

impl ViewCamera {
    /// Camera-to-world orientation from yaw and pitch.
    pub fn orientation(&self) -> Quat {
        let (sy, cy) = (self.yaw.to_radians() / 2.0).sin_cos();
        let (sp, cp) = (self.pitch.to_radians() / 2.0).sin_cos();
        Quat::from_xyzw(cy * sp, sy * cp, -sy * sp, cy * cp)
    }
}
