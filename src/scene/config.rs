//! Scene configuration.
//!
//! Every default of the generated scene lives here so that variable scenes
//! can be described in a JSON file instead of code. Missing fields fall
//! back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Camera, ViewCamera, MAX_SH_COEFFS};
use crate::util::{Error, Result};

/// Largest accepted deviation of `rotation` from unit length.
const UNIT_TOLERANCE: f32 = 1e-3;

/// Viewer-style camera placement, an alternative to explicit intrinsics
/// and pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub position: [f32; 3],
    pub yaw: f32,   // degrees
    pub pitch: f32, // degrees
    pub fov: f32,   // vertical, degrees
}

impl Default for ViewConfig {
    fn default() -> Self {
        let view = ViewCamera::default();
        Self {
            position: view.position.to_array(),
            yaw: view.yaw,
            pitch: view.pitch,
            fov: view.fov,
        }
    }
}

impl ViewConfig {
    /// The viewer camera described by this block.
    pub fn view_camera(&self) -> ViewCamera {
        ViewCamera {
            position: glam::Vec3::from_array(self.position),
            yaw: self.yaw,
            pitch: self.pitch,
            fov: self.fov,
        }
    }
}

/// Parameters of a generated scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // Image
    pub width: i64,
    pub height: i64,

    // Intrinsics; principal point defaults to the image centre
    pub fx: f32,
    pub fy: f32,
    pub cx: Option<f32>,
    pub cy: Option<f32>,

    // World-to-camera pose
    pub rotation: [f32; 4], // w, x, y, z
    pub translation: [f32; 3],

    // Points
    pub extent: f32, // half size of the cube
    pub opacity: f32,
    pub scale: f32, // linear, stored as ln(scale)
    pub sh_coeffs: usize,

    // Replaces fx, fy, cx, cy, rotation and translation when present
    pub view: Option<ViewConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fx: 800.0,
            fy: 800.0,
            cx: None,
            cy: None,
            rotation: [1.0, 0.0, 0.0, 0.0],
            translation: [0.0, 0.0, -5.0],
            extent: 1.0,
            opacity: 0.0,
            scale: 0.01,
            sh_coeffs: 15,
            view: None,
        }
    }
}

impl SceneConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_json(&text)
    }

    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise return the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::invalid(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(Error::invalid(format!("extent must be positive, got {}", self.extent)));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::invalid(format!("scale must be positive, got {}", self.scale)));
        }
        let q = glam::Vec4::from_array(self.rotation);
        if !q.is_finite() || (q.length() - 1.0).abs() > UNIT_TOLERANCE {
            return Err(Error::invalid(format!(
                "rotation must be a unit quaternion, got {:?} (length {})",
                self.rotation,
                q.length()
            )));
        }
        if self.sh_coeffs > MAX_SH_COEFFS {
            return Err(Error::invalid(format!(
                "sh_coeffs must be at most {}, got {}",
                MAX_SH_COEFFS, self.sh_coeffs
            )));
        }
        if let Some(view) = &self.view {
            let finite = view.position.iter().all(|v| v.is_finite())
                && view.yaw.is_finite()
                && view.pitch.is_finite();
            if !finite || !(view.fov > 0.0 && view.fov < 180.0) {
                return Err(Error::invalid(format!(
                    "view needs a finite pose and 0 < fov < 180, got {:?}",
                    view
                )));
            }
        }
        Ok(())
    }

    /// Principal point x.
    pub fn cx(&self) -> f32 {
        self.cx.unwrap_or((self.width as f64 / 2.0) as f32)
    }

    /// Principal point y.
    pub fn cy(&self) -> f32 {
        self.cy.unwrap_or((self.height as f64 / 2.0) as f32)
    }

    /// Per-point log scale.
    pub fn log_scale(&self) -> f32 {
        (self.scale as f64).ln() as f32
    }

    /// Camera described by this config.
    ///
    /// A `view` block takes precedence over the explicit camera fields.
    /// The rotation is normalized.
    pub fn camera(&self) -> Camera {
        if let Some(view) = &self.view {
            return Camera::from_view(&view.view_camera(), self.width, self.height);
        }
        let [w, x, y, z] = self.rotation;
        let [tx, ty, tz] = self.translation;
        Camera {
            width: self.width,
            height: self.height,
            fx: self.fx,
            fy: self.fy,
            cx: self.cx(),
            cy: self.cy(),
            rotation: glam::Quat::from_xyzw(x, y, z, w).normalize(),
            translation: glam::Vec3::new(tx, ty, tz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SceneConfig::default();
        assert_eq!(c.cx(), 400.0);
        assert_eq!(c.cy(), 300.0);
        assert_eq!(c.log_scale(), (0.01f64).ln() as f32);
        let cam = c.camera();
        assert_eq!(cam.rotation, glam::Quat::IDENTITY);
        assert_eq!(cam.translation, glam::Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_partial_json() {
        let c = SceneConfig::from_json(r#"{ "width": 1920, "height": 1080, "cx": 900.5 }"#).unwrap();
        assert_eq!(c.width, 1920);
        assert_eq!(c.cx(), 900.5);
        assert_eq!(c.cy(), 540.0);
        assert_eq!(c.fx, 800.0);
        assert_eq!(c.sh_coeffs, 15);
    }

    #[test]
    fn test_roundtrip_json() {
        let c = SceneConfig { opacity: 0.5, translation: [1.0, 2.0, 3.0], ..Default::default() };
        let text = serde_json::to_string_pretty(&c).unwrap();
        assert_eq!(SceneConfig::from_json(&text).unwrap(), c);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(SceneConfig::from_json("{ not json"), Err(Error::Config(_))));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "width": 0 }"#),
            Err(Error::InvalidStructure(_))
        ));
        assert!(SceneConfig::from_json(r#"{ "scale": -1.0 }"#).is_err());
        assert!(SceneConfig::from_json(r#"{ "rotation": [2.0, 0.0, 0.0, 0.0] }"#).is_err());
        assert!(SceneConfig::from_json(r#"{ "rotation": [0.0, 0.0, 0.0, 0.0] }"#).is_err());
        assert!(SceneConfig::from_json(r#"{ "sh_coeffs": 1000000000000000000 }"#).is_err());
        assert!(SceneConfig::from_json(r#"{ "sh_coeffs": 16 }"#).is_err());
        assert!(SceneConfig::from_json(r#"{ "view": { "fov": 180.0 } }"#).is_err());
    }

    #[test]
    fn test_rotation_is_normalized() {
        let c = SceneConfig::from_json(r#"{ "rotation": [0.7071, 0.0, 0.7071, 0.0] }"#).unwrap();
        assert!((c.camera().rotation.length() - 1.0).abs() < 1e-6);
        assert!(SceneConfig::from_json(r#"{ "sh_coeffs": 3 }"#).is_ok());
    }

    #[test]
    fn test_view_block() {
        let c = SceneConfig::from_json(
            r#"{ "width": 640, "height": 480, "view": { "yaw": 0.0, "fov": 45.0 } }"#,
        )
        .unwrap();
        let view = c.view.as_ref().unwrap();
        assert_eq!(view.position, [0.0, 0.0, -5.0]);
        let cam = c.camera();
        assert_eq!(cam, Camera::from_view(&view.view_camera(), 640, 480));
        assert_eq!(cam.cx, 320.0);
        assert!((cam.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("scene.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert_eq!(SceneConfig::load_or_default(None).unwrap(), SceneConfig::default());
    }
}
