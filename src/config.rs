//! Exported viewer configuration.
//!
//! Model transform and camera pose, persisted as JSON so a framing can be
//! restored later. `camera_pose` is stored row-major, as it is usually read
//! and written by hand.

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::renderer::params::TransformValues;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub translation: [f32; 3],
    /// Roll, pitch, yaw in radians.
    pub rotation: [f32; 3],
    pub scale: f32,
    /// Camera-to-world pose, row-major.
    pub camera_pose: [[f32; 4]; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::from_parts(&TransformValues::default(), crate::scene::OrthographicCamera::default_pose())
    }
}

impl ViewerConfig {
    #[must_use]
    pub fn from_parts(transform: &TransformValues, camera_pose: Mat4) -> Self {
        Self {
            translation: transform.translation.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale,
            camera_pose: camera_pose.transpose().to_cols_array_2d(),
        }
    }

    #[must_use]
    pub fn transform(&self) -> TransformValues {
        TransformValues {
            translation: Vec3::from_array(self.translation),
            rotation: Vec3::from_array(self.rotation),
            scale: self.scale,
        }
    }

    #[must_use]
    pub fn camera_pose(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.camera_pose).transpose()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
