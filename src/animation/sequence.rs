//! Recorded animation sequences.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "metadata": { "fps": 30, "audio": "speech.wav" },
//!   "data": [
//!     { "vertex": [[0.0, 0.1, 0.2], ...] },
//!     { "blendshapes": { "jawOpen": 0.4, "eyeBlinkLeft": 1.0 } },
//!     { "vertex": [...], "blendshapes": { ... } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{FaceMeshError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationMetadata {
    pub fps: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
}

impl Default for AnimationMetadata {
    fn default() -> Self {
        Self { fps: 30.0, audio: None }
    }
}

/// One recorded frame: a vertex snapshot, named coefficients, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex: Option<Vec<[f32; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blendshapes: Option<BTreeMap<String, f32>>,
}

impl AnimationFrame {
    #[must_use]
    pub fn from_vertices(vertices: &[Vec3]) -> Self {
        Self {
            vertex: Some(vertices.iter().map(|v| v.to_array()).collect()),
            blendshapes: None,
        }
    }

    #[must_use]
    pub fn from_coefficients<'a>(named: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self {
            vertex: None,
            blendshapes: Some(named.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
        }
    }

    /// The vertex snapshot as positions.
    #[must_use]
    pub fn positions(&self) -> Option<&[Vec3]> {
        self.vertex.as_deref().map(bytemuck::cast_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSequence {
    pub metadata: AnimationMetadata,
    pub data: Vec<AnimationFrame>,
}

impl AnimationSequence {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks every vertex snapshot against the target's vertex count.
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        if !(self.metadata.fps.is_finite() && self.metadata.fps > 0.0) {
            return Err(FaceMeshError::InvalidFrameRate(self.metadata.fps));
        }

        for (frame, record) in self.data.iter().enumerate() {
            if let Some(vertex) = &record.vertex
                && vertex.len() != vertex_count
            {
                return Err(FaceMeshError::FrameShapeMismatch {
                    frame,
                    expected: vertex_count,
                    actual: vertex.len(),
                });
            }
        }
        Ok(())
    }
}
