//! Per-render parameters.
//!
//! Everything a render reads from the outside world is passed in here;
//! nothing is fetched from widget state during the call.

use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;

/// User-editable model transform, as shown on the transform controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformValues {
    pub translation: Vec3,
    /// Roll, pitch, yaw in radians.
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for TransformValues {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Draw triangle edges only.
    pub wireframe: bool,
    /// Blend weight against the background, in `[0, 1]`.
    ///
    /// `0.0` keeps a hard coverage mask as alpha.
    pub alpha_weight: f32,
    pub transform: TransformValues,
    /// Image composited behind the mesh. Must match the viewport size.
    pub background: Option<Arc<RgbaImage>>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            wireframe: false,
            alpha_weight: 0.0,
            transform: TransformValues::default(),
            background: None,
        }
    }
}

impl RenderParams {
    #[must_use]
    pub fn with_transform(mut self, transform: TransformValues) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Arc<RgbaImage>, alpha_weight: f32) -> Self {
        self.background = Some(background);
        self.alpha_weight = alpha_weight;
        self
    }

    /// Alpha weight clamped into `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn effective_alpha_weight(&self) -> f32 {
        self.alpha_weight.clamp(0.0, 1.0)
    }
}
