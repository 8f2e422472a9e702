//! Viewer Settings
//!
//! Startup configuration for a [`FaceViewer`](crate::viewer::FaceViewer) and
//! its GPU context. Consumed once at construction.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use facemesh::renderer::ViewerSettings;
//!
//! // Portrait 360x640 viewport, discrete GPU preferred
//! let settings = ViewerSettings::default();
//!
//! // Square viewport on an integrated GPU
//! let settings = ViewerSettings {
//!     width: 512,
//!     height: 512,
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     ..Default::default()
//! };
//! ```

/// Global configuration for viewer initialization.
///
/// # Fields
///
/// | Field              | Description                              | Default              |
/// |--------------------|------------------------------------------|----------------------|
/// | `width`            | Viewport width in pixels                 | `360`                |
/// | `height`           | Viewport height in pixels                | `640`                |
/// | `power_preference` | GPU adapter selection strategy           | `HighPerformance`    |
/// | `clear_color`      | Framebuffer clear color                  | (0.3, 0.3, 0.4, 0.2) |
/// | `required_features`| Required wgpu features                   | Empty                |
/// | `required_limits`  | Required wgpu limits                     | Default              |
/// | `buffer_label`     | Debug label of the vertex buffer         | `"Face Vertices"`    |
/// | `max_undo`         | Depth of the vertex edit history         | `100`                |
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    // === Viewport ===
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,

    // === GPU / Backend Configuration ===
    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Background clear color, used where no background image is given.
    pub clear_color: wgpu::Color,

    /// Required wgpu features that must be supported by the adapter.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,

    // === Geometry ===
    /// Debug label attached to the device vertex buffer.
    pub buffer_label: String,

    /// Maximum number of vertex edits kept for undo.
    pub max_undo: usize,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            width: 360,
            height: 640,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.3,
                g: 0.3,
                b: 0.4,
                a: 0.2,
            },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            buffer_label: "Face Vertices".to_string(),
            max_undo: crate::scene::history::DEFAULT_MAX_UNDO,
        }
    }
}

impl ViewerSettings {
    /// Width over height.
    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Clear color as 8-bit RGBA.
    #[must_use]
    pub fn clear_rgba8(&self) -> [u8; 4] {
        let c = self.clear_color;
        [c.r, c.g, c.b, c.a].map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}
