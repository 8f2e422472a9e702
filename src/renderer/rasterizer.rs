//! Rasterizer seam.
//!
//! Shading and rasterization happen outside this crate. The viewer hands a
//! [`DrawRequest`] to whatever [`Rasterizer`] it was built with and gets a
//! colour buffer plus a coverage mask back.

use glam::Mat4;
use image::RgbaImage;

use crate::errors::Result;
use crate::renderer::params::RenderParams;
use crate::resources::layout::VertexLayout;

/// Everything needed to draw the mesh once.
pub struct DrawRequest<'a, B> {
    /// Device vertex buffer, already flushed.
    pub vertex_buffer: &'a B,
    pub layout: &'a VertexLayout,
    pub triangles: &'a [[u32; 3]],
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub width: u32,
    pub height: u32,
    pub params: &'a RenderParams,
}

impl<B> DrawRequest<'_, B> {
    /// `projection * view * model`.
    #[must_use]
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

/// Raw rasterizer output, before compositing.
#[derive(Debug, Clone)]
pub struct RasterOutput {
    pub color: RgbaImage,
    /// One byte per pixel; non-zero where the depth test passed.
    pub coverage: Vec<u8>,
}

pub trait Rasterizer<B> {
    fn rasterize(&mut self, request: &DrawRequest<'_, B>) -> Result<RasterOutput>;
}
