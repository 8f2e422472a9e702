//! Device upload seam.
//!
//! [`GpuUploader`] is the only way geometry reaches the device. The wgpu
//! implementation lives on [`GpuContext`](crate::renderer::GpuContext); tests
//! plug in a recording implementation.

use crate::errors::Result;

/// Creates, writes and releases vertex buffers on a device.
pub trait GpuUploader {
    /// Device-side buffer handle.
    type Buffer;

    /// Allocates a vertex buffer initialized with `contents`.
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<Self::Buffer>;

    /// Overwrites `data.len()` bytes of `buffer` starting at `offset`.
    fn write_vertex_buffer(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]) -> Result<()>;

    /// Releases the buffer. The handle must not be used afterwards.
    fn destroy_vertex_buffer(&mut self, buffer: Self::Buffer);
}
