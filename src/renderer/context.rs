//! wgpu Context
//!
//! The [`GpuContext`] holds the device and queue used for vertex uploads.
//! It is created headless: the viewer renders to offscreen targets and never
//! owns a window surface.

use wgpu::util::DeviceExt;

use crate::errors::{FaceMeshError, Result};
use crate::renderer::settings::ViewerSettings;
use crate::renderer::upload::GpuUploader;

/// Core wgpu handles.
pub struct GpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn new(settings: &ViewerSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| FaceMeshError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        log::info!("GPU context ready: {:?}", adapter.get_info().name);
        Ok(Self { device, queue })
    }

    /// Blocking variant of [`GpuContext::new`].
    pub fn new_headless(settings: &ViewerSettings) -> Result<Self> {
        pollster::block_on(Self::new(settings))
    }
}

impl GpuUploader for GpuContext {
    type Buffer = wgpu::Buffer;

    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<wgpu::Buffer> {
        if contents.is_empty() {
            return Err(FaceMeshError::GpuUpload(format!(
                "refusing to allocate empty vertex buffer '{label}'"
            )));
        }

        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }))
    }

    fn write_vertex_buffer(&mut self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let len = data.len() as u64;
        if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 || len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(FaceMeshError::GpuUpload(format!(
                "unaligned write of {len} bytes at offset {offset}"
            )));
        }
        if offset + len > buffer.size() {
            return Err(FaceMeshError::GpuUpload(format!(
                "write of {len} bytes at offset {offset} exceeds buffer size {}",
                buffer.size()
            )));
        }

        self.queue.write_buffer(buffer, offset, data);
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}
