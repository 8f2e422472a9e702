//! Shared test infrastructure.
//!
//! GPU-free stand-ins for the device seams:
//! - [`RecordingUploader`]: keeps buffers in memory and logs every call
//! - [`PointRasterizer`]: splats each vertex of the uploaded buffer as one pixel
//!
//! plus [`init_logging`], which also captures records for [`take_logs`].

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;

use glam::{Vec3, Vec4};
use image::{Rgba, RgbaImage};

use facemesh::errors::{FaceMeshError, Result};
use facemesh::renderer::{DrawRequest, GpuUploader, RasterOutput, Rasterizer};
use facemesh::resources::{AttributeKind, Mesh};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

// ============================================================================
// Logging
// ============================================================================

/// One captured log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub message: String,
}

thread_local! {
    // Each test runs on its own thread, so records never mix between tests.
    static CAPTURED: RefCell<Vec<LogEntry>> = const { RefCell::new(Vec::new()) };
}

/// Forwards to `env_logger` and keeps every record on the logging thread.
struct LogCapture {
    inner: env_logger::Logger,
}

impl log::Log for LogCapture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        CAPTURED.with(|buf| {
            buf.borrow_mut().push(LogEntry {
                level: record.level(),
                message: format!("{}", record.args()),
            });
        });
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<LogCapture> = OnceLock::new();

/// Installs the capturing logger. Safe to call repeatedly.
pub fn init_logging() {
    let logger = LOGGER.get_or_init(|| LogCapture {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

/// Drains the records logged on the current thread.
pub fn take_logs() -> Vec<LogEntry> {
    CAPTURED.with(|buf| std::mem::take(&mut *buf.borrow_mut()))
}

// ============================================================================
// Meshes
// ============================================================================

/// Unit quad in the XY plane, two triangles, with normals.
pub fn quad_mesh() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
    .with_computed_normals()
}

/// Strip of `n` vertices along X, consecutive triples forming triangles.
pub fn strip_mesh(n: usize) -> Mesh {
    let positions = (0..n).map(|i| Vec3::new(i as f32 * 0.1, (i % 2) as f32 * 0.1, 0.0)).collect();
    let triangles = (0..n.saturating_sub(2) as u32).map(|i| [i, i + 1, i + 2]).collect();
    Mesh::new(positions, triangles).unwrap()
}

// ============================================================================
// Uploader
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCall {
    Create { id: usize, label: String, bytes: usize },
    Write { id: usize, offset: u64, bytes: usize },
    Destroy { id: usize },
}

/// In-memory buffer handle. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    pub id: usize,
    pub data: Rc<RefCell<Vec<u8>>>,
}

impl MemoryBuffer {
    pub fn floats(&self) -> Vec<f32> {
        self.data
            .borrow()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RecordingUploader {
    pub calls: Vec<UploadCall>,
    /// Number of upcoming writes that fail. Shared so tests can arm it
    /// after handing the uploader to a viewer.
    pub fail_writes: Rc<Cell<usize>>,
    next_id: usize,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, UploadCall::Create { .. })).count()
    }

    pub fn writes(&self) -> Vec<(u64, usize)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                UploadCall::Write { offset, bytes, .. } => Some((*offset, *bytes)),
                _ => None,
            })
            .collect()
    }

    pub fn destroys(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, UploadCall::Destroy { .. })).count()
    }
}

impl GpuUploader for RecordingUploader {
    type Buffer = MemoryBuffer;

    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<MemoryBuffer> {
        let id = self.next_id;
        self.next_id += 1;
        self.calls.push(UploadCall::Create {
            id,
            label: label.to_string(),
            bytes: contents.len(),
        });
        Ok(MemoryBuffer {
            id,
            data: Rc::new(RefCell::new(contents.to_vec())),
        })
    }

    fn write_vertex_buffer(&mut self, buffer: &MemoryBuffer, offset: u64, data: &[u8]) -> Result<()> {
        if self.fail_writes.get() > 0 {
            self.fail_writes.set(self.fail_writes.get() - 1);
            return Err(FaceMeshError::GpuUpload("context not current".to_string()));
        }
        let start = offset as usize;
        let mut storage = buffer.data.borrow_mut();
        if start + data.len() > storage.len() {
            return Err(FaceMeshError::GpuUpload("write out of bounds".to_string()));
        }
        storage[start..start + data.len()].copy_from_slice(data);
        self.calls.push(UploadCall::Write {
            id: buffer.id,
            offset,
            bytes: data.len(),
        });
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: MemoryBuffer) {
        self.calls.push(UploadCall::Destroy { id: buffer.id });
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Draws every vertex read back from the device buffer as one opaque pixel.
#[derive(Debug)]
pub struct PointRasterizer {
    pub color: [u8; 4],
    pub calls: usize,
    /// Positions read from the buffer on the last call.
    pub last_positions: Vec<Vec3>,
}

impl Default for PointRasterizer {
    fn default() -> Self {
        Self {
            color: [200, 180, 160, 255],
            calls: 0,
            last_positions: Vec::new(),
        }
    }
}

impl Rasterizer<MemoryBuffer> for PointRasterizer {
    fn rasterize(&mut self, request: &DrawRequest<'_, MemoryBuffer>) -> Result<RasterOutput> {
        self.calls += 1;

        let floats = request.vertex_buffer.floats();
        let stride = request.layout.floats_per_vertex();
        let offset = request
            .layout
            .slot(AttributeKind::Position)
            .map_or(0, |slot| slot.float_offset());
        self.last_positions = floats
            .chunks_exact(stride)
            .map(|row| Vec3::new(row[offset], row[offset + 1], row[offset + 2]))
            .collect();

        let (width, height) = (request.width, request.height);
        let mut color = RgbaImage::new(width, height);
        let mut coverage = vec![0u8; (width * height) as usize];
        let mvp = request.model_view_projection();

        for p in &self.last_positions {
            let clip = mvp * Vec4::new(p.x, p.y, p.z, 1.0);
            if clip.w.abs() < f32::EPSILON {
                continue;
            }
            let ndc = clip / clip.w;
            if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) {
                continue;
            }
            let x = (((ndc.x + 1.0) * 0.5 * width as f32) as u32).min(width - 1);
            let y = (((1.0 - ndc.y) * 0.5 * height as f32) as u32).min(height - 1);
            color.put_pixel(x, y, Rgba(self.color));
            coverage[(y * width + x) as usize] = 255;
        }

        Ok(RasterOutput { color, coverage })
    }
}
