//! Device Buffer Sync
//!
//! Mirrors a [`GeometryBuffer`] into one device vertex buffer.
//!
//! ```text
//! Uninitialized ──flush──▶ Allocated ──mutation──▶ Dirty ──flush──▶ Clean
//!                                                    ▲                │
//!                                                    └───mutation─────┘
//! any ──destroy──▶ Destroyed (terminal)
//! ```
//!
//! The first flush allocates a buffer sized to the frozen layout and uploads
//! everything. Later flushes write only the byte range spanned by the
//! position (and normal) columns that changed since the last upload.

use std::sync::Arc;

use crate::errors::{FaceMeshError, Result};
use crate::renderer::upload::GpuUploader;
use crate::resources::geometry::GeometryBuffer;
use crate::resources::layout::VertexLayout;
use crate::resources::version_tracker::ColumnVersions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Allocated,
    Dirty,
    Clean,
    Destroyed,
}

impl SyncState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Allocated => "allocated",
            Self::Dirty => "dirty",
            Self::Clean => "clean",
            Self::Destroyed => "destroyed",
        }
    }
}

/// What a flush moved to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReport {
    /// Buffer allocated and filled.
    Allocated { bytes: u64 },
    /// Partial write of the dirty column range.
    Partial { offset: u64, bytes: u64 },
    /// Nothing changed since the last upload.
    UpToDate,
}

#[derive(Debug)]
pub struct DeviceBufferSync<B> {
    state: SyncState,
    handle: Option<B>,
    layout: Option<Arc<VertexLayout>>,
    /// Column versions present on the device.
    uploaded: ColumnVersions,
    label: String,
}

impl<B> DeviceBufferSync<B> {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: SyncState::Uninitialized,
            handle: None,
            layout: None,
            uploaded: ColumnVersions::default(),
            label: label.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The device buffer, once allocated.
    #[must_use]
    pub fn buffer(&self) -> Option<&B> {
        self.handle.as_ref()
    }

    /// Layout the device buffer was allocated for.
    #[must_use]
    pub fn layout(&self) -> Option<&Arc<VertexLayout>> {
        self.layout.as_ref()
    }

    /// Records that the mutable columns changed.
    ///
    /// Has no effect before the first flush: that one uploads everything anyway.
    pub fn mark_dirty(&mut self) -> Result<()> {
        match self.state {
            SyncState::Destroyed => Err(FaceMeshError::UseAfterDestroy("mark_dirty on destroyed vertex buffer")),
            SyncState::Uninitialized => Ok(()),
            SyncState::Allocated | SyncState::Clean | SyncState::Dirty => {
                self.state = SyncState::Dirty;
                Ok(())
            }
        }
    }

    /// Brings the device buffer up to date with `geometry`.
    ///
    /// On upload failure the state stays (or becomes) `Dirty`, so the next
    /// flush retries the same range.
    pub fn flush<U>(&mut self, geometry: &mut GeometryBuffer, uploader: &mut U) -> Result<FlushReport>
    where
        U: GpuUploader<Buffer = B>,
    {
        match self.state {
            SyncState::Destroyed => Err(FaceMeshError::UseAfterDestroy("flush on destroyed vertex buffer")),
            SyncState::Uninitialized => self.allocate(geometry, uploader),
            SyncState::Allocated | SyncState::Clean | SyncState::Dirty => self.write_dirty(geometry, uploader),
        }
    }

    fn allocate<U>(&mut self, geometry: &mut GeometryBuffer, uploader: &mut U) -> Result<FlushReport>
    where
        U: GpuUploader<Buffer = B>,
    {
        let bytes = geometry.flattened_bytes();
        let size = bytes.len() as u64;
        let handle = uploader.create_vertex_buffer(&self.label, bytes)?;

        self.handle = Some(handle);
        self.layout = geometry.layout().cloned();
        self.uploaded = geometry.column_versions();
        self.state = SyncState::Allocated;

        log::debug!("Allocated vertex buffer '{}' ({} bytes)", self.label, size);
        Ok(FlushReport::Allocated { bytes: size })
    }

    fn write_dirty<U>(&mut self, geometry: &mut GeometryBuffer, uploader: &mut U) -> Result<FlushReport>
    where
        U: GpuUploader<Buffer = B>,
    {
        let (Some(handle), Some(layout)) = (&self.handle, &self.layout) else {
            return Err(FaceMeshError::GpuUpload(format!(
                "vertex buffer '{}' has no device handle",
                self.label
            )));
        };

        let current = geometry.column_versions();
        let dirty = self.uploaded.changed_since(&current);
        let Some(range) = layout.dirty_byte_range(dirty) else {
            self.state = SyncState::Clean;
            return Ok(FlushReport::UpToDate);
        };

        let bytes = geometry.flattened_bytes();
        let Some(slice) = bytes.get(range.start as usize..range.end as usize) else {
            self.state = SyncState::Dirty;
            return Err(FaceMeshError::GpuUpload(format!(
                "dirty range {range:?} outside flattened buffer of {} bytes",
                bytes.len()
            )));
        };

        if let Err(err) = uploader.write_vertex_buffer(handle, range.start, slice) {
            self.state = SyncState::Dirty;
            return Err(err);
        }

        self.uploaded = current;
        self.state = SyncState::Clean;
        Ok(FlushReport::Partial {
            offset: range.start,
            bytes: range.end - range.start,
        })
    }

    /// Releases the device buffer. Every later operation fails.
    pub fn destroy<U>(&mut self, uploader: &mut U)
    where
        U: GpuUploader<Buffer = B>,
    {
        if let Some(handle) = self.handle.take() {
            uploader.destroy_vertex_buffer(handle);
            log::debug!("Destroyed vertex buffer '{}'", self.label);
        }
        self.layout = None;
        self.state = SyncState::Destroyed;
    }
}
