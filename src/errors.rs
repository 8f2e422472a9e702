//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`FaceMeshError`] covers all failure modes including:
//! - Geometry shape and layout violations
//! - Blendshape rig lookups and coefficient vectors
//! - GPU buffer upload failures
//! - Animation sequence loading, playback and encoding
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, FaceMeshError>`.
//!
//! Geometry and rig errors are local: the caller logs them and keeps the
//! previous state. Only a malformed animation file aborts a playback, and
//! nothing here aborts the process.

use thiserror::Error;

/// The main error type for the face-mesh pipeline.
#[derive(Error, Debug)]
pub enum FaceMeshError {
    // ========================================================================
    // Geometry Errors
    // ========================================================================
    /// A per-vertex array does not have one row per mesh vertex.
    #[error("Shape mismatch for {context}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        /// What was being written (e.g. "positions", "normals")
        context: &'static str,
        /// Row count of the mesh
        expected: usize,
        /// Row count that was supplied
        actual: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("Invalid topology: triangle {triangle} references vertex {index} (vertex count {vertex_count})")]
    InvalidTopology {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A vertex edit addresses a vertex that does not exist.
    #[error("Vertex index {index} out of range (vertex count {vertex_count})")]
    VertexIndexOutOfRange { index: u32, vertex_count: usize },

    /// An attribute was added after the interleaved layout was built.
    #[error("Vertex layout is frozen; cannot add attribute '{0}' after the first upload")]
    LayoutFrozen(&'static str),

    // ========================================================================
    // Blendshape Rig Errors
    // ========================================================================
    /// The coefficient vector does not have one entry per blendshape.
    #[error("Coefficient length mismatch: rig has {expected} blendshapes, got {actual} coefficients")]
    CoefficientLengthMismatch { expected: usize, actual: usize },

    /// The named blendshape is not part of the rig.
    #[error("Unknown blendshape: {0}")]
    UnknownBlendshape(String),

    /// Two targets in one rig share a name.
    #[error("Duplicate blendshape name: {0}")]
    DuplicateBlendshape(String),

    // ========================================================================
    // GPU Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Writing vertex data to the device failed; the frame is dropped.
    #[error("GPU upload failed: {0}")]
    GpuUpload(String),

    /// A device buffer was used after it was destroyed.
    #[error("Use after destroy: {0}")]
    UseAfterDestroy(&'static str),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A vertex snapshot in a sequence does not match the target mesh.
    #[error("Frame {frame} has {actual} vertices, target mesh has {expected}")]
    FrameShapeMismatch {
        frame: usize,
        expected: usize,
        actual: usize,
    },

    /// The sequence metadata has no usable frame rate.
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),

    /// The player was driven through a transition its state does not allow.
    #[error("Invalid playback state: cannot {requested} while {current}")]
    InvalidPlaybackState {
        current: &'static str,
        requested: &'static str,
    },

    /// Playback was cancelled between frames; partial output was discarded.
    #[error("Playback aborted after {frames_rendered} frames")]
    PlaybackAborted { frames_rendered: usize },

    /// The external encoder process exited unsuccessfully.
    #[error("Video encoder failed: {0}")]
    EncoderFailed(String),

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(String),
}

impl FaceMeshError {
    /// Whether the viewer can continue with its current state after this error.
    ///
    /// Unknown blendshape names are skipped and failed uploads drop one frame.
    /// Shape mismatches abort the offending operation only.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownBlendshape(_)
                | Self::GpuUpload(_)
                | Self::ShapeMismatch { .. }
                | Self::CoefficientLengthMismatch { .. }
        )
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for FaceMeshError {
    fn from(err: image::ImageError) -> Self {
        FaceMeshError::Image(err.to_string())
    }
}

/// Alias for `Result<T, FaceMeshError>`.
pub type Result<T> = std::result::Result<T, FaceMeshError>;
