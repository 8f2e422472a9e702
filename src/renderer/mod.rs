//! GPU-facing side of the viewer.
//!
//! - [`DeviceBufferSync`]: device mirror of a [`GeometryBuffer`](crate::resources::GeometryBuffer)
//! - [`GpuUploader`] / [`GpuContext`]: buffer upload seam and its wgpu implementation
//! - [`Rasterizer`]: external shading seam
//! - [`RenderParams`], [`RenderedFrame`], [`RenderGuard`]: per-render input, output and re-entrancy guard

pub mod context;
pub mod frame;
pub mod guard;
pub mod params;
pub mod rasterizer;
pub mod settings;
pub mod sync;
pub mod upload;

pub use context::GpuContext;
pub use frame::{RenderedFrame, compose_rgba};
pub use guard::{InFlight, RenderGuard};
pub use params::{RenderParams, TransformValues};
pub use rasterizer::{DrawRequest, RasterOutput, Rasterizer};
pub use settings::ViewerSettings;
pub use sync::{DeviceBufferSync, FlushReport, SyncState};
pub use upload::GpuUploader;
