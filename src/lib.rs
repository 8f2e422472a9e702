#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod config;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod viewer;

pub use animation::{AnimationPlayer, AnimationSequence, CancelToken, FfmpegEncoder, FrameRecorder, PlaybackTarget};
pub use config::ViewerConfig;
pub use errors::{FaceMeshError, Result};
pub use renderer::{DeviceBufferSync, GpuContext, GpuUploader, Rasterizer, RenderParams, RenderedFrame, ViewerSettings};
pub use resources::{BlendshapeRig, GeometryBuffer, Mesh, VertexLayout};
pub use scene::{OrthographicCamera, TransformStack};
pub use viewer::{FaceViewer, RenderOutcome, ViewerLifecycle};
