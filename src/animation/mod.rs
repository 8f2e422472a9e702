//! Recorded animation playback and video export.
//!
//! - [`AnimationSequence`]: persisted frames plus metadata
//! - [`AnimationPlayer`]: in-order, sample-and-hold playback with capture
//! - [`FrameRecorder`]: numbered PNG output
//! - [`VideoEncoder`] / [`FfmpegEncoder`]: out-of-process encoding

pub mod cancel;
pub mod capture;
pub mod encoder;
pub mod player;
pub mod sequence;

pub use cancel::CancelToken;
pub use capture::FrameRecorder;
pub use encoder::{EncodeJob, FfmpegEncoder, VideoEncoder};
pub use player::{AnimationPlayer, PlaybackReport, PlaybackTarget, PlayerState};
pub use sequence::{AnimationFrame, AnimationMetadata, AnimationSequence};
