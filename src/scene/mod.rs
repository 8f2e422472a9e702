//! Placement of the mesh in view.
//!
//! - [`TransformStack`]: user-editable model transform
//! - [`OrthographicCamera`]: view and projection from an external pose
//! - [`VertexEditHistory`]: undo stack for ad hoc vertex edits

pub mod camera;
pub mod history;
pub mod transform;

pub use camera::OrthographicCamera;
pub use history::{DEFAULT_MAX_UNDO, VertexEditHistory};
pub use transform::{TransformStack, quat_from_roll_pitch_yaw};
