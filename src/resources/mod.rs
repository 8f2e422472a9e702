//! CPU-side mesh resources.
//!
//! Nothing in this module touches the GPU:
//! - [`Mesh`]: fixed topology plus per-vertex attribute arrays
//! - [`VertexLayout`]: interleaving of those attributes
//! - [`GeometryBuffer`]: mesh plus cached interleaved buffer with dirty tracking
//! - [`BlendshapeRig`]: neutral pose and named per-vertex deltas

pub mod blendshape;
pub mod geometry;
pub mod layout;
pub mod mesh;
pub mod version_tracker;

pub use blendshape::{BlendshapeRig, ResolvedCoefficients};
pub use geometry::{GeometryBuffer, LayoutState, VertexEdit};
pub use layout::{AttributeKind, AttributeSlot, VertexLayout};
pub use mesh::{AttributeData, Mesh, compute_vertex_normals};
pub use version_tracker::{ChangeTracker, ColumnVersions, DirtyColumns};
