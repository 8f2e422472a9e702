use std::sync::Arc;

use glam::Vec3;
use uuid::Uuid;

use crate::errors::{FaceMeshError, Result};
use crate::resources::layout::{AttributeKind, VertexLayout};
use crate::resources::mesh::{AttributeData, Mesh, compute_vertex_normals};
use crate::resources::version_tracker::{ChangeTracker, ColumnVersions, DirtyColumns};

/// State of the cached interleaved layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// Nothing flattened yet; attributes may still be added.
    Absent,
    /// The first interleave is in progress.
    Building,
    /// Layout is frozen; only position/normal columns are rewritten.
    Ready,
}

#[derive(Debug)]
enum LayoutCache {
    Absent,
    Building,
    Ready(Arc<VertexLayout>),
}

/// One vertex edit and the value it replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexEdit {
    pub index: u32,
    pub previous: Vec3,
}

/// CPU-side geometry of one mesh plus its cached interleaved buffer.
///
/// Owned by a single viewer; never shared across threads.
///
/// The first call to [`GeometryBuffer::flattened`] builds the layout and
/// interleaves every attribute. Later calls only rewrite the position (and
/// normal) columns that changed since, in place, without reallocating.
#[derive(Debug)]
pub struct GeometryBuffer {
    pub uuid: Uuid,
    mesh: Mesh,

    layout: LayoutCache,
    interleaved: Vec<f32>,

    positions_tracker: ChangeTracker,
    normals_tracker: ChangeTracker,
    /// Column versions already written into `interleaved`.
    flattened: ColumnVersions,

    /// Scratch for normal recomputation
    normal_scratch: Vec<Vec3>,
}

impl GeometryBuffer {
    #[must_use]
    pub fn new(mesh: Mesh) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            mesh,
            layout: LayoutCache::Absent,
            interleaved: Vec::new(),
            positions_tracker: ChangeTracker::new(),
            normals_tracker: ChangeTracker::new(),
            flattened: ColumnVersions::default(),
            normal_scratch: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        self.mesh.positions()
    }

    #[inline]
    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.mesh.normals()
    }

    #[must_use]
    pub fn layout_state(&self) -> LayoutState {
        match self.layout {
            LayoutCache::Absent => LayoutState::Absent,
            LayoutCache::Building => LayoutState::Building,
            LayoutCache::Ready(_) => LayoutState::Ready,
        }
    }

    /// The frozen layout, once the buffer has been flattened.
    #[must_use]
    pub fn layout(&self) -> Option<&Arc<VertexLayout>> {
        match &self.layout {
            LayoutCache::Ready(layout) => Some(layout),
            _ => None,
        }
    }

    /// Current versions of the mutable columns.
    #[must_use]
    pub fn column_versions(&self) -> ColumnVersions {
        ColumnVersions {
            positions: self.positions_tracker.version(),
            normals: self.normals_tracker.version(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replaces every vertex position.
    ///
    /// When `recompute_normals` is set and the mesh carries normals, they are
    /// recomputed from the new positions. On a row-count mismatch nothing is
    /// modified.
    pub fn replace_positions(&mut self, new_positions: &[Vec3], recompute_normals: bool) -> Result<()> {
        self.write_positions(new_positions)?;
        if recompute_normals {
            self.recompute_normals();
        }
        Ok(())
    }

    /// Replaces positions and leaves normals stale.
    ///
    /// Used for scrubbing, or when the caller supplies normals through
    /// [`GeometryBuffer::set_normals`].
    pub fn replace_positions_no_topology_check(&mut self, new_positions: &[Vec3]) -> Result<()> {
        self.write_positions(new_positions)
    }

    /// Overwrites the normal column.
    ///
    /// Adds the attribute if it is missing and the layout is not yet frozen.
    pub fn set_normals(&mut self, normals: &[Vec3]) -> Result<()> {
        let expected = self.vertex_count();
        if normals.len() != expected {
            return Err(FaceMeshError::ShapeMismatch {
                context: "normals",
                expected,
                actual: normals.len(),
            });
        }

        match self.mesh.normals_mut() {
            Some(dst) => dst.copy_from_slice(normals),
            None => self.add_attribute(AttributeData::Normals(normals.to_vec()))?,
        }
        self.normals_tracker.changed();
        Ok(())
    }

    /// Adds an optional attribute. Fails once the layout has been built.
    pub fn add_attribute(&mut self, data: AttributeData) -> Result<()> {
        if !matches!(self.layout, LayoutCache::Absent) {
            return Err(FaceMeshError::LayoutFrozen(data.kind().name()));
        }
        self.mesh.insert_attribute(data)
    }

    /// Moves individual vertices and returns the edits needed to revert them.
    ///
    /// All indices are checked before anything is written.
    pub fn edit_vertices(&mut self, edits: &[(u32, Vec3)]) -> Result<Vec<VertexEdit>> {
        let vertex_count = self.vertex_count();
        if let Some(&(index, _)) = edits.iter().find(|(i, _)| *i as usize >= vertex_count) {
            return Err(FaceMeshError::VertexIndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let positions = self.mesh.positions_mut();
        let inverse = edits
            .iter()
            .map(|&(index, value)| {
                let slot = &mut positions[index as usize];
                let previous = *slot;
                *slot = value;
                VertexEdit { index, previous }
            })
            .collect();

        self.positions_tracker.changed();
        self.recompute_normals();
        Ok(inverse)
    }

    /// Restores the values captured by [`GeometryBuffer::edit_vertices`].
    ///
    /// Edits are applied in reverse so repeated indices end at their oldest value.
    pub fn revert_edits(&mut self, edits: &[VertexEdit]) -> Result<()> {
        let reverted: Vec<(u32, Vec3)> = edits.iter().rev().map(|e| (e.index, e.previous)).collect();
        self.edit_vertices(&reverted).map(|_| ())
    }

    fn write_positions(&mut self, new_positions: &[Vec3]) -> Result<()> {
        let expected = self.vertex_count();
        if new_positions.len() != expected {
            return Err(FaceMeshError::ShapeMismatch {
                context: "positions",
                expected,
                actual: new_positions.len(),
            });
        }

        self.mesh.positions_mut().copy_from_slice(new_positions);
        self.positions_tracker.changed();
        Ok(())
    }

    fn recompute_normals(&mut self) {
        if !self.mesh.has_attribute(AttributeKind::Normal) {
            log::debug!("Mesh has no normal attribute, skipping normal recomputation");
            return;
        }

        self.normal_scratch.resize(self.vertex_count(), Vec3::ZERO);
        compute_vertex_normals(self.mesh.positions(), self.mesh.triangles(), &mut self.normal_scratch);

        if let Some(dst) = self.mesh.normals_mut() {
            dst.copy_from_slice(&self.normal_scratch);
            self.normals_tracker.changed();
        }
    }

    // ========================================================================
    // Flattened buffer
    // ========================================================================

    /// Interleaved vertex data, ready for upload.
    ///
    /// Builds and caches the layout on first use. Afterwards only the
    /// columns that changed since the previous call are rewritten.
    pub fn flattened(&mut self) -> &[f32] {
        if matches!(self.layout, LayoutCache::Ready(_)) {
            self.rewrite_dirty_columns();
        } else {
            self.build_interleaved();
        }
        &self.interleaved
    }

    /// Byte view of [`GeometryBuffer::flattened`].
    pub fn flattened_bytes(&mut self) -> &[u8] {
        self.flattened();
        bytemuck::cast_slice(&self.interleaved)
    }

    /// Reads one vertex's attribute back out of the interleaved buffer.
    #[must_use]
    pub fn read_flattened(&self, kind: AttributeKind, vertex: usize) -> Option<&[f32]> {
        let layout = self.layout()?;
        let slot = layout.slot(kind)?;
        let start = vertex * layout.floats_per_vertex() + slot.float_offset();
        self.interleaved.get(start..start + kind.components())
    }

    fn build_interleaved(&mut self) {
        self.layout = LayoutCache::Building;

        let layout = VertexLayout::new(&self.mesh.present_attributes(), self.vertex_count());
        let mut data = vec![0.0f32; layout.floats_per_vertex() * layout.vertex_count()];
        for slot in layout.slots() {
            if let Some(column) = self.mesh.attribute_floats(slot.kind) {
                write_column(&mut data, &layout, slot.kind, column);
            }
        }

        log::debug!(
            "Built interleaved layout for {}: stride {} bytes, {} vertices",
            self.uuid,
            layout.stride(),
            layout.vertex_count()
        );

        self.interleaved = data;
        self.flattened = self.column_versions();
        self.layout = LayoutCache::Ready(Arc::new(layout));
    }

    fn rewrite_dirty_columns(&mut self) {
        let LayoutCache::Ready(layout) = &self.layout else {
            return;
        };

        let current = self.column_versions();
        let dirty: DirtyColumns = self.flattened.changed_since(&current);

        if dirty.positions {
            if let Some(column) = self.mesh.attribute_floats(AttributeKind::Position) {
                write_column(&mut self.interleaved, layout, AttributeKind::Position, column);
            }
        }
        if dirty.normals {
            if let Some(column) = self.mesh.attribute_floats(AttributeKind::Normal) {
                write_column(&mut self.interleaved, layout, AttributeKind::Normal, column);
            }
        }

        self.flattened = current;
    }
}

/// Writes one attribute column into its strided slot. O(N).
fn write_column(dst: &mut [f32], layout: &VertexLayout, kind: AttributeKind, column: &[f32]) {
    let Some(slot) = layout.slot(kind) else {
        return;
    };
    let components = kind.components();
    let offset = slot.float_offset();

    for (row, values) in dst
        .chunks_exact_mut(layout.floats_per_vertex())
        .zip(column.chunks_exact(components))
    {
        row[offset..offset + components].copy_from_slice(values);
    }
}
