use glam::{Vec2, Vec3, Vec4};

use crate::errors::{FaceMeshError, Result};
use crate::resources::layout::AttributeKind;

/// Optional per-vertex attribute data.
///
/// Positions are not part of this enum: every mesh has them.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Normals(Vec<Vec3>),
    Tangents(Vec<Vec4>),
    TexCoord0(Vec<Vec2>),
    TexCoord1(Vec<Vec2>),
    Colors(Vec<Vec4>),
}

impl AttributeData {
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Normals(_) => AttributeKind::Normal,
            Self::Tangents(_) => AttributeKind::Tangent,
            Self::TexCoord0(_) => AttributeKind::TexCoord0,
            Self::TexCoord1(_) => AttributeKind::TexCoord1,
            Self::Colors(_) => AttributeKind::Color,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        match self {
            Self::Normals(v) => v.len(),
            Self::Tangents(v) | Self::Colors(v) => v.len(),
            Self::TexCoord0(v) | Self::TexCoord1(v) => v.len(),
        }
    }
}

/// Triangle mesh with fixed topology and mutable per-vertex attributes.
///
/// The vertex count is fixed at construction. Every attribute array present
/// has exactly one row per vertex, and every index triple references a valid
/// vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    triangles: Vec<[u32; 3]>,
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    tangents: Option<Vec<Vec4>>,
    texcoord0: Option<Vec<Vec2>>,
    texcoord1: Option<Vec<Vec2>>,
    colors: Option<Vec<Vec4>>,
}

impl Mesh {
    /// Creates a mesh from positions and triangle index triples.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = positions.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(FaceMeshError::InvalidTopology {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self {
            triangles,
            positions,
            normals: None,
            tangents: None,
            texcoord0: None,
            texcoord1: None,
            colors: None,
        })
    }

    pub fn with_attribute(mut self, data: AttributeData) -> Result<Self> {
        self.insert_attribute(data)?;
        Ok(self)
    }

    pub fn with_normals(self, normals: Vec<Vec3>) -> Result<Self> {
        self.with_attribute(AttributeData::Normals(normals))
    }

    pub fn with_tangents(self, tangents: Vec<Vec4>) -> Result<Self> {
        self.with_attribute(AttributeData::Tangents(tangents))
    }

    pub fn with_texcoord0(self, uv: Vec<Vec2>) -> Result<Self> {
        self.with_attribute(AttributeData::TexCoord0(uv))
    }

    pub fn with_texcoord1(self, uv: Vec<Vec2>) -> Result<Self> {
        self.with_attribute(AttributeData::TexCoord1(uv))
    }

    pub fn with_colors(self, colors: Vec<Vec4>) -> Result<Self> {
        self.with_attribute(AttributeData::Colors(colors))
    }

    /// Smooth normals computed from the current positions and stored on the mesh.
    #[must_use]
    pub fn with_computed_normals(mut self) -> Self {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        compute_vertex_normals(&self.positions, &self.triangles, &mut normals);
        self.normals = Some(normals);
        self
    }

    /// Inserts or replaces an optional attribute after validating its row count.
    pub(crate) fn insert_attribute(&mut self, data: AttributeData) -> Result<()> {
        let expected = self.vertex_count();
        if data.rows() != expected {
            return Err(FaceMeshError::ShapeMismatch {
                context: data.kind().name(),
                expected,
                actual: data.rows(),
            });
        }

        match data {
            AttributeData::Normals(v) => self.normals = Some(v),
            AttributeData::Tangents(v) => self.tangents = Some(v),
            AttributeData::TexCoord0(v) => self.texcoord0 = Some(v),
            AttributeData::TexCoord1(v) => self.texcoord1 = Some(v),
            AttributeData::Colors(v) => self.colors = Some(v),
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub(crate) fn normals_mut(&mut self) -> Option<&mut [Vec3]> {
        self.normals.as_deref_mut()
    }

    /// Attributes present on this mesh, positions included.
    #[must_use]
    pub fn present_attributes(&self) -> Vec<AttributeKind> {
        AttributeKind::ORDER
            .into_iter()
            .filter(|&kind| self.has_attribute(kind))
            .collect()
    }

    #[must_use]
    pub fn has_attribute(&self, kind: AttributeKind) -> bool {
        self.attribute_floats(kind).is_some()
    }

    /// Flat `f32` view of one attribute column (row-major, `components` per row).
    #[must_use]
    pub fn attribute_floats(&self, kind: AttributeKind) -> Option<&[f32]> {
        match kind {
            AttributeKind::Position => Some(bytemuck::cast_slice(&self.positions)),
            AttributeKind::Normal => self.normals.as_deref().map(bytemuck::cast_slice),
            AttributeKind::Tangent => self.tangents.as_deref().map(bytemuck::cast_slice),
            AttributeKind::TexCoord0 => self.texcoord0.as_deref().map(bytemuck::cast_slice),
            AttributeKind::TexCoord1 => self.texcoord1.as_deref().map(bytemuck::cast_slice),
            AttributeKind::Color => self.colors.as_deref().map(bytemuck::cast_slice),
        }
    }
}

/// Area-weighted smooth vertex normals.
///
/// Each face normal (cross product, length = 2x area) is accumulated on its
/// three vertices, then every sum is normalized. Vertices not referenced by
/// any triangle get a zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]], out: &mut [Vec3]) {
    out.fill(Vec3::ZERO);
    let count = positions.len().min(out.len());

    for &[i0, i1, i2] in triangles {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        if i0 >= count || i1 >= count || i2 >= count {
            continue;
        }

        let v0 = positions[i0];
        let face_normal = (positions[i1] - v0).cross(positions[i2] - v0);

        out[i0] += face_normal;
        out[i1] += face_normal;
        out[i2] += face_normal;
    }

    for n in out.iter_mut() {
        *n = n.normalize_or_zero();
    }
}
