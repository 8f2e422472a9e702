//! Interleaved Vertex Layout
//!
//! Describes how the per-vertex attributes of a mesh are packed side by side
//! in a single `f32` buffer. Attribute order is fixed:
//! position, normal, tangent, texcoord0, texcoord1, color. Only attributes
//! present on the mesh take up space in a vertex.
//!
//! The layout is computed once per mesh and shared through an `Arc`, so
//! identity comparisons (`Arc::ptr_eq`) tell whether a cached layout is
//! still the one a GPU buffer was allocated for.

use std::fmt::Write as _;
use std::ops::Range;

use wgpu::VertexFormat;

use crate::resources::version_tracker::DirtyColumns;

const F32_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Semantic meaning of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    TexCoord1,
    Color,
}

impl AttributeKind {
    /// Interleaving order.
    pub const ORDER: [AttributeKind; 6] = [
        AttributeKind::Position,
        AttributeKind::Normal,
        AttributeKind::Tangent,
        AttributeKind::TexCoord0,
        AttributeKind::TexCoord1,
        AttributeKind::Color,
    ];

    /// Number of `f32` components per vertex.
    #[must_use]
    pub fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::TexCoord0 | Self::TexCoord1 => 2,
            Self::Tangent | Self::Color => 4,
        }
    }

    #[must_use]
    pub fn format(self) -> VertexFormat {
        match self.components() {
            2 => VertexFormat::Float32x2,
            3 => VertexFormat::Float32x3,
            _ => VertexFormat::Float32x4,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Tangent => "tangent",
            Self::TexCoord0 => "uv",
            Self::TexCoord1 => "uv1",
            Self::Color => "color",
        }
    }

    fn wgsl_type(self) -> &'static str {
        match self.components() {
            2 => "vec2<f32>",
            3 => "vec3<f32>",
            _ => "vec4<f32>",
        }
    }
}

/// Placement of one attribute inside a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub kind: AttributeKind,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
    /// Size of the attribute in bytes.
    pub size: u64,
}

impl AttributeSlot {
    /// Offset in `f32` units, for indexing the flattened buffer.
    #[inline]
    #[must_use]
    pub fn float_offset(&self) -> usize {
        (self.offset / F32_SIZE) as usize
    }
}

/// Layout descriptor: stride, per-attribute offsets and sizes.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    stride: u64,
    vertex_count: usize,
    slots: Vec<AttributeSlot>,
    wgpu_attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    /// Builds the layout for the given attributes.
    ///
    /// `present` may be in any order; the canonical order is always used.
    #[must_use]
    pub fn new(present: &[AttributeKind], vertex_count: usize) -> Self {
        let mut slots = Vec::with_capacity(present.len());
        let mut wgpu_attributes = Vec::with_capacity(present.len());
        let mut offset = 0u64;

        for kind in AttributeKind::ORDER {
            if !present.contains(&kind) {
                continue;
            }
            let size = kind.components() as u64 * F32_SIZE;
            wgpu_attributes.push(wgpu::VertexAttribute {
                format: kind.format(),
                offset,
                shader_location: slots.len() as u32,
            });
            slots.push(AttributeSlot { kind, offset, size });
            offset += size;
        }

        Self {
            stride: offset,
            vertex_count,
            slots,
            wgpu_attributes,
        }
    }

    /// Bytes per vertex.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    #[inline]
    #[must_use]
    pub fn floats_per_vertex(&self) -> usize {
        (self.stride / F32_SIZE) as usize
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Total size of the interleaved buffer in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.stride * self.vertex_count as u64
    }

    #[must_use]
    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, kind: AttributeKind) -> Option<&AttributeSlot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    #[must_use]
    pub fn contains(&self, kind: AttributeKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Smallest byte range of the interleaved buffer covering every row of
    /// the dirty columns.
    ///
    /// Columns are strided, so the range spans from the first row of the
    /// earliest dirty column to the last row of the latest one. Static
    /// attributes interleaved inside that span are re-sent unchanged: one
    /// contiguous write costs less than a write per vertex row, and the
    /// buffer is never reallocated.
    #[must_use]
    pub fn dirty_byte_range(&self, dirty: DirtyColumns) -> Option<Range<u64>> {
        if self.vertex_count == 0 {
            return None;
        }

        let last_row = (self.vertex_count as u64 - 1) * self.stride;
        let mut range: Option<Range<u64>> = None;

        let columns = [
            (dirty.positions, AttributeKind::Position),
            (dirty.normals, AttributeKind::Normal),
        ];
        for (is_dirty, kind) in columns {
            if !is_dirty {
                continue;
            }
            let Some(slot) = self.slot(kind) else {
                continue;
            };
            let start = slot.offset;
            let end = last_row + slot.offset + slot.size;
            range = Some(match range {
                Some(r) => r.start.min(start)..r.end.max(end),
                None => start..end,
            });
        }
        range
    }

    /// The layout as consumed by a render pipeline.
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.wgpu_attributes,
        }
    }

    /// WGSL `VertexInput` struct matching the shader locations of this layout.
    #[must_use]
    pub fn vertex_input_wgsl(&self) -> String {
        let mut code = String::from("struct VertexInput {\n");
        for (location, slot) in self.slots.iter().enumerate() {
            let _ = writeln!(
                code,
                "    @location({location}) {}: {},",
                slot.kind.name(),
                slot.kind.wgsl_type()
            );
        }
        code.push_str("};");
        code
    }
}
