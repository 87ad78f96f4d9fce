//! Interleaved vertex layout for uploading a finished chunk in one buffer.

use bytemuck::{Pod, Zeroable};

use crate::geometry::{BufferGeometry, VertexAttribute};

/// A single interleaved terrain vertex.
///
/// Layout (60 bytes): position, color, normal (3 x f32 each), tangent (4 x f32),
/// uv (2 x f32).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 60]);

impl BufferGeometry {
    /// Interleave the attribute buffers into [`TerrainVertex`] records.
    ///
    /// Attributes that are missing or shorter than the position buffer read as zero.
    pub fn to_vertices(&self) -> Vec<TerrainVertex> {
        let fetch = |attribute: VertexAttribute, i: usize, out: &mut [f32]| {
            let n = attribute.item_size();
            if let Some(src) = self.attribute(attribute).get(i * n..(i + 1) * n) {
                out.copy_from_slice(src);
            }
        };

        (0..self.vertex_count())
            .map(|i| {
                let mut v = TerrainVertex::zeroed();
                fetch(VertexAttribute::Position, i, &mut v.position);
                fetch(VertexAttribute::Color, i, &mut v.color);
                fetch(VertexAttribute::Normal, i, &mut v.normal);
                fetch(VertexAttribute::Tangent, i, &mut v.tangent);
                fetch(VertexAttribute::Uv, i, &mut v.uv);
                v
            })
            .collect()
    }
}
