//! Named vertex-attribute buffers and the sink interface builders write into.

/// The vertex attributes a terrain chunk produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position,
    Color,
    Normal,
    Tangent,
    Uv,
}

impl VertexAttribute {
    pub const ALL: [VertexAttribute; 5] = [
        VertexAttribute::Position,
        VertexAttribute::Color,
        VertexAttribute::Normal,
        VertexAttribute::Tangent,
        VertexAttribute::Uv,
    ];

    /// Number of `f32` components per vertex.
    pub const fn item_size(self) -> usize {
        match self {
            VertexAttribute::Position | VertexAttribute::Color | VertexAttribute::Normal => 3,
            VertexAttribute::Tangent => 4,
            VertexAttribute::Uv => 2,
        }
    }

    /// Conventional shader attribute name.
    pub const fn name(self) -> &'static str {
        match self {
            VertexAttribute::Position => "position",
            VertexAttribute::Color => "color",
            VertexAttribute::Normal => "normal",
            VertexAttribute::Tangent => "tangent",
            VertexAttribute::Uv => "uv",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Receives finished geometry as flat attribute buffers plus a triangle index list.
pub trait GeometrySink {
    /// Replace one attribute. `data.len()` is a multiple of `attribute.item_size()`.
    fn set_attribute(&mut self, attribute: VertexAttribute, data: Vec<f32>);
    /// Replace the index buffer (three indices per triangle).
    fn set_index(&mut self, indices: Vec<u32>);
}

/// CPU-side geometry: one flat `f32` buffer per attribute and a `u32` index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferGeometry {
    attributes: [Vec<f32>; 5],
    indices: Vec<u32>,
}

impl BufferGeometry {
    /// Create empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat data for one attribute; empty if never set.
    pub fn attribute(&self, attribute: VertexAttribute) -> &[f32] {
        &self.attributes[attribute.slot()]
    }

    /// Attribute data viewed as fixed-size items, e.g. `[f32; 3]` for positions.
    ///
    /// # Panics
    ///
    /// Panics if `N` differs from the attribute's item size.
    pub fn items<const N: usize>(&self, attribute: VertexAttribute) -> &[[f32; N]]
    where
        [f32; N]: bytemuck::Pod,
    {
        assert_eq!(
            N,
            attribute.item_size(),
            "{} items have {} components",
            attribute.name(),
            attribute.item_size()
        );
        bytemuck::cast_slice(self.attribute(attribute))
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex count, derived from the position attribute.
    pub fn vertex_count(&self) -> usize {
        self.attribute(VertexAttribute::Position).len() / VertexAttribute::Position.item_size()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if no positions and no indices are present.
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0 && self.indices.is_empty()
    }

    /// Attribute contents as a byte slice for GPU upload.
    pub fn attribute_bytes(&self, attribute: VertexAttribute) -> &[u8] {
        bytemuck::cast_slice(self.attribute(attribute))
    }

    /// Index buffer as a byte slice for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Total size of all buffers in bytes.
    pub fn byte_size(&self) -> usize {
        let attributes: usize = self.attributes.iter().map(|a| a.len() * 4).sum();
        attributes + self.indices.len() * 4
    }

    /// Drop every buffer and return its memory to the allocator.
    pub fn clear(&mut self) {
        self.attributes = Default::default();
        self.indices = Vec::new();
    }
}

impl GeometrySink for BufferGeometry {
    fn set_attribute(&mut self, attribute: VertexAttribute, data: Vec<f32>) {
        debug_assert_eq!(data.len() % attribute.item_size(), 0);
        self.attributes[attribute.slot()] = data;
    }

    fn set_index(&mut self, indices: Vec<u32>) {
        self.indices = indices;
    }
}
