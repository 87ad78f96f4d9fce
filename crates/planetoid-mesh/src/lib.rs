//! Displaced-sphere terrain chunks: incremental geometry synthesis, chunk
//! ownership of the resulting mesh, and a cooperative rebuild driver.

pub mod builder;
pub mod chunk;
pub mod error;
pub mod geometry;
pub mod params;
pub mod rebuilder;
pub mod scene;
pub mod vertex;

pub use builder::{BuildPhase, ChunkGeometryBuilder};
pub use chunk::{Chunk, RebuildStatus, TerrainMesh};
pub use error::{BuildError, ChunkParamsError, RebuildError};
pub use geometry::{BufferGeometry, GeometrySink, VertexAttribute};
pub use params::{ChunkParams, MaterialId};
pub use rebuilder::{ChunkKey, ChunkRebuilder};
pub use scene::{Group, MeshId, SceneGroup};
pub use vertex::TerrainVertex;
