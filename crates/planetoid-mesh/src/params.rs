//! Chunk construction parameters.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use planetoid_terrain::{ColourGenerator, HeightGenerator};

use crate::error::ChunkParamsError;

/// Largest resolution whose `(resolution + 1)^2` vertices fit a `u32` index.
const MAX_RESOLUTION: u32 = u16::MAX as u32;

/// Opaque handle to a shared rendering material. Chunks reference it, never own it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Everything needed to synthesize one chunk's geometry.
///
/// The samplers are shared: every chunk of a planet usually points at the same
/// generators.
#[derive(Clone)]
pub struct ChunkParams {
    /// Grid subdivisions per edge.
    pub resolution: u32,
    /// Radius of the base sphere.
    pub radius: f64,
    /// Position of the patch centre on the cube face, relative to the face centre.
    pub offset: DVec3,
    /// Edge length of the patch before projection.
    pub width: f64,
    /// Height fields. Only the first one is sampled.
    pub height_generators: Vec<Arc<dyn HeightGenerator>>,
    pub colour_generator: Arc<dyn ColourGenerator>,
    pub material: MaterialId,
}

impl ChunkParams {
    /// Check the preconditions the builder relies on.
    pub fn validate(&self) -> Result<(), ChunkParamsError> {
        if self.resolution == 0 {
            return Err(ChunkParamsError::ZeroResolution);
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(ChunkParamsError::ResolutionTooLarge(self.resolution));
        }
        if !(self.width > 0.0 && self.width.is_finite()) {
            return Err(ChunkParamsError::InvalidWidth(self.width));
        }
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(ChunkParamsError::InvalidRadius(self.radius));
        }
        if !self.offset.is_finite() {
            return Err(ChunkParamsError::NonFiniteOffset(self.offset.to_array()));
        }
        if self.height_generators.is_empty() {
            return Err(ChunkParamsError::NoHeightGenerators);
        }
        Ok(())
    }

    /// Number of vertices per grid edge.
    pub fn verts_per_edge(&self) -> usize {
        self.resolution as usize + 1
    }

    /// `(resolution + 1)^2`.
    pub fn vertex_count(&self) -> usize {
        self.verts_per_edge() * self.verts_per_edge()
    }

    /// `6 * resolution^2`.
    pub fn index_count(&self) -> usize {
        let r = self.resolution as usize;
        6 * r * r
    }
}

impl fmt::Debug for ChunkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkParams")
            .field("resolution", &self.resolution)
            .field("radius", &self.radius)
            .field("offset", &self.offset)
            .field("width", &self.width)
            .field("height_generators", &self.height_generators.len())
            .field("material", &self.material)
            .finish_non_exhaustive()
    }
}
