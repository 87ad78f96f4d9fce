//! Error types for chunk construction, finalization, and rebuild scheduling.

use thiserror::Error;

use crate::BuildPhase;

/// Rejected [`ChunkParams`](crate::ChunkParams).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkParamsError {
    #[error("resolution must be at least 1")]
    ZeroResolution,

    #[error("width must be positive and finite, got {0}")]
    InvalidWidth(f64),

    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("offset must be finite, got {0:?}")]
    NonFiniteOffset([f64; 3]),

    #[error("at least one height generator is required")]
    NoHeightGenerators,

    /// The grid would need more vertices than a `u32` index can address.
    #[error("resolution {0} exceeds the u32 index range")]
    ResolutionTooLarge(u32),
}

/// Failure to hand builder output to a geometry sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("geometry build is incomplete (next phase: {0:?})")]
    Incomplete(BuildPhase),
}

/// Failure to schedule a chunk on a [`ChunkRebuilder`](crate::ChunkRebuilder).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RebuildError {
    #[error("invalid chunk parameters: {0}")]
    InvalidParams(#[from] ChunkParamsError),

    #[error("group index {index} out of range ({len} groups)")]
    UnknownGroup { index: usize, len: usize },
}
