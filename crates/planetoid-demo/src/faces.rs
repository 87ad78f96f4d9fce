//! The six cube faces a planet is tiled from, and the chunk layout on each.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DMat4, DVec3};

/// One face of the cube the sphere is projected from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    /// All six faces in canonical order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Position in [`CubeFace::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward-pointing unit normal.
    pub fn normal(self) -> DVec3 {
        match self {
            CubeFace::PosX => DVec3::X,
            CubeFace::NegX => DVec3::NEG_X,
            CubeFace::PosY => DVec3::Y,
            CubeFace::NegY => DVec3::NEG_Y,
            CubeFace::PosZ => DVec3::Z,
            CubeFace::NegZ => DVec3::NEG_Z,
        }
    }

    /// Rotation taking local +z onto [`CubeFace::normal`].
    fn rotation(self) -> DMat4 {
        match self {
            CubeFace::PosX => DMat4::from_rotation_y(FRAC_PI_2),
            CubeFace::NegX => DMat4::from_rotation_y(-FRAC_PI_2),
            CubeFace::PosY => DMat4::from_rotation_x(-FRAC_PI_2),
            CubeFace::NegY => DMat4::from_rotation_x(FRAC_PI_2),
            CubeFace::PosZ => DMat4::IDENTITY,
            CubeFace::NegZ => DMat4::from_rotation_y(PI),
        }
    }

    /// Local-to-world transform of this face's group.
    ///
    /// Chunk vertices are emitted relative to the face centre, so the group
    /// lifts them back out by `radius` along local +z before rotating.
    pub fn transform(self, radius: f64) -> DMat4 {
        self.rotation() * DMat4::from_translation(DVec3::new(0.0, 0.0, radius))
    }

    /// The face whose normal is closest to `direction`.
    pub fn facing(direction: DVec3) -> CubeFace {
        let mut best = CubeFace::PosZ;
        let mut best_dot = f64::NEG_INFINITY;
        for face in CubeFace::ALL {
            let dot = face.normal().dot(direction);
            if dot > best_dot {
                best = face;
                best_dot = dot;
            }
        }
        best
    }
}

/// Offsets and width of an `n x n` tiling of a face of a cube with half-extent `radius`.
pub fn chunk_layout(radius: f64, chunks_per_face: u32) -> (f64, Vec<DVec3>) {
    let width = 2.0 * radius / f64::from(chunks_per_face);
    let half = width / 2.0;
    let offsets = (0..chunks_per_face)
        .flat_map(|cx| (0..chunks_per_face).map(move |cy| (cx, cy)))
        .map(|(cx, cy)| {
            DVec3::new(
                f64::from(cx) * width - radius + half,
                f64::from(cy) * width - radius + half,
                0.0,
            )
        })
        .collect();
    (width, offsets)
}
