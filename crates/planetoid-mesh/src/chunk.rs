//! A terrain chunk: the mesh it owns, its attachment to a scene group, and its
//! in-flight geometry rebuild.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::builder::{BuildPhase, ChunkGeometryBuilder};
use crate::error::ChunkParamsError;
use crate::geometry::BufferGeometry;
use crate::params::{ChunkParams, MaterialId};
use crate::scene::{MeshId, SceneGroup};

/// The renderable owned by a chunk.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub id: MeshId,
    pub geometry: BufferGeometry,
    pub material: MaterialId,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// Progress reported by [`Chunk::step_rebuild`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildStatus {
    /// No rebuild is in flight.
    Idle,
    /// A phase ran; the contained phase runs next.
    InProgress(BuildPhase),
    /// The last phase ran and the new geometry is live.
    Finished,
}

struct Rebuild {
    builder: ChunkGeometryBuilder,
    started: Instant,
}

/// One patch of a planet's surface.
pub struct Chunk {
    params: ChunkParams,
    mesh: TerrainMesh,
    rebuild: Option<Rebuild>,
    attached: bool,
}

impl Chunk {
    /// Create a chunk with empty geometry and attach its mesh to `group`.
    ///
    /// The geometry is not built until [`Chunk::begin_rebuild`] is called and
    /// the rebuild is driven to completion.
    pub fn new<G: SceneGroup + ?Sized>(
        params: ChunkParams,
        group: &mut G,
    ) -> Result<Self, ChunkParamsError> {
        params.validate()?;
        let mesh = TerrainMesh {
            id: MeshId::next(),
            geometry: BufferGeometry::new(),
            material: params.material,
            visible: true,
            cast_shadow: false,
            receive_shadow: true,
        };
        group.add(mesh.id);
        Ok(Self {
            params,
            mesh,
            rebuild: None,
            attached: true,
        })
    }

    pub fn params(&self) -> &ChunkParams {
        &self.params
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// The live geometry. Empty until the first rebuild finishes.
    pub fn geometry(&self) -> &BufferGeometry {
        &self.mesh.geometry
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuild.is_some()
    }

    /// Phase the in-flight rebuild runs next, if any.
    pub fn rebuild_phase(&self) -> Option<BuildPhase> {
        self.rebuild.as_ref().map(|r| r.builder.phase())
    }

    /// Start a rebuild from the first phase, discarding any partial one.
    pub fn begin_rebuild(&mut self) {
        if self.rebuild.is_some() {
            debug!(mesh = self.mesh.id.raw(), "restarting chunk rebuild");
        }
        // Params were validated in `new`.
        self.rebuild = Some(Rebuild {
            builder: ChunkGeometryBuilder::from_validated(self.params.clone()),
            started: Instant::now(),
        });
    }

    /// Advance the in-flight rebuild by one phase.
    ///
    /// The group's transform is read when the vertex phase runs. When the final
    /// phase completes the new buffers replace the live geometry.
    pub fn step_rebuild<G: SceneGroup + ?Sized>(&mut self, group: &G) -> RebuildStatus {
        let Some(rebuild) = self.rebuild.as_mut() else {
            return RebuildStatus::Idle;
        };

        let next = rebuild.builder.step(&group.local_to_world());
        if next != BuildPhase::Done {
            debug!(mesh = self.mesh.id.raw(), ?next, "chunk phase complete");
            return RebuildStatus::InProgress(next);
        }

        let Some(rebuild) = self.rebuild.take() else {
            return RebuildStatus::Idle;
        };
        let mut geometry = BufferGeometry::new();
        if let Err(e) = rebuild.builder.write_to(&mut geometry) {
            warn!(mesh = self.mesh.id.raw(), "dropping unfinished rebuild: {e}");
            return RebuildStatus::Idle;
        }
        self.mesh.geometry = geometry;

        info!(
            mesh = self.mesh.id.raw(),
            vertices = self.mesh.geometry.vertex_count(),
            triangles = self.mesh.geometry.triangle_count(),
            elapsed = ?rebuild.started.elapsed(),
            "chunk rebuilt"
        );
        RebuildStatus::Finished
    }

    /// Start a rebuild and drive every phase back-to-back.
    pub fn rebuild<G: SceneGroup + ?Sized>(&mut self, group: &G) {
        self.begin_rebuild();
        while self.step_rebuild(group) != RebuildStatus::Finished {}
    }

    /// Abandon the in-flight rebuild. The previous geometry stays live.
    pub fn cancel_rebuild(&mut self) {
        if let Some(rebuild) = self.rebuild.take() {
            warn!(
                mesh = self.mesh.id.raw(),
                phase = ?rebuild.builder.phase(),
                "chunk rebuild abandoned"
            );
        }
    }

    pub fn hide(&mut self) {
        self.mesh.visible = false;
    }

    pub fn show(&mut self) {
        self.mesh.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.mesh.visible
    }

    /// Detach the mesh from `group`. Buffers are kept; see [`Chunk::dispose`].
    pub fn destroy<G: SceneGroup + ?Sized>(&mut self, group: &mut G) {
        group.remove(self.mesh.id);
        self.attached = false;
    }

    /// Release the geometry buffers and any in-flight rebuild.
    pub fn dispose(&mut self) {
        self.rebuild = None;
        self.mesh.geometry.clear();
    }
}
