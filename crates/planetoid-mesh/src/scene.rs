//! Scene-graph capability a chunk attaches its mesh to.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::DMat4;

/// Process-unique identifier of a renderable mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A scene node that owns a local-to-world transform and a set of child meshes.
///
/// Chunks never own their group; they borrow it for attach, detach, and while
/// sampling world-space fields.
pub trait SceneGroup {
    /// Transform from the group's local space to world space.
    fn local_to_world(&self) -> DMat4;
    fn add(&mut self, mesh: MeshId);
    fn remove(&mut self, mesh: MeshId);
}

/// A minimal in-memory [`SceneGroup`].
#[derive(Clone, Debug, Default)]
pub struct Group {
    pub transform: DMat4,
    meshes: Vec<MeshId>,
}

impl Group {
    pub fn new(transform: DMat4) -> Self {
        Self {
            transform,
            meshes: Vec::new(),
        }
    }

    /// Attached meshes in attach order.
    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }

    pub fn contains(&self, mesh: MeshId) -> bool {
        self.meshes.contains(&mesh)
    }
}

impl SceneGroup for Group {
    fn local_to_world(&self) -> DMat4 {
        self.transform
    }

    fn add(&mut self, mesh: MeshId) {
        if !self.meshes.contains(&mesh) {
            self.meshes.push(mesh);
        }
    }

    fn remove(&mut self, mesh: MeshId) {
        self.meshes.retain(|m| *m != mesh);
    }
}
