//! Cooperative batch driver for chunk rebuilds.
//!
//! New chunks are built one at a time, a few phases per [`ChunkRebuilder::update`],
//! while hidden. Once the whole batch is built, all of its chunks are shown in
//! the same update and the chunks they replace are torn down, so a half-built
//! batch is never visible next to the geometry it supersedes.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::chunk::{Chunk, RebuildStatus};
use crate::error::RebuildError;
use crate::params::ChunkParams;
use crate::scene::SceneGroup;

/// Handle to a chunk owned by a [`ChunkRebuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(u64);

struct Slot {
    chunk: Chunk,
    group: usize,
}

/// Owns chunks and advances their rebuilds across scheduling turns.
///
/// Chunks are attached to groups addressed by index into the slice passed to
/// each call; callers must pass the same groups in the same order every time
/// and keep their transforms fixed while [`ChunkRebuilder::is_busy`].
pub struct ChunkRebuilder {
    slots: FxHashMap<ChunkKey, Slot>,
    queued: VecDeque<ChunkKey>,
    active: Option<ChunkKey>,
    built: Vec<ChunkKey>,
    retired: Vec<ChunkKey>,
    next_key: u64,
    phases_per_update: u32,
}

impl ChunkRebuilder {
    /// Create a rebuilder that runs up to `phases_per_update` phases per update
    /// (at least one).
    pub fn new(phases_per_update: u32) -> Self {
        Self {
            slots: FxHashMap::default(),
            queued: VecDeque::new(),
            active: None,
            built: Vec::new(),
            retired: Vec::new(),
            next_key: 0,
            phases_per_update: phases_per_update.max(1),
        }
    }

    /// Create a chunk attached to `groups[group]`, hidden until its batch
    /// completes, and queue it for rebuild.
    pub fn allocate<G: SceneGroup>(
        &mut self,
        params: ChunkParams,
        group: usize,
        groups: &mut [G],
    ) -> Result<ChunkKey, RebuildError> {
        let len = groups.len();
        let target = groups
            .get_mut(group)
            .ok_or(RebuildError::UnknownGroup { index: group, len })?;

        let mut chunk = Chunk::new(params, target)?;
        chunk.hide();
        chunk.begin_rebuild();

        let key = ChunkKey(self.next_key);
        self.next_key += 1;
        self.slots.insert(key, Slot { chunk, group });
        self.queued.push_back(key);
        debug!(?key, group, queued = self.queued.len(), "chunk queued for rebuild");
        Ok(key)
    }

    /// Mark a chunk for teardown once the current batch has been shown.
    ///
    /// Returns `false` if the key is unknown.
    pub fn retire(&mut self, key: ChunkKey) -> bool {
        if !self.slots.contains_key(&key) {
            return false;
        }
        if !self.retired.contains(&key) {
            self.retired.push(key);
        }
        true
    }

    /// `true` while a chunk is being built or waiting to be.
    pub fn is_busy(&self) -> bool {
        self.active.is_some() || !self.queued.is_empty()
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.slots.get(&key).map(|slot| &slot.chunk)
    }

    /// Iterate over all live chunks with the index of the group each is attached to.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkKey, usize, &Chunk)> {
        self.slots
            .iter()
            .map(|(key, slot)| (*key, slot.group, &slot.chunk))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Run one scheduling turn.
    ///
    /// With a chunk active, advances it by up to `phases_per_update` phases;
    /// otherwise promotes the next queued chunk, which starts building on the
    /// following turn. When nothing remains, the batch is revealed and retired
    /// chunks are destroyed.
    pub fn update<G: SceneGroup>(&mut self, groups: &mut [G]) -> Result<(), RebuildError> {
        if let Some(key) = self.active {
            self.advance(key, groups)?;
        } else if let Some(key) = self.queued.pop_front() {
            self.active = Some(key);
            self.built.push(key);
        }

        if !self.is_busy() && (!self.built.is_empty() || !self.retired.is_empty()) {
            self.finish_batch(groups)?;
        }
        Ok(())
    }

    fn advance<G: SceneGroup>(&mut self, key: ChunkKey, groups: &[G]) -> Result<(), RebuildError> {
        let Some(slot) = self.slots.get_mut(&key) else {
            self.active = None;
            return Ok(());
        };
        let len = groups.len();
        let group = groups.get(slot.group).ok_or(RebuildError::UnknownGroup {
            index: slot.group,
            len,
        })?;

        for _ in 0..self.phases_per_update {
            match slot.chunk.step_rebuild(group) {
                RebuildStatus::InProgress(_) => {}
                RebuildStatus::Finished | RebuildStatus::Idle => {
                    self.active = None;
                    break;
                }
            }
        }
        Ok(())
    }

    fn finish_batch<G: SceneGroup>(&mut self, groups: &mut [G]) -> Result<(), RebuildError> {
        let shown = self.built.len();
        for key in self.built.drain(..) {
            if let Some(slot) = self.slots.get_mut(&key) {
                slot.chunk.show();
            }
        }

        let destroyed = self.retired.len();
        for key in std::mem::take(&mut self.retired) {
            let Some(mut slot) = self.slots.remove(&key) else {
                continue;
            };
            let len = groups.len();
            let group = groups
                .get_mut(slot.group)
                .ok_or(RebuildError::UnknownGroup {
                    index: slot.group,
                    len,
                })?;
            slot.chunk.destroy(group);
            slot.chunk.dispose();
        }

        info!(shown, destroyed, live = self.slots.len(), "chunk batch complete");
        Ok(())
    }
}

impl Default for ChunkRebuilder {
    fn default() -> Self {
        Self::new(1)
    }
}
