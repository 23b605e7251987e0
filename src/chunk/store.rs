//! The concurrent chunk store.
//!
//! A sharded map keyed by packed `u64` coordinate, handing out chunk handles
//! via reference counting. `dashmap` gives the sharded-lock behavior
//! directly instead of hand-rolling shards over a `Vec<RwLock<_>>`.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::coord::ChunkCoord;
use super::data::Chunk;

/// Snapshot of store occupancy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub loaded_chunks: usize,
}

/// Concurrent mapping from packed chunk coordinate to chunk.
///
/// Many concurrent readers (mesh workers taking snapshots, the render
/// thread iterating for draw calls); insert/remove are meant to be called
/// only from the observer thread (spec §5), though the map itself tolerates
/// concurrent writers since `dashmap` shards its internal locks.
pub struct ChunkStore {
    chunks: DashMap<u64, Arc<RwLock<Chunk>>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        ChunkStore {
            chunks: DashMap::new(),
        }
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord.key())
    }

    pub fn insert(&self, coord: ChunkCoord, chunk: Chunk) {
        self.chunks.insert(coord.key(), Arc::new(RwLock::new(chunk)));
    }

    pub fn remove(&self, coord: ChunkCoord) -> Option<Arc<RwLock<Chunk>>> {
        self.chunks.remove(&coord.key()).map(|(_, v)| v)
    }

    /// Returns the shared, lockable handle for a loaded chunk, if present.
    pub fn get_handle(&self, coord: ChunkCoord) -> Option<Arc<RwLock<Chunk>>> {
        self.chunks.get(&coord.key()).map(|entry| Arc::clone(&entry))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            loaded_chunks: self.chunks.len(),
        }
    }

    /// All currently-loaded chunk coordinates. Order is unspecified (spec
    /// §4.5: render iteration has no particular order requirement).
    pub fn iter_loaded(&self) -> Vec<ChunkCoord> {
        self.chunks.iter().map(|e| ChunkCoord::from_key(*e.key())).collect()
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}
