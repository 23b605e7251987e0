//! Persistence as an external collaborator.
//!
//! A `load_chunk` / `save_chunk` (write-behind, merging repeat writes for
//! the same key) / `flush` contract, defined as a trait plus one reference
//! implementation, `FilePersistence`: one bincode-encoded file per chunk
//! under `save_dir`, so per-chunk write-behind can merge writes
//! independently instead of contending on a single world blob.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Sender};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::chunk::{Chunk, ChunkCoord};
use crate::constants::CHUNK_VOLUME;
use crate::error::PersistenceError;

/// The core's view of an external chunk store. `load_chunk` may be called
/// from worker threads; `save_chunk` is write-behind and must merge repeat
/// writes for the same coordinate; `flush` drains pending writes and is
/// called on shutdown.
pub trait PersistenceAdapter: Send + Sync {
    fn load_chunk(&self, coord: ChunkCoord) -> Option<Chunk>;
    fn save_chunk(&self, coord: ChunkCoord, chunk: &Chunk);
    fn flush(&self);
}

/// On-disk layout for one chunk: `blocks` then `light_packed`, each a raw
/// byte run of length [`CHUNK_VOLUME`]. The colored block-light arrays and
/// lazily-computed caches are not persisted — they are cheap to rederive
/// (`lighting::seed_initial`, `Chunk::height_at`/`section_flags`).
#[derive(Serialize, Deserialize)]
struct PersistedChunk {
    blocks: Vec<u8>,
    light_packed: Vec<u8>,
}

/// Reference [`PersistenceAdapter`]: one bincode-encoded file per chunk
/// under `save_dir`, with a write-behind queue that merges repeat saves
/// for the same coordinate into whichever payload is most recent when the
/// IO thread gets to it.
pub struct FilePersistence {
    dir: PathBuf,
    pending: Arc<DashMap<u64, PersistedChunk>>,
    sender: Sender<u64>,
}

impl FilePersistence {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        if let Err(err) = fs::create_dir_all(&dir) {
            log::warn!("failed to create save_dir {}: {err}", dir.display());
        }
        let pending: Arc<DashMap<u64, PersistedChunk>> = Arc::new(DashMap::new());
        let (sender, receiver) = bounded::<u64>(4096);

        let worker_dir = dir.clone();
        let worker_pending = Arc::clone(&pending);
        thread::Builder::new()
            .name("voxelstream-persistence".to_string())
            .spawn(move || {
                for key in receiver.iter() {
                    drain_one(&worker_dir, &worker_pending, key);
                }
            })
            .expect("failed to spawn persistence worker thread");

        FilePersistence { dir, pending, sender }
    }

    fn path_for_key(&self, key: u64) -> PathBuf {
        let coord = ChunkCoord::from_key(key);
        self.dir.join(format!("c.{}.{}.bin", coord.cx, coord.cz))
    }
}

fn drain_one(dir: &Path, pending: &DashMap<u64, PersistedChunk>, key: u64) {
    let Some((_, payload)) = pending.remove(&key) else {
        return;
    };
    let coord = ChunkCoord::from_key(key);
    let path = dir.join(format!("c.{}.{}.bin", coord.cx, coord.cz));
    match bincode::serialize(&payload) {
        Ok(bytes) => {
            if let Err(source) = fs::write(&path, bytes) {
                log::warn!(
                    "{}",
                    PersistenceError::Write(coord.cx, coord.cz, source)
                );
            }
        }
        Err(source) => {
            log::warn!("{}", PersistenceError::Encode(coord.cx, coord.cz, source));
        }
    }
}

impl PersistenceAdapter for FilePersistence {
    fn load_chunk(&self, coord: ChunkCoord) -> Option<Chunk> {
        let path = self.path_for_key(coord.key());
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return None,
            Err(source) => {
                log::warn!("{}", PersistenceError::Read(coord.cx, coord.cz, source));
                return None;
            }
        };
        let persisted: PersistedChunk = match bincode::deserialize(&bytes) {
            Ok(p) => p,
            Err(source) => {
                log::warn!("{}", PersistenceError::Decode(coord.cx, coord.cz, source));
                return None;
            }
        };
        decode(persisted)
    }

    fn save_chunk(&self, coord: ChunkCoord, chunk: &Chunk) {
        let key = coord.key();
        let payload = PersistedChunk {
            blocks: bytemuck::cast_slice(&chunk.blocks).to_vec(),
            light_packed: chunk.light_packed.clone(),
        };
        // Overwriting the dashmap entry under the same key is the merge:
        // whichever save is still pending when the IO thread drains it
        // wins, and a superseded payload is simply dropped here.
        self.pending.insert(key, payload);
        if self.sender.try_send(key).is_err() {
            log::warn!(
                "persistence queue full, write for chunk ({}, {}) deferred to flush",
                coord.cx, coord.cz
            );
        }
    }

    fn flush(&self) {
        let keys: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        for key in keys {
            drain_one(&self.dir, &self.pending, key);
        }
    }
}

fn decode(persisted: PersistedChunk) -> Option<Chunk> {
    if persisted.blocks.len() != CHUNK_VOLUME || persisted.light_packed.len() != CHUNK_VOLUME {
        return None;
    }
    let mut chunk = Chunk::new_empty();
    chunk.blocks = persisted.blocks.into_iter().map(BlockId::new).collect();
    chunk.light_packed = persisted.light_packed;
    // Colored block light isn't persisted (see `PersistedChunk` doc
    // comment), so the loader leaves `light_dirty` set — the scheduler's
    // load path reruns the same seeding pass a freshly generated chunk
    // gets, which is cheap and repopulates the RGB arrays.
    chunk.dirty = true;
    chunk.modified = false;
    Some(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for_flush_effects(path: &Path) {
        // The worker thread drains asynchronously; give it a moment before
        // asserting on disk state. Bounded and short: CI-friendly.
        for _ in 0..200 {
            if path.exists() {
                return;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn save_then_load_round_trips_blocks_and_light() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FilePersistence::new(dir.path());
        let coord = ChunkCoord::new(3, -4);

        let mut chunk = Chunk::new_empty();
        chunk.set_block(1, 2, 3, BlockId::STONE);
        chunk.set_sky_light(1, 2, 3, 7);

        adapter.save_chunk(coord, &chunk);
        adapter.flush();

        let path = dir.path().join("c.3.-4.bin");
        wait_for_flush_effects(&path);
        assert!(path.exists());

        let loaded = adapter.load_chunk(coord).expect("chunk should round-trip");
        assert_eq!(loaded.get_block(1, 2, 3), BlockId::STONE);
        assert_eq!(loaded.sky_light(1, 2, 3), 7);
    }

    #[test]
    fn missing_chunk_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FilePersistence::new(dir.path());
        assert!(adapter.load_chunk(ChunkCoord::new(99, 99)).is_none());
    }

    #[test]
    fn repeat_saves_for_same_key_merge_to_latest() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FilePersistence::new(dir.path());
        let coord = ChunkCoord::new(0, 0);

        let mut first = Chunk::new_empty();
        first.set_block(0, 0, 0, BlockId::DIRT);
        adapter.save_chunk(coord, &first);

        let mut second = Chunk::new_empty();
        second.set_block(0, 0, 0, BlockId::STONE);
        adapter.save_chunk(coord, &second);

        adapter.flush();
        let path = dir.path().join("c.0.0.bin");
        wait_for_flush_effects(&path);

        let loaded = adapter.load_chunk(coord).unwrap();
        assert_eq!(loaded.get_block(0, 0, 0), BlockId::STONE);
    }
}
