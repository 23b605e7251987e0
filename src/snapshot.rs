//! The Neighborhood Snapshot: an immutable, pre-captured view a mesh job
//! consumes without ever calling back into the chunk store.
//!
//! Locks the center chunk and its four cardinal neighbors once, up front,
//! and hands the mesh worker owned data — the worker thread never touches
//! the store's locks at all.

use std::sync::Arc;

use crate::block::BlockId;
use crate::chunk::{ChunkCoord, ChunkStore, ChunkView};
use crate::constants::{block_index, CHUNK_SIZE, WORLD_HEIGHT};
use crate::direction::Direction;

const NEIGHBOR_SLOTS: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

/// Immutable view of one chunk plus its up-to-4 cardinal neighbors, captured
/// once for a mesh job. Holds `Arc<ChunkView>`s taken under a brief read
/// lock each, so the data outlives the chunk's own lock and cannot dangle
/// even if the chunk is later unloaded from the store.
pub struct Snapshot {
    pub coord: ChunkCoord,
    center: Arc<ChunkView>,
    neighbors: [Option<Arc<ChunkView>>; 4],
}

impl Snapshot {
    /// Captures a snapshot: an O(5) read under brief per-chunk locks, no
    /// further store access after this call returns. Returns `None` if the
    /// center chunk is no longer loaded; callers turn a missing snapshot
    /// straight into an empty `RawMesh`.
    pub fn capture(store: &ChunkStore, coord: ChunkCoord) -> Option<Snapshot> {
        let center = Self::view_of(store, coord)?;
        let neighbors = NEIGHBOR_SLOTS.map(|dir| {
            let (dx, _, dz) = dir.offset();
            Self::view_of(store, coord.neighbor(dx, dz))
        });
        Some(Snapshot {
            coord,
            center,
            neighbors,
        })
    }

    fn view_of(store: &ChunkStore, coord: ChunkCoord) -> Option<Arc<ChunkView>> {
        let handle = store.get_handle(coord)?;
        let guard = handle.read();
        Some(Arc::new(guard.to_view()))
    }

    fn neighbor_for(&self, dir: Direction) -> Option<&Arc<ChunkView>> {
        NEIGHBOR_SLOTS
            .iter()
            .position(|d| *d == dir)
            .and_then(|i| self.neighbors[i].as_ref())
    }

    /// Resolves a chunk-local-ish coordinate `(lx, y, lz)` with `lx, lz` in
    /// `[-1, 16]` to the view that owns it and the in-chunk index. Diagonal
    /// accesses (`lx` and `lz` both out of `[0,15]`) resolve to `None`,
    /// which every accessor below treats as air / zero light.
    fn resolve(&self, lx: i32, y: i32, lz: i32) -> Option<(&ChunkView, i32, i32, i32)> {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return None;
        }
        let x_out = lx < 0 || lx >= CHUNK_SIZE;
        let z_out = lz < 0 || lz >= CHUNK_SIZE;
        if x_out && z_out {
            return None;
        }
        if !x_out && !z_out {
            return Some((&self.center, lx, y, lz));
        }
        if x_out {
            let dir = if lx < 0 { Direction::West } else { Direction::East };
            let view = self.neighbor_for(dir)?;
            return Some((view, lx.rem_euclid(CHUNK_SIZE), y, lz));
        }
        let dir = if lz < 0 { Direction::North } else { Direction::South };
        let view = self.neighbor_for(dir)?;
        Some((view, lx, y, lz.rem_euclid(CHUNK_SIZE)))
    }

    pub fn get_block(&self, lx: i32, y: i32, lz: i32) -> BlockId {
        match self.resolve(lx, y, lz) {
            Some((view, x, y, z)) => view.blocks[block_index(x, y, z)],
            None => BlockId::AIR,
        }
    }

    pub fn get_sky_visibility(&self, lx: i32, y: i32, lz: i32) -> f32 {
        match self.resolve(lx, y, lz) {
            Some((view, x, y, z)) => view.sky_light(x, y, z) as f32 / 15.0,
            None if y >= WORLD_HEIGHT => 1.0,
            None => 0.0,
        }
    }

    pub fn get_block_light_scalar(&self, lx: i32, y: i32, lz: i32) -> f32 {
        match self.resolve(lx, y, lz) {
            Some((view, x, y, z)) => view.block_light_scalar(x, y, z) as f32 / 15.0,
            None => 0.0,
        }
    }

    pub fn get_block_light_rgb(&self, lx: i32, y: i32, lz: i32) -> [f32; 3] {
        match self.resolve(lx, y, lz) {
            Some((view, x, y, z)) => {
                let [r, g, b] = view.block_light_rgb(x, y, z);
                [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
            }
            None => [0.0, 0.0, 0.0],
        }
    }

    pub fn center_view(&self) -> &ChunkView {
        &self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    #[test]
    fn missing_center_chunk_yields_no_snapshot() {
        let store = ChunkStore::new();
        assert!(Snapshot::capture(&store, ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn diagonal_access_resolves_to_air() {
        let store = ChunkStore::new();
        store.insert(ChunkCoord::new(0, 0), Chunk::new_empty());
        let snap = Snapshot::capture(&store, ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(snap.get_block(-1, 0, -1), BlockId::AIR);
        assert_eq!(snap.get_sky_visibility(-1, 0, 16), 0.0);
    }

    #[test]
    fn missing_neighbor_reads_as_air_not_panic() {
        let store = ChunkStore::new();
        store.insert(ChunkCoord::new(0, 0), Chunk::new_empty());
        let snap = Snapshot::capture(&store, ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(snap.get_block(16, 0, 5), BlockId::AIR);
    }
}
