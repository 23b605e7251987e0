//! Chunk coordinates and the packed key used to index the chunk store.

use crate::constants::CHUNK_SIZE;

/// Column coordinate of a chunk, in chunk units (not block units).
///
/// Grounded on the teacher's `SpatialIndex::get_chunk_key`, which packs an
/// `(x, z)` pair into a single integer for allocation-free map lookups; here
/// the pack widens to 64 bits so it covers the full `i32` coordinate range
/// instead of the teacher's 16-bit-per-axis shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        ChunkCoord { cx, cz }
    }

    /// Packs this coordinate into a single `u64` key: high 32 bits `cx`,
    /// low 32 bits `cz`. Used by [`crate::chunk::store::ChunkStore`] so
    /// lookups hash a single integer instead of a struct.
    #[inline]
    pub const fn key(self) -> u64 {
        ((self.cx as u32 as u64) << 32) | (self.cz as u32 as u64)
    }

    #[inline]
    pub const fn from_key(key: u64) -> Self {
        ChunkCoord {
            cx: (key >> 32) as u32 as i32,
            cz: (key & 0xFFFF_FFFF) as u32 as i32,
        }
    }

    /// The chunk containing world-space block column `(wx, wz)`.
    #[inline]
    pub fn from_world_block(wx: i32, wz: i32) -> Self {
        ChunkCoord {
            cx: wx.div_euclid(CHUNK_SIZE),
            cz: wz.div_euclid(CHUNK_SIZE),
        }
    }

    /// World-space coordinate of this chunk's minimum corner.
    #[inline]
    pub const fn origin_block(self) -> (i32, i32) {
        (self.cx * CHUNK_SIZE, self.cz * CHUNK_SIZE)
    }

    #[inline]
    pub fn neighbor(self, dx: i32, dz: i32) -> Self {
        ChunkCoord::new(self.cx + dx, self.cz + dz)
    }

    /// Chebyshev distance in chunks, used by the LOD policy's distance bands.
    #[inline]
    pub fn chebyshev_distance(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }
}

/// Converts a world-space block coordinate into chunk-local coordinates.
#[inline]
pub fn world_to_local(wx: i32, wz: i32) -> (i32, i32) {
    (wx.rem_euclid(CHUNK_SIZE), wz.rem_euclid(CHUNK_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrips_through_from_key() {
        let coord = ChunkCoord::new(-12, 345);
        assert_eq!(ChunkCoord::from_key(coord.key()), coord);
    }

    #[test]
    fn negative_world_coords_floor_toward_negative_chunks() {
        // block x = -1 belongs to chunk -1, not chunk 0
        assert_eq!(ChunkCoord::from_world_block(-1, 0).cx, -1);
        assert_eq!(world_to_local(-1, 0).0, CHUNK_SIZE - 1);
    }

    #[test]
    fn chebyshev_distance_matches_square_radius() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.chebyshev_distance(ChunkCoord::new(3, -3)), 3);
        assert_eq!(origin.chebyshev_distance(ChunkCoord::new(1, 5)), 5);
    }
}
