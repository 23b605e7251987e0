//! Fixed world dimensions shared by every subsystem.
//!
//! These are compile-time constants, not configuration: the chunk layout,
//! flat-array indexing, and section count are baked into the mesher and
//! lighting BFS and cannot change without touching every module that reads
//! a `Chunk`.

/// Horizontal chunk extent, in blocks, along both X and Z.
pub const CHUNK_SIZE: i32 = 16;

/// Vertical extent of a chunk column, in blocks.
pub const WORLD_HEIGHT: i32 = 128;

/// Height of one vertical section used for `section_flags` occupancy.
pub const SECTION_HEIGHT: i32 = 16;

/// Number of vertical sections per chunk (`WORLD_HEIGHT / SECTION_HEIGHT`).
pub const SECTIONS_PER_CHUNK: usize = (WORLD_HEIGHT / SECTION_HEIGHT) as usize;

/// Total block count in one chunk (`16 * 16 * 128`).
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * WORLD_HEIGHT) as usize;

/// Number of columns in a chunk (`16 * 16`), for heightmap-sized arrays.
pub const CHUNK_COLUMNS: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Maximum sky/block light level (inclusive).
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Flat index into a `CHUNK_VOLUME`-sized array: `y*256 + z*16 + x`.
///
/// Panics in debug builds if any coordinate is out of `0..CHUNK_SIZE` /
/// `0..WORLD_HEIGHT`; callers at the block-array boundary are expected to
/// range-check first (see `Chunk::get_block`), which resolves out-of-range
/// reads to air rather than calling this.
#[inline]
pub fn block_index(x: i32, y: i32, z: i32) -> usize {
    debug_assert!((0..CHUNK_SIZE).contains(&x));
    debug_assert!((0..WORLD_HEIGHT).contains(&y));
    debug_assert!((0..CHUNK_SIZE).contains(&z));
    (y * CHUNK_SIZE * CHUNK_SIZE + z * CHUNK_SIZE + x) as usize
}

/// Flat index into a `CHUNK_COLUMNS`-sized array: `z*16 + x`.
#[inline]
pub fn column_index(x: i32, z: i32) -> usize {
    debug_assert!((0..CHUNK_SIZE).contains(&x));
    debug_assert!((0..CHUNK_SIZE).contains(&z));
    (z * CHUNK_SIZE + x) as usize
}

/// Section index for a given world-local y (`0..SECTIONS_PER_CHUNK`).
#[inline]
pub fn section_index(y: i32) -> usize {
    (y / SECTION_HEIGHT) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_volume_matches_dimensions() {
        assert_eq!(CHUNK_VOLUME, 16 * 16 * 128);
        assert_eq!(SECTIONS_PER_CHUNK, 8);
    }

    #[test]
    fn block_index_is_dense_and_unique() {
        let mut seen = vec![false; CHUNK_VOLUME];
        for y in 0..WORLD_HEIGHT {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let idx = block_index(x, y, z);
                    assert!(!seen[idx], "duplicate index at ({x},{y},{z})");
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }
}
