//! Sky-light column seeding and the bounded 6-direction BFS.
//!
//! A top-down column scan establishes the unobstructed-sky baseline, then a
//! BFS with per-step falloff spreads light sideways and upward into
//! overhangs, strictly bounded to this chunk's extent.

use std::collections::VecDeque;

use crate::block::BlockRegistry;
use crate::chunk::Chunk;
use crate::constants::{CHUNK_SIZE, MAX_LIGHT_LEVEL, WORLD_HEIGHT};
use crate::direction::Direction;

use super::scratch::with_sky_queue;

/// Column scan: for each `(x, z)`, walk `y` from the top down with a
/// register starting at 15, zeroing on the first opaque cell and otherwise
/// subtracting the cell's sky opacity.
pub fn seed_columns(chunk: &mut Chunk, registry: &BlockRegistry) {
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            seed_column(chunk, registry, x, z);
        }
    }
}

fn seed_column(chunk: &mut Chunk, registry: &BlockRegistry, x: i32, z: i32) {
    let mut level: i32 = MAX_LIGHT_LEVEL as i32;
    for y in (0..WORLD_HEIGHT).rev() {
        let id = chunk.get_block(x, y, z);
        let props = registry.get_properties(id);
        if props.solid && !props.transparent {
            level = 0;
        } else {
            level = (level - props.sky_opacity as i32).max(0);
        }
        chunk.set_sky_light(x, y, z, level as u8);
    }
}

/// Runs the bounded BFS from an explicit seed set, strictly clamped to this
/// chunk's `(x, z)` extent to prevent unbounded cascade into unloaded
/// neighbors.
pub fn propagate_sky_bfs(chunk: &mut Chunk, registry: &BlockRegistry, seeds: &[(i32, i32, i32)]) {
    with_sky_queue(|queue| {
        queue.extend(seeds.iter().copied());
        run_bfs(chunk, registry, queue);
    });
}

fn run_bfs(chunk: &mut Chunk, registry: &BlockRegistry, queue: &mut VecDeque<(i32, i32, i32)>) {
    while let Some((x, y, z)) = queue.pop_front() {
        if !(0..CHUNK_SIZE).contains(&x) || !(0..CHUNK_SIZE).contains(&z) {
            continue;
        }
        if !(0..WORLD_HEIGHT).contains(&y) {
            continue;
        }
        let level = chunk.sky_light(x, y, z);
        if level == 0 {
            continue;
        }
        for dir in Direction::ALL {
            let (dx, dy, dz) = dir.offset();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            if !(0..CHUNK_SIZE).contains(&nx) || !(0..CHUNK_SIZE).contains(&nz) {
                continue;
            }
            if !(0..WORLD_HEIGHT).contains(&ny) {
                continue;
            }
            let neighbor_id = chunk.get_block(nx, ny, nz);
            let props = registry.get_properties(neighbor_id);
            if props.solid && !props.transparent {
                continue;
            }
            let new_level = (level as i32 - 1 - props.sky_opacity as i32).max(0);
            if new_level as u8 > chunk.sky_light(nx, ny, nz) {
                chunk.set_sky_light(nx, ny, nz, new_level as u8);
                queue.push_back((nx, ny, nz));
            }
        }
    }
}

/// Every seed worth enqueuing after a fresh column scan: cells whose sky
/// level differs from a non-opaque neighbor's by more than 1 start the BFS
/// (the column pass alone only gets the vertical component right).
pub fn initial_seeds(chunk: &Chunk, registry: &BlockRegistry) -> Vec<(i32, i32, i32)> {
    let mut seeds = Vec::new();
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..WORLD_HEIGHT {
                let id = chunk.get_block(x, y, z);
                let props = registry.get_properties(id);
                if props.solid && !props.transparent {
                    continue;
                }
                if chunk.sky_light(x, y, z) > 0 {
                    seeds.push((x, y, z));
                }
            }
        }
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;

    #[test]
    fn open_sky_column_is_fully_lit() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        seed_columns(&mut chunk, &registry);
        assert_eq!(chunk.sky_light(3, WORLD_HEIGHT - 1, 3), 15);
        assert_eq!(chunk.sky_light(3, 0, 3), 15);
    }

    #[test]
    fn opaque_floor_blocks_light_below() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(3, 10, 3, BlockId::STONE);
        seed_columns(&mut chunk, &registry);
        assert_eq!(chunk.sky_light(3, 10, 3), 0);
        assert_eq!(chunk.sky_light(3, 9, 3), 0);
        assert_eq!(chunk.sky_light(3, 11, 3), 15);
    }

    #[test]
    fn water_reduces_column_light_by_its_opacity() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(3, 10, 3, BlockId::WATER);
        seed_columns(&mut chunk, &registry);
        assert_eq!(chunk.sky_light(3, 10, 3), 12);
    }
}
