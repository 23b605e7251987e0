//! Cross-chunk light bleed, triggered only on neighbor-load events.
//!
//! `propagate_edge_light(source, neighbor)` scans the shared boundary slab
//! and seeds into the neighbor, bounded to the neighbor's footprint. Applied
//! uniformly to both sky light and colored block light (see `DESIGN.md`).

use crate::block::BlockRegistry;
use crate::chunk::{Chunk, ChunkCoord, ChunkStore};
use crate::constants::{CHUNK_SIZE, WORLD_HEIGHT};
use crate::direction::Direction;

use super::{block as block_light, sky};

const NEIGHBOR_DIRS: [Direction; 4] =
    [Direction::East, Direction::West, Direction::South, Direction::North];

/// Scans the boundary slab shared between `coord` and each already-loaded
/// cardinal neighbor, seeding light both ways: the freshly-loaded chunk
/// picks up light from lit neighbors, and those neighbors pick up light
/// from the new chunk's own freshly-seeded fields. Returns every chunk
/// coordinate whose fields actually changed (and therefore needs a
/// mesh rebuild).
pub fn propagate_edge_light(store: &ChunkStore, registry: &BlockRegistry, coord: ChunkCoord) -> Vec<ChunkCoord> {
    let mut changed = Vec::new();
    let Some(center_handle) = store.get_handle(coord) else {
        return changed;
    };

    for dir in NEIGHBOR_DIRS {
        let (dx, _, dz) = dir.offset();
        let neighbor_coord = coord.neighbor(dx, dz);
        let Some(neighbor_handle) = store.get_handle(neighbor_coord) else {
            continue;
        };

        // Seed `coord` from the neighbor's boundary slab.
        {
            let neighbor_guard = neighbor_handle.read();
            let slab = boundary_slab(&neighbor_guard, dir.opposite());
            drop(neighbor_guard);
            let mut center_guard = center_handle.write();
            if seed_slab_into(&mut center_guard, registry, dir, &slab) {
                changed.push(coord);
            }
        }

        // Seed the neighbor from `coord`'s boundary slab.
        {
            let center_guard = center_handle.read();
            let slab = boundary_slab(&center_guard, dir);
            drop(center_guard);
            let mut neighbor_guard = neighbor_handle.write();
            if seed_slab_into(&mut neighbor_guard, registry, dir.opposite(), &slab) {
                changed.push(neighbor_coord);
            }
        }
    }

    changed.sort_by_key(|c| c.key());
    changed.dedup();
    changed
}

struct BoundaryCell {
    sky: u8,
    rgb: [u8; 3],
}

/// The single-cell-deep slab of `chunk` facing outward in direction `dir`,
/// indexed along the shared edge (`16 * WORLD_HEIGHT` cells).
fn boundary_slab(chunk: &Chunk, dir: Direction) -> Vec<BoundaryCell> {
    let mut slab = Vec::with_capacity((CHUNK_SIZE * WORLD_HEIGHT) as usize);
    match dir {
        Direction::East | Direction::West => {
            let edge = if dir == Direction::East { CHUNK_SIZE - 1 } else { 0 };
            for y in 0..WORLD_HEIGHT {
                for z in 0..CHUNK_SIZE {
                    slab.push(BoundaryCell {
                        sky: chunk.sky_light(edge, y, z),
                        rgb: chunk.block_light_rgb(edge, y, z),
                    });
                }
            }
        }
        Direction::South | Direction::North => {
            let edge = if dir == Direction::South { CHUNK_SIZE - 1 } else { 0 };
            for y in 0..WORLD_HEIGHT {
                for x in 0..CHUNK_SIZE {
                    slab.push(BoundaryCell {
                        sky: chunk.sky_light(x, y, edge),
                        rgb: chunk.block_light_rgb(x, y, edge),
                    });
                }
            }
        }
        _ => unreachable!(),
    }
    slab
}

/// Seeds `chunk`'s own boundary (the side facing back toward the slab's
/// source, i.e. `dir.opposite()` of how the slab was captured) from
/// `slab`, one step attenuated, then runs the bounded BFS from there.
/// Returns whether anything actually increased.
fn seed_slab_into(chunk: &mut Chunk, registry: &BlockRegistry, incoming_from: Direction, slab: &[BoundaryCell]) -> bool {
    let near_edge = match incoming_from {
        Direction::East => CHUNK_SIZE - 1,
        Direction::West => 0,
        Direction::South => CHUNK_SIZE - 1,
        Direction::North => 0,
        _ => unreachable!(),
    };
    let mut sky_seeds = Vec::new();
    let mut light_seeds = Vec::new();
    let mut changed = false;

    let is_x_edge = matches!(incoming_from, Direction::East | Direction::West);
    let mut i = 0usize;
    for y in 0..WORLD_HEIGHT {
        for t in 0..CHUNK_SIZE {
            let cell = &slab[i];
            i += 1;
            let (x, z) = if is_x_edge { (near_edge, t) } else { (t, near_edge) };

            let opacity = registry.sky_opacity(chunk.get_block(x, y, z));
            let incoming_sky = (cell.sky as i32 - 1 - opacity as i32).max(0) as u8;
            if incoming_sky > chunk.sky_light(x, y, z) {
                chunk.set_sky_light(x, y, z, incoming_sky);
                sky_seeds.push((x, y, z));
                changed = true;
            }

            let reduction = registry.light_reduction(chunk.get_block(x, y, z));
            let existing = chunk.block_light_rgb(x, y, z);
            let incoming_rgb = [
                (cell.rgb[0] as f32 / 255.0 * 0.8 * reduction * 255.0) as u8,
                (cell.rgb[1] as f32 / 255.0 * 0.8 * reduction * 255.0) as u8,
                (cell.rgb[2] as f32 / 255.0 * 0.8 * reduction * 255.0) as u8,
            ];
            if incoming_rgb.iter().zip(existing.iter()).any(|(a, b)| a > b) {
                let merged = [
                    incoming_rgb[0].max(existing[0]),
                    incoming_rgb[1].max(existing[1]),
                    incoming_rgb[2].max(existing[2]),
                ];
                chunk.set_block_light_rgb(x, y, z, merged);
                let unit = [merged[0] as f32 / 255.0, merged[1] as f32 / 255.0, merged[2] as f32 / 255.0];
                light_seeds.push((x, y, z, unit));
                changed = true;
            }
        }
    }

    if !sky_seeds.is_empty() {
        sky::propagate_sky_bfs(chunk, registry, &sky_seeds);
    }
    if !light_seeds.is_empty() {
        block_light::propagate_block_bfs(chunk, registry, &light_seeds);
    }
    changed
}
