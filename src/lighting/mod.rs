//! Sky-light and colored block-light propagation.
//!
//! Three store-level operations drive everything else in this module:
//! [`seed_initial`] (run once per freshly generated LOD_0 chunk),
//! [`on_block_placed`] and [`on_block_removed`] (incremental updates from
//! `set_block`). All three return the set of chunk coordinates whose
//! meshes must be rebuilt.

mod block;
mod edge;
mod scratch;
mod sky;

pub use edge::propagate_edge_light;

use crate::block::BlockRegistry;
use crate::chunk::{ChunkCoord, ChunkStore};
use crate::constants::WORLD_HEIGHT;

/// Runs the full initial-light pipeline for one freshly generated LOD_0
/// chunk: the sky column scan, the bounded sky BFS, the block-light
/// emitter pass, and edge bleed from any already-loaded cardinal
/// neighbors.
pub fn seed_initial(store: &ChunkStore, registry: &BlockRegistry, coord: ChunkCoord) -> Vec<ChunkCoord> {
    let Some(handle) = store.get_handle(coord) else {
        return Vec::new();
    };
    {
        let mut chunk = handle.write();
        sky::seed_columns(&mut chunk, registry);
        let seeds = sky::initial_seeds(&chunk, registry);
        sky::propagate_sky_bfs(&mut chunk, registry, &seeds);

        let emitter_seeds = block::emitter_seeds(&chunk, registry);
        block::propagate_block_bfs(&mut chunk, registry, &emitter_seeds);

        chunk.light_dirty = false;
        chunk.dirty = true;
    }

    let mut rebuild = vec![coord];
    rebuild.extend(edge::propagate_edge_light(store, registry, coord));
    dedup_coords(rebuild)
}

/// Incremental update after a block is placed at world coordinates
/// `(wx, wy, wz)`.
pub fn on_block_placed(
    store: &ChunkStore,
    registry: &BlockRegistry,
    wx: i32,
    wy: i32,
    wz: i32,
) -> Vec<ChunkCoord> {
    let coord = ChunkCoord::from_world_block(wx, wz);
    let Some(handle) = store.get_handle(coord) else {
        return Vec::new();
    };
    let (lx, lz) = crate::chunk::world_to_local(wx, wz);

    let mut rebuild = Vec::new();
    {
        let mut chunk = handle.write();
        let id = chunk.get_block(lx, wy, lz);
        let props = registry.get_properties(id);

        if props.solid && !props.transparent {
            // Opaque: clear sky light at and below the placed cell until
            // the next opaque block, then reseed BFS from its 6 neighbors.
            chunk.set_sky_light(lx, wy, lz, 0);
            let mut y = wy - 1;
            while y >= 0 {
                let below = chunk.get_block(lx, y, lz);
                let below_props = registry.get_properties(below);
                if below_props.solid && !below_props.transparent {
                    break;
                }
                if chunk.sky_light(lx, y, lz) == 0 {
                    break;
                }
                chunk.set_sky_light(lx, y, lz, 0);
                y -= 1;
            }
        } else {
            // Transparent/non-solid: recompute this column's level from
            // the top down, then seed BFS from the new value.
            recompute_column_from_top(&mut chunk, registry, lx, lz);
        }

        let neighbor_seeds = neighbor_seed_cells(lx, wy, lz);
        sky::propagate_sky_bfs(&mut chunk, registry, &neighbor_seeds);

        if let Some(rgb) = props.emission {
            let unit = [rgb[0] as f32 / 255.0, rgb[1] as f32 / 255.0, rgb[2] as f32 / 255.0];
            block::propagate_block_bfs(&mut chunk, registry, &[(lx, wy, lz, unit)]);
        }

        chunk.dirty = true;
        rebuild.push(coord);
    }

    for neighbor in edge_neighbors_if_on_border(coord, lx, lz) {
        mark_dirty_if_loaded(store, neighbor);
        rebuild.push(neighbor);
    }
    dedup_coords(rebuild)
}

/// Incremental update after a block is removed (set to air) at world
/// coordinates `(wx, wy, wz)`.
pub fn on_block_removed(
    store: &ChunkStore,
    registry: &BlockRegistry,
    wx: i32,
    wy: i32,
    wz: i32,
) -> Vec<ChunkCoord> {
    let coord = ChunkCoord::from_world_block(wx, wz);
    let Some(handle) = store.get_handle(coord) else {
        return Vec::new();
    };
    let (lx, lz) = crate::chunk::world_to_local(wx, wz);

    {
        let mut chunk = handle.write();
        recompute_column_from_top(&mut chunk, registry, lx, lz);
        let neighbor_seeds = neighbor_seed_cells(lx, wy, lz);
        sky::propagate_sky_bfs(&mut chunk, registry, &neighbor_seeds);
        chunk.dirty = true;
    }

    let mut rebuild = vec![coord];
    for neighbor in edge_neighbors_if_on_border(coord, lx, lz) {
        mark_dirty_if_loaded(store, neighbor);
        rebuild.push(neighbor);
    }
    dedup_coords(rebuild)
}

/// Flags a loaded neighbor chunk dirty without otherwise touching it — the
/// neighbor's own blocks/lights are untouched by an edit on the far side of
/// the shared boundary, but its mesh still needs rebuilding since the face
/// culling at that boundary may have changed.
fn mark_dirty_if_loaded(store: &ChunkStore, coord: ChunkCoord) {
    if let Some(handle) = store.get_handle(coord) {
        handle.write().dirty = true;
    }
}

/// Recomputes one column's sky-light register top-down, seeding the BFS
/// from every transition boundary along the way.
fn recompute_column_from_top(chunk: &mut crate::chunk::Chunk, registry: &BlockRegistry, lx: i32, lz: i32) {
    let mut level: i32 = 15;
    let mut seeds = Vec::new();
    for y in (0..WORLD_HEIGHT).rev() {
        let id = chunk.get_block(lx, y, lz);
        let props = registry.get_properties(id);
        let before = chunk.sky_light(lx, y, lz);
        if props.solid && !props.transparent {
            level = 0;
        } else {
            level = (level - props.sky_opacity as i32).max(0);
        }
        chunk.set_sky_light(lx, y, lz, level as u8);
        if level as u8 != before {
            seeds.push((lx, y, lz));
        }
    }
    sky::propagate_sky_bfs(chunk, registry, &seeds);
}

fn neighbor_seed_cells(lx: i32, y: i32, lz: i32) -> Vec<(i32, i32, i32)> {
    use crate::direction::Direction;
    Direction::ALL
        .iter()
        .map(|dir| {
            let (dx, dy, dz) = dir.offset();
            (lx + dx, y + dy, lz + dz)
        })
        .collect()
}

/// If the edited cell sits on a chunk edge, the neighbor on the far side
/// of that edge also needs remeshing: up to 4 neighbors can be affected by
/// one edit.
fn edge_neighbors_if_on_border(coord: ChunkCoord, lx: i32, lz: i32) -> Vec<ChunkCoord> {
    use crate::constants::CHUNK_SIZE;
    let mut extra = Vec::new();
    if lx == 0 {
        extra.push(coord.neighbor(-1, 0));
    }
    if lx == CHUNK_SIZE - 1 {
        extra.push(coord.neighbor(1, 0));
    }
    if lz == 0 {
        extra.push(coord.neighbor(0, -1));
    }
    if lz == CHUNK_SIZE - 1 {
        extra.push(coord.neighbor(0, 1));
    }
    extra
}

fn dedup_coords(mut coords: Vec<ChunkCoord>) -> Vec<ChunkCoord> {
    coords.sort_by_key(|c| c.key());
    coords.dedup();
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;
    use crate::chunk::Chunk;

    #[test]
    fn seed_initial_lights_open_chunk_and_marks_not_light_dirty() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        let coord = ChunkCoord::new(0, 0);
        store.insert(coord, Chunk::new_empty());

        let rebuild = seed_initial(&store, &registry, coord);
        assert!(rebuild.contains(&coord));

        let handle = store.get_handle(coord).unwrap();
        let chunk = handle.read();
        assert!(!chunk.light_dirty);
        assert_eq!(chunk.sky_light(0, WORLD_HEIGHT - 1, 0), 15);
    }

    #[test]
    fn placing_opaque_block_darkens_column_below() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        sky::seed_columns(&mut chunk, &registry);
        store.insert(coord, chunk);

        {
            let handle = store.get_handle(coord).unwrap();
            handle.write().set_block(5, 80, 5, BlockId::STONE);
        }
        let rebuild = on_block_placed(&store, &registry, 5, 80, 5);
        assert_eq!(rebuild, vec![coord]);

        let handle = store.get_handle(coord).unwrap();
        let chunk = handle.read();
        assert_eq!(chunk.sky_light(5, 80, 5), 0);
        assert_eq!(chunk.sky_light(5, 79, 5), 0);
    }

    #[test]
    fn placing_block_at_chunk_edge_schedules_neighbor_rebuild() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        chunk.set_block(0, 80, 5, BlockId::STONE);
        store.insert(coord, chunk);
        store.insert(ChunkCoord::new(-1, 0), Chunk::new_empty());

        let rebuild = on_block_placed(&store, &registry, 0, 80, 5);
        assert!(rebuild.contains(&coord));
        assert!(rebuild.contains(&ChunkCoord::new(-1, 0)));
    }

    #[test]
    fn placing_emitter_seeds_block_light() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        chunk.set_block(8, 64, 8, BlockId::TORCH);
        store.insert(coord, chunk);

        on_block_placed(&store, &registry, 8, 64, 8);

        let handle = store.get_handle(coord).unwrap();
        let chunk = handle.read();
        assert_eq!(chunk.block_light_rgb(8, 64, 8), registry.emission(BlockId::TORCH).unwrap());
    }

    #[test]
    fn removing_block_relights_the_column() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        chunk.set_block(5, 80, 5, BlockId::STONE);
        sky::seed_columns(&mut chunk, &registry);
        store.insert(coord, chunk);

        {
            let handle = store.get_handle(coord).unwrap();
            handle.write().set_block(5, 80, 5, BlockId::AIR);
        }
        on_block_removed(&store, &registry, 5, 80, 5);

        let handle = store.get_handle(coord).unwrap();
        let chunk = handle.read();
        assert_eq!(chunk.sky_light(5, 80, 5), 15);
    }

    #[test]
    fn missing_chunk_returns_no_rebuilds() {
        let store = ChunkStore::new();
        let registry = BlockRegistry::new();
        assert!(on_block_placed(&store, &registry, 100, 5, 100).is_empty());
        assert!(on_block_removed(&store, &registry, 100, 5, 100).is_empty());
    }
}
