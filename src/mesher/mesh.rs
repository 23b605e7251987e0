//! Face-culling vertex assembler: turns a [`Snapshot`] into [`RawMesh`]es.
//!
//! Iterate cells, test faces, push quads — generalized to three output
//! shapes: `mesh_full`, `mesh_lod`, `mesh_sections`.

use crate::block::{BlockId, BlockRegistry};
use crate::chunk::{ChunkView, LodLevel, SectionFlag};
use crate::constants::{block_index, CHUNK_SIZE, SECTIONS_PER_CHUNK, WORLD_HEIGHT};
use crate::direction::Direction;
use crate::snapshot::Snapshot;

use super::ambient::ambient_color;
use super::faces::{face_corners, face_texture_slot, should_emit_face};
use super::raw_mesh::{RawMesh, RawSectionMesh};
use super::vertex::Vertex11;

/// Paired opaque/transparent output of [`mesh_full`].
#[derive(Debug, Clone, Default)]
pub struct MeshPair {
    pub opaque: RawMesh,
    pub transparent: RawMesh,
}

const ATLAS_TILES: f32 = 16.0;

fn tile_uv(texture_index: u16, corner: [f32; 3], dir: Direction) -> [f32; 2] {
    // Corners are cube-local 0/1 coordinates; project onto the face plane
    // to get a 0..1 UV, then offset into the texture's horizontal atlas
    // slot. A single-row atlas keeps this independent of any image asset.
    let (u_local, v_local) = match dir {
        Direction::Up | Direction::Down => (corner[0], corner[2]),
        Direction::East | Direction::West => (corner[2], corner[1]),
        Direction::South | Direction::North => (corner[0], corner[1]),
    };
    let tile = texture_index as f32 / ATLAS_TILES;
    [tile + u_local / ATLAS_TILES, v_local]
}

/// Builds the four vertices for one outward face at world-local cell
/// `(lx, y, lz)` of the center chunk, sampling light at the face-adjacent
/// cell (falling back to the cell itself if that neighbor is unavailable).
#[allow(clippy::too_many_arguments)]
fn build_face_quad(
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
    lx: i32,
    y: i32,
    lz: i32,
    id: BlockId,
    dir: Direction,
    scale: f32,
) -> [Vertex11; 4] {
    let (dx, dy, dz) = dir.offset();
    let (nlx, ny, nlz) = (lx + dx, y + dy, lz + dz);

    let sample_pos = if snapshot.get_block(nlx, ny, nlz).is_air() {
        (nlx, ny, nlz)
    } else {
        (lx, y, lz)
    };
    let sky = snapshot.get_sky_visibility(sample_pos.0, sample_pos.1, sample_pos.2);
    let block_light = snapshot.get_block_light_scalar(sample_pos.0, sample_pos.1, sample_pos.2);
    let horizon_weight = sky;
    let indirect_base = ambient_color(time_of_day);
    let indirect = [
        indirect_base[0] * sky,
        indirect_base[1] * sky,
        indirect_base[2] * sky,
    ];

    let texture_index = registry.get_properties(id).face_textures[face_texture_slot(dir)];
    let corners = face_corners(dir);
    let mut quad = [Vertex11::new([0.0; 3], [0.0; 2], 0.0, 0.0, 0.0, [0.0; 3]); 4];
    for (i, corner) in corners.iter().enumerate() {
        let position = [
            (lx as f32 + corner[0] * scale),
            (y as f32 + corner[1] * scale),
            (lz as f32 + corner[2] * scale),
        ];
        let uv = tile_uv(texture_index, *corner, dir);
        quad[i] = Vertex11::new(position, uv, sky, block_light, horizon_weight, indirect);
    }
    quad
}

#[allow(clippy::too_many_arguments)]
fn push_face_if_needed(
    mesh_pair: &mut MeshPair,
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
    lx: i32,
    y: i32,
    lz: i32,
    id: BlockId,
    dir: Direction,
) {
    let (dx, dy, dz) = dir.offset();
    let neighbor = snapshot.get_block(lx + dx, y + dy, lz + dz);
    if !should_emit_face(registry, id, neighbor, dir) {
        return;
    }
    let quad = build_face_quad(snapshot, registry, time_of_day, lx, y, lz, id, dir, 1.0);
    if registry.is_transparent(id) {
        mesh_pair.transparent.push_quad(quad);
    } else {
        mesh_pair.opaque.push_quad(quad);
    }
}

fn push_cell_faces(
    mesh_pair: &mut MeshPair,
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
    lx: i32,
    y: i32,
    lz: i32,
    id: BlockId,
) {
    for dir in Direction::ALL {
        push_face_if_needed(mesh_pair, snapshot, registry, time_of_day, lx, y, lz, id, dir);
    }
}

/// Full-detail mesh: every non-air cell in the center chunk, all 6 faces
/// tested against the snapshot.
pub fn mesh_full(snapshot: &Snapshot, registry: &BlockRegistry, time_of_day: f32) -> MeshPair {
    let mut pair = MeshPair::default();
    let view = snapshot.center_view();
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..WORLD_HEIGHT {
                let id = view.blocks[block_index(x, y, z)];
                if id.is_air() {
                    continue;
                }
                push_cell_faces(&mut pair, snapshot, registry, time_of_day, x, y, z, id);
            }
        }
    }
    pair
}

/// LOD_1: section-grained early exit. EMPTY sections are skipped outright;
/// SOLID sections only test their 6 boundary cell-layers (interior cells of
/// a homogeneous section can never be exposed, since every interior
/// neighbor is solid too); MIXED sections fall back to the full per-cell
/// scan. Opaque-only: transparent geometry is never meshed above LOD_0.
pub fn mesh_lod(
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
    level: LodLevel,
) -> RawMesh {
    if level == LodLevel::Lod1 {
        return mesh_lod1(snapshot, registry, time_of_day);
    }
    mesh_downsampled(snapshot, registry, time_of_day, downsample_factor(level))
}

fn downsample_factor(level: LodLevel) -> i32 {
    match level {
        LodLevel::Lod0 | LodLevel::Lod1 => 1,
        LodLevel::Lod2 => 2,
        LodLevel::Lod3 => 4,
    }
}

fn mesh_lod1(snapshot: &Snapshot, registry: &BlockRegistry, time_of_day: f32) -> RawMesh {
    let mut pair = MeshPair::default();
    let view = snapshot.center_view();
    for section in 0..SECTIONS_PER_CHUNK {
        let flag = section_flag_of(view, registry, section);
        if flag == SectionFlag::Empty {
            continue;
        }
        let y0 = section as i32 * 16;
        let y1 = y0 + 15;
        if flag == SectionFlag::Mixed {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    for y in y0..=y1 {
                        let id = view.blocks[block_index(x, y, z)];
                        if id.is_air() {
                            continue;
                        }
                        push_cell_faces(&mut pair, snapshot, registry, time_of_day, x, y, z, id);
                    }
                }
            }
            continue;
        }
        // SOLID: interior cells can never be exposed (every interior
        // neighbor is solid too), so only the single outward direction of
        // each of the 6 boundary layers needs testing. Each cell is
        // visited once per direction to avoid double-emitting shared
        // edges/corners between layers.
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let bottom = view.blocks[block_index(x, y0, z)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, x, y0, z, bottom, Direction::Down,
                );
                let top = view.blocks[block_index(x, y1, z)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, x, y1, z, top, Direction::Up,
                );
            }
        }
        for y in y0..=y1 {
            for z in 0..CHUNK_SIZE {
                let west = view.blocks[block_index(0, y, z)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, 0, y, z, west, Direction::West,
                );
                let east = view.blocks[block_index(CHUNK_SIZE - 1, y, z)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, CHUNK_SIZE - 1, y, z, east,
                    Direction::East,
                );
            }
            for x in 0..CHUNK_SIZE {
                let north = view.blocks[block_index(x, y, 0)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, x, y, 0, north, Direction::North,
                );
                let south = view.blocks[block_index(x, y, CHUNK_SIZE - 1)];
                push_face_if_needed(
                    &mut pair, snapshot, registry, time_of_day, x, y, CHUNK_SIZE - 1, south,
                    Direction::South,
                );
            }
        }
    }
    pair.opaque
}

/// EMPTY iff every cell is `BlockId::AIR`; SOLID iff every cell is solid;
/// otherwise MIXED. A section of all water is non-air and non-solid, so it
/// falls out as MIXED rather than being mistaken for EMPTY.
fn section_flag_of(view: &ChunkView, registry: &BlockRegistry, section: usize) -> SectionFlag {
    let y0 = section as i32 * 16;
    let mut any_non_air = false;
    let mut all_solid = true;
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for dy in 0..16 {
                let id = view.blocks[block_index(x, y0 + dy, z)];
                if id.is_air() {
                    all_solid = false;
                } else {
                    any_non_air = true;
                    if !registry.is_solid(id) {
                        all_solid = false;
                    }
                }
            }
        }
    }
    if !any_non_air {
        SectionFlag::Empty
    } else if all_solid {
        SectionFlag::Solid
    } else {
        SectionFlag::Mixed
    }
}

/// Modal block id across a `factor`×`factor` (×`factor` vertically too) cell
/// aggregate, with averaged light, producing a downsampled block grid.
fn mesh_downsampled(
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
    factor: i32,
) -> RawMesh {
    let mut pair = MeshPair::default();
    let coarse_xy = CHUNK_SIZE / factor;
    let coarse_h = WORLD_HEIGHT / factor;

    for cx in 0..coarse_xy {
        for cz in 0..coarse_xy {
            for cy in 0..coarse_h {
                let (id, origin) = modal_cell(snapshot, cx, cy, cz, factor);
                if id.is_air() {
                    continue;
                }
                let transparent = registry.is_transparent(id);
                for dir in Direction::ALL {
                    let (dx, dy, dz) = dir.offset();
                    let neighbor_id = modal_neighbor(
                        snapshot,
                        cx + dx,
                        cy + dy,
                        cz + dz,
                        factor,
                        coarse_xy,
                        coarse_h,
                    );
                    if !should_emit_face(registry, id, neighbor_id, dir) {
                        continue;
                    }
                    let quad = build_face_quad(
                        snapshot,
                        registry,
                        time_of_day,
                        origin.0,
                        origin.1,
                        origin.2,
                        id,
                        dir,
                        factor as f32,
                    );
                    if transparent {
                        pair.transparent.push_quad(quad);
                    } else {
                        pair.opaque.push_quad(quad);
                    }
                }
            }
        }
    }
    pair.opaque
}

fn modal_cell(
    snapshot: &Snapshot,
    cx: i32,
    cy: i32,
    cz: i32,
    factor: i32,
) -> (BlockId, (i32, i32, i32)) {
    let view = snapshot.center_view();
    let mut counts: std::collections::HashMap<BlockId, u32> = std::collections::HashMap::new();
    let origin = (cx * factor, cy * factor, cz * factor);
    for dx in 0..factor {
        for dy in 0..factor {
            for dz in 0..factor {
                let (x, y, z) = (origin.0 + dx, origin.1 + dy, origin.2 + dz);
                if !(0..CHUNK_SIZE).contains(&x) || !(0..CHUNK_SIZE).contains(&z) {
                    continue;
                }
                if !(0..WORLD_HEIGHT).contains(&y) {
                    continue;
                }
                let id = view.blocks[block_index(x, y, z)];
                *counts.entry(id).or_insert(0) += 1;
            }
        }
    }
    let modal = counts
        .into_iter()
        .max_by_key(|(id, count)| (*count, std::cmp::Reverse(id.0)))
        .map(|(id, _)| id)
        .unwrap_or(BlockId::AIR);
    (modal, origin)
}

fn modal_neighbor(
    snapshot: &Snapshot,
    cx: i32,
    cy: i32,
    cz: i32,
    factor: i32,
    coarse_xy: i32,
    coarse_h: i32,
) -> BlockId {
    if (0..coarse_xy).contains(&cx) && (0..coarse_xy).contains(&cz) && (0..coarse_h).contains(&cy)
    {
        return modal_cell(snapshot, cx, cy, cz, factor).0;
    }
    // Out of this chunk's coarse grid: sample the snapshot at native
    // resolution for the representative corner, so chunk seams still
    // reflect the true neighbor rather than assuming open air.
    let native = (cx * factor, cy * factor, cz * factor);
    snapshot.get_block(native.0, native.1, native.2)
}

/// Partitions a full-detail mesh by section index, for sparse per-section
/// GPU buffers.
pub fn mesh_sections(
    snapshot: &Snapshot,
    registry: &BlockRegistry,
    time_of_day: f32,
) -> [RawSectionMesh; SECTIONS_PER_CHUNK] {
    let mut sections: [RawSectionMesh; SECTIONS_PER_CHUNK] = Default::default();
    let view = snapshot.center_view();
    for section in 0..SECTIONS_PER_CHUNK {
        sections[section].section_index = section;
        if section_flag_of(view, registry, section) == SectionFlag::Empty {
            continue;
        }
        let mut pair = MeshPair::default();
        let y0 = section as i32 * 16;
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in y0..y0 + 16 {
                    let id = view.blocks[block_index(x, y, z)];
                    if id.is_air() {
                        continue;
                    }
                    push_cell_faces(&mut pair, snapshot, registry, time_of_day, x, y, z, id);
                }
            }
        }
        sections[section].opaque = pair.opaque;
        sections[section].transparent = pair.transparent;
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, ChunkCoord, ChunkStore};

    fn snapshot_with_water_slab() -> (ChunkStore, ChunkCoord) {
        let store = ChunkStore::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_block(x, 60, z, BlockId::WATER);
                chunk.set_sky_light(x, 61, z, 15);
            }
        }
        store.insert(coord, chunk);
        (store, coord)
    }

    #[test]
    fn water_slab_emits_only_top_faces() {
        let (store, coord) = snapshot_with_water_slab();
        let snapshot = Snapshot::capture(&store, coord).unwrap();
        let registry = BlockRegistry::new();
        let pair = mesh_full(&snapshot, &registry, 0.5);
        assert!(pair.opaque.is_empty());
        assert_eq!(pair.transparent.vertices.len(), 16 * 16 * 4);
        assert_eq!(pair.transparent.indices.len(), 16 * 16 * 6);
    }

    #[test]
    fn water_filled_section_is_not_skipped_as_empty() {
        let store = ChunkStore::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new_empty();
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..16 {
                    chunk.set_block(x, y, z, BlockId::WATER);
                }
                chunk.set_sky_light(x, 16, z, 15);
            }
        }
        store.insert(coord, chunk);
        let snapshot = Snapshot::capture(&store, coord).unwrap();
        let registry = BlockRegistry::new();
        assert_eq!(
            section_flag_of(snapshot.center_view(), &registry, 0),
            SectionFlag::Mixed
        );
        let sections = mesh_sections(&snapshot, &registry, 0.5);
        assert_eq!(sections[0].transparent.vertices.len(), 16 * 16 * 4);
    }

    #[test]
    fn missing_center_chunk_cannot_be_meshed() {
        let store = ChunkStore::new();
        assert!(Snapshot::capture(&store, ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn solid_cube_emits_only_outer_shell() {
        let store = ChunkStore::new();
        let coord = ChunkCoord::new(1, 1);
        let mut chunk = Chunk::new_empty();
        for x in 0..16 {
            for y in 0..16 {
                for z in 0..16 {
                    chunk.set_block(x, y, z, BlockId::STONE);
                }
            }
        }
        store.insert(coord, chunk);
        let snapshot = Snapshot::capture(&store, coord).unwrap();
        let registry = BlockRegistry::new();
        let lod1 = mesh_lod(&snapshot, &registry, 0.5, LodLevel::Lod1);
        // 6 faces * 16*16 quads for the one fully-solid section's shell.
        assert_eq!(lod1.triangle_count(), 6 * 16 * 16 * 2);
    }
}
