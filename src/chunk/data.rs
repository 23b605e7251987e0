//! The `Chunk` cell: blocks, light fields, and per-LOD mesh slots.

use parking_lot::Mutex;

use crate::block::BlockId;
use crate::constants::{
    block_index, column_index, section_index, CHUNK_COLUMNS, CHUNK_VOLUME, SECTIONS_PER_CHUNK,
    WORLD_HEIGHT,
};
use crate::mesher::RawMesh;

/// One of the four detail tiers a chunk's mesh may be built at.
///
/// Ordered finest-to-coarsest so `level as u8` doubles as the numeric LOD
/// used throughout distance-band comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LodLevel {
    Lod0 = 0,
    Lod1 = 1,
    Lod2 = 2,
    Lod3 = 3,
}

impl LodLevel {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => LodLevel::Lod0,
            1 => LodLevel::Lod1,
            2 => LodLevel::Lod2,
            _ => LodLevel::Lod3,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Occupancy summary of a 16³ section, recomputed lazily and invalidated on
/// any block write inside the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFlag {
    Empty,
    Mixed,
    Solid,
}

/// One mesh slot: the result of the most recent successful mesh build for a
/// given pass/LOD, or `None` if none has been produced yet.
#[derive(Debug, Default, Clone)]
pub struct MeshSlots {
    pub full_opaque: Option<RawMesh>,
    pub full_transparent: Option<RawMesh>,
    pub lod: [Option<RawMesh>; 4],
}

/// Lazily-computed, per-chunk caches guarded by a single lock with
/// double-checked publication (spec §5: "guarded by a per-chunk lock with
/// double-checked publication").
#[derive(Debug, Clone)]
struct Caches {
    heightmap: Option<[i16; CHUNK_COLUMNS]>,
    section_flags: Option<[SectionFlag; SECTIONS_PER_CHUNK]>,
}

impl Default for Caches {
    fn default() -> Self {
        Caches {
            heightmap: None,
            section_flags: None,
        }
    }
}

/// A 16×16×128 cell of the world: the unit of load/unload/mesh.
///
/// Carries RGB block light, section flags, and a heightmap cache alongside
/// the block grid, so a fully populated chunk needs no side lookup to answer
/// a light or visibility query.
pub struct Chunk {
    pub blocks: Vec<BlockId>,
    /// High nibble: sky light 0-15. Low nibble: scalar block light 0-15,
    /// kept for simple single-channel light queries.
    pub light_packed: Vec<u8>,
    pub block_light_r: Vec<u8>,
    pub block_light_g: Vec<u8>,
    pub block_light_b: Vec<u8>,

    caches: Mutex<Caches>,

    pub mesh_slots: MeshSlots,
    pub current_lod: LodLevel,

    pub modified: bool,
    pub dirty: bool,
    pub light_dirty: bool,
}

impl Chunk {
    pub fn new_empty() -> Self {
        Chunk {
            blocks: vec![BlockId::AIR; CHUNK_VOLUME],
            light_packed: vec![0u8; CHUNK_VOLUME],
            block_light_r: vec![0u8; CHUNK_VOLUME],
            block_light_g: vec![0u8; CHUNK_VOLUME],
            block_light_b: vec![0u8; CHUNK_VOLUME],
            caches: Mutex::new(Caches::default()),
            mesh_slots: MeshSlots::default(),
            current_lod: LodLevel::Lod0,
            modified: false,
            dirty: true,
            light_dirty: true,
        }
    }

    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        if y < 0 {
            return BlockId::AIR;
        }
        if y >= WORLD_HEIGHT {
            return BlockId::AIR;
        }
        self.blocks[block_index(x, y, z)]
    }

    /// Writes a block and invalidates everything downstream of it. Does not
    /// touch lighting or meshing — callers (the scheduler's `set_block`,
    /// or the generator while building a fresh chunk) are responsible for
    /// following up.
    #[inline]
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        self.blocks[block_index(x, y, z)] = id;
        self.modified = true;
        self.dirty = true;
        self.invalidate_caches();
    }

    #[inline]
    pub fn sky_light(&self, x: i32, y: i32, z: i32) -> u8 {
        if y < 0 {
            return 0;
        }
        if y >= WORLD_HEIGHT {
            return 15;
        }
        self.light_packed[block_index(x, y, z)] >> 4
    }

    #[inline]
    pub fn set_sky_light(&mut self, x: i32, y: i32, z: i32, level: u8) {
        let idx = block_index(x, y, z);
        let low = self.light_packed[idx] & 0x0F;
        self.light_packed[idx] = (level.min(15) << 4) | low;
    }

    #[inline]
    pub fn block_light_scalar(&self, x: i32, y: i32, z: i32) -> u8 {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return 0;
        }
        self.light_packed[block_index(x, y, z)] & 0x0F
    }

    #[inline]
    pub fn set_block_light_scalar(&mut self, x: i32, y: i32, z: i32, level: u8) {
        let idx = block_index(x, y, z);
        let high = self.light_packed[idx] & 0xF0;
        self.light_packed[idx] = high | level.min(15);
    }

    #[inline]
    pub fn block_light_rgb(&self, x: i32, y: i32, z: i32) -> [u8; 3] {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return [0, 0, 0];
        }
        let idx = block_index(x, y, z);
        [
            self.block_light_r[idx],
            self.block_light_g[idx],
            self.block_light_b[idx],
        ]
    }

    #[inline]
    pub fn set_block_light_rgb(&mut self, x: i32, y: i32, z: i32, rgb: [u8; 3]) {
        let idx = block_index(x, y, z);
        self.block_light_r[idx] = rgb[0];
        self.block_light_g[idx] = rgb[1];
        self.block_light_b[idx] = rgb[2];
    }

    fn invalidate_caches(&self) {
        let mut caches = self.caches.lock();
        caches.heightmap = None;
        caches.section_flags = None;
    }

    /// Highest opaque-solid `y` in column `(x, z)`, or `-1` if the column is
    /// empty. Computed lazily and cached until the next write.
    pub fn height_at(&self, x: i32, z: i32, registry: &crate::block::BlockRegistry) -> i16 {
        {
            let caches = self.caches.lock();
            if let Some(map) = &caches.heightmap {
                return map[column_index(x, z)];
            }
        }
        let map = self.compute_heightmap(registry);
        let value = map[column_index(x, z)];
        let mut caches = self.caches.lock();
        if caches.heightmap.is_none() {
            caches.heightmap = Some(map);
        }
        value
    }

    fn compute_heightmap(&self, registry: &crate::block::BlockRegistry) -> [i16; CHUNK_COLUMNS] {
        let mut map = [-1i16; CHUNK_COLUMNS];
        for x in 0..16 {
            for z in 0..16 {
                for y in (0..WORLD_HEIGHT).rev() {
                    let id = self.blocks[block_index(x, y, z)];
                    let props = registry.get_properties(id);
                    if props.solid && !props.transparent {
                        map[column_index(x, z)] = y as i16;
                        break;
                    }
                }
            }
        }
        map
    }

    /// Per-section EMPTY/MIXED/SOLID classification, lazily computed.
    pub fn section_flags(
        &self,
        registry: &crate::block::BlockRegistry,
    ) -> [SectionFlag; SECTIONS_PER_CHUNK] {
        {
            let caches = self.caches.lock();
            if let Some(flags) = &caches.section_flags {
                return *flags;
            }
        }
        let flags = self.compute_section_flags(registry);
        let mut caches = self.caches.lock();
        if caches.section_flags.is_none() {
            caches.section_flags = Some(flags);
        }
        flags
    }

    /// EMPTY iff every cell in the section is `BlockId::AIR`; SOLID iff
    /// every cell is solid (by `registry.is_solid`); otherwise MIXED. A
    /// section that is all non-air but non-solid (e.g. all water) is
    /// MIXED, not EMPTY — classification is on air-ness for EMPTY and on
    /// solidity for SOLID, not one flag standing in for the other.
    fn compute_section_flags(
        &self,
        registry: &crate::block::BlockRegistry,
    ) -> [SectionFlag; SECTIONS_PER_CHUNK] {
        let mut flags = [SectionFlag::Empty; SECTIONS_PER_CHUNK];
        for section in 0..SECTIONS_PER_CHUNK {
            let y0 = section as i32 * 16;
            let mut any_non_air = false;
            let mut all_solid = true;
            'scan: for x in 0..16 {
                for z in 0..16 {
                    for dy in 0..16 {
                        let y = y0 + dy;
                        let id = self.blocks[block_index(x, y, z)];
                        if id.is_air() {
                            all_solid = false;
                        } else {
                            any_non_air = true;
                            if !registry.is_solid(id) {
                                all_solid = false;
                            }
                        }
                        if any_non_air && !all_solid {
                            break 'scan;
                        }
                    }
                }
            }
            flags[section] = if !any_non_air {
                SectionFlag::Empty
            } else if all_solid {
                SectionFlag::Solid
            } else {
                SectionFlag::Mixed
            };
        }
        flags
    }
}

/// A cheaply-clonable copy of one chunk's block and light arrays, taken
/// under a brief read lock and then held independent of the chunk itself.
///
/// This is what [`crate::snapshot::Snapshot`] actually stores: per spec §9
/// ("owned references that outlive the lock via reference counting"), a
/// mesh job must not hold a live lock on the chunk for its whole lifetime,
/// so capture copies the arrays once instead.
#[derive(Debug, Clone)]
pub struct ChunkView {
    pub blocks: Vec<BlockId>,
    pub light_packed: Vec<u8>,
    pub block_light_r: Vec<u8>,
    pub block_light_g: Vec<u8>,
    pub block_light_b: Vec<u8>,
}

impl ChunkView {
    #[inline]
    pub fn sky_light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.light_packed[block_index(x, y, z)] >> 4
    }

    #[inline]
    pub fn block_light_scalar(&self, x: i32, y: i32, z: i32) -> u8 {
        self.light_packed[block_index(x, y, z)] & 0x0F
    }

    #[inline]
    pub fn block_light_rgb(&self, x: i32, y: i32, z: i32) -> [u8; 3] {
        let idx = block_index(x, y, z);
        [self.block_light_r[idx], self.block_light_g[idx], self.block_light_b[idx]]
    }
}

impl Chunk {
    pub fn to_view(&self) -> ChunkView {
        ChunkView {
            blocks: self.blocks.clone(),
            light_packed: self.light_packed.clone(),
            block_light_r: self.block_light_r.clone(),
            block_light_g: self.block_light_g.clone(),
            block_light_b: self.block_light_b.clone(),
        }
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("current_lod", &self.current_lod)
            .field("modified", &self.modified)
            .field("dirty", &self.dirty)
            .field("light_dirty", &self.light_dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRegistry;

    #[test]
    fn fresh_chunk_is_all_air_and_light_dirty() {
        let chunk = Chunk::new_empty();
        assert!(chunk.light_dirty);
        assert_eq!(chunk.get_block(0, 0, 0), BlockId::AIR);
    }

    #[test]
    fn set_block_marks_modified_and_dirty() {
        let mut chunk = Chunk::new_empty();
        chunk.set_block(1, 2, 3, BlockId::STONE);
        assert!(chunk.modified);
        assert!(chunk.dirty);
        assert_eq!(chunk.get_block(1, 2, 3), BlockId::STONE);
    }

    #[test]
    fn empty_chunk_has_no_height_and_all_sections_empty() {
        let chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        assert_eq!(chunk.height_at(0, 0, &registry), -1);
        assert!(chunk
            .section_flags(&registry)
            .iter()
            .all(|f| *f == SectionFlag::Empty));
    }

    #[test]
    fn out_of_world_y_resolves_to_documented_defaults() {
        let chunk = Chunk::new_empty();
        assert_eq!(chunk.sky_light(0, -1, 0), 0);
        assert_eq!(chunk.sky_light(0, WORLD_HEIGHT, 0), 15);
        assert_eq!(chunk.block_light_rgb(0, -1, 0), [0, 0, 0]);
    }

    #[test]
    fn solid_floor_gives_solid_section_and_correct_height() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..16 {
                    chunk.set_block(x, y, z, BlockId::STONE);
                }
            }
        }
        assert_eq!(chunk.height_at(5, 5, &registry), 15);
        assert_eq!(chunk.section_flags(&registry)[0], SectionFlag::Solid);
        assert_eq!(chunk.section_flags(&registry)[1], SectionFlag::Empty);
    }

    #[test]
    fn water_filled_section_is_mixed_not_empty() {
        let mut chunk = Chunk::new_empty();
        let registry = BlockRegistry::new();
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..16 {
                    chunk.set_block(x, y, z, BlockId::WATER);
                }
            }
        }
        assert_eq!(chunk.section_flags(&registry)[0], SectionFlag::Mixed);
    }
}
