//! `generate_full` / `generate_simplified`: the two generator entry points,
//! running a 4-step density/surface/water/decoration pipeline over a
//! column-wise base height and surface block selection.

use crate::block::{BlockId, BlockRegistry};
use crate::chunk::Chunk;
use crate::constants::WORLD_HEIGHT;

use super::config::GenConfig;
use super::decoration::{chunk_rng, decorate};
use super::density::DensityLattice;
use super::noise::NoiseFields;

/// Full-detail generation: density, surface layering, water fill, and the
/// ore/tree decoration pass. Deterministic: the same `(seed, cx, cz,
/// config)` always yields byte-identical block data.
pub fn generate_full(cx: i32, cz: i32, config: &GenConfig, registry: &BlockRegistry) -> Chunk {
    let mut chunk = build_base_terrain(cx, cz, config);
    let mut rng = chunk_rng(config.seed, cx, cz);
    decorate(&mut chunk, &mut rng, config, registry);
    chunk
}

/// Simplified generation for LOD ≥ 2 chunks: density, surface, and water,
/// but no decoration pass, and shallower octave counts.
pub fn generate_simplified(cx: i32, cz: i32, config: &GenConfig) -> Chunk {
    let shallow = GenConfig {
        octaves_base: config.octaves_base.min(2).max(1),
        octaves_detail: 1,
        octaves_3d: 1,
        ..*config
    };
    build_base_terrain(cx, cz, &shallow)
}

fn build_base_terrain(cx: i32, cz: i32, config: &GenConfig) -> Chunk {
    let noise = NoiseFields::new(config);
    let lattice = DensityLattice::sample(&noise, config, cx, cz);
    let mut chunk = Chunk::new_empty();

    // Step 1 + density → solid/air.
    for x in 0..16 {
        for z in 0..16 {
            for y in 0..WORLD_HEIGHT {
                if lattice.is_solid(x, y, z) {
                    chunk.set_block(x, y, z, BlockId::STONE);
                }
            }
        }
    }

    // Step 2: surface layering per column.
    for x in 0..16 {
        for z in 0..16 {
            let Some(top) = topmost_solid(&chunk, x, z) else {
                continue;
            };
            let surface_is_underwater = top <= config.sea_level;
            let surface_block = if surface_is_underwater {
                BlockId::SAND
            } else {
                BlockId::GRASS
            };
            chunk.set_block(x, top, z, surface_block);
            for depth in 1..=3 {
                let y = top - depth;
                if y < 0 {
                    break;
                }
                chunk.set_block(x, y, z, BlockId::DIRT);
            }
        }
    }

    // Step 3: water fill for non-solid cells at or below sea level.
    for x in 0..16 {
        for z in 0..16 {
            for y in 0..=config.sea_level.min(WORLD_HEIGHT - 1) {
                if chunk.get_block(x, y, z).is_air() {
                    chunk.set_block(x, y, z, BlockId::WATER);
                }
            }
        }
    }

    // set_block marks `modified`, which is meaningless for freshly
    // generated chunks (nothing to persist yet — they match what
    // persistence would produce on first save).
    chunk.modified = false;
    chunk
}

fn topmost_solid(chunk: &Chunk, x: i32, z: i32) -> Option<i32> {
    (0..WORLD_HEIGHT).rev().find(|&y| chunk.get_block(x, y, z) == BlockId::STONE)
}
