//! Seeded decoration pass: ore sprinkling and tree placement.
//!
//! Deterministic per `(seed, cx, cz)`, with no global RNG state shared
//! between chunks: each chunk gets its own `ChaCha8Rng` seeded from a combine
//! of the world seed and its coordinate, rather than a single RNG threaded
//! across the whole world (which would make chunk generation order-
//! dependent).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::block::BlockId;
use crate::chunk::Chunk;
use crate::constants::WORLD_HEIGHT;

use super::config::GenConfig;

/// Deterministic per-chunk seed via splitmix64-style bit mixing. Pure
/// function of its inputs — never reads or advances any shared RNG.
fn chunk_seed(world_seed: i64, cx: i32, cz: i32) -> u64 {
    let mut z = (world_seed as u64)
        ^ ((cx as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        ^ ((cz as u32 as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn chunk_rng(world_seed: i64, cx: i32, cz: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(chunk_seed(world_seed, cx, cz))
}

const ORE_BANDS: [(BlockId, i32, i32); 4] = [
    (BlockId::COAL_ORE, 5, 90),
    (BlockId::IRON_ORE, 5, 60),
    (BlockId::GOLD_ORE, 5, 32),
    (BlockId::DIAMOND_ORE, 5, 16),
];

/// Sprinkles ore veins per y-band and plants trees on eligible grass
/// columns. Only ever called for the full (LOD_0) generation variant.
pub fn decorate(chunk: &mut Chunk, rng: &mut ChaCha8Rng, config: &GenConfig, registry: &crate::block::BlockRegistry) {
    sprinkle_ores(chunk, rng, config);
    plant_trees(chunk, rng, config, registry);
    if config.bonus_chest {
        // A bonus chest is a gameplay feature the core does not model
        // (no entity/inventory system in scope); recorded as a marker
        // block so a host can special-case it if it wants to.
        chunk.set_block(8, WORLD_HEIGHT.min(80), 8, BlockId::GLASS);
    }
}

fn sprinkle_ores(chunk: &mut Chunk, rng: &mut ChaCha8Rng, config: &GenConfig) {
    for (ore, y_min, y_max) in ORE_BANDS {
        for x in 0..16 {
            for z in 0..16 {
                for y in y_min..y_max {
                    if chunk.get_block(x, y, z) != BlockId::STONE {
                        continue;
                    }
                    if rng.gen::<f32>() < config.ore_density * 0.01 {
                        chunk.set_block(x, y, z, ore);
                    }
                }
            }
        }
    }
}

fn plant_trees(
    chunk: &mut Chunk,
    rng: &mut ChaCha8Rng,
    config: &GenConfig,
    registry: &crate::block::BlockRegistry,
) {
    for x in 2..14 {
        for z in 2..14 {
            let height = chunk.height_at(x, z, registry);
            if height < 0 || height + 6 >= WORLD_HEIGHT {
                continue;
            }
            let y = height as i32;
            if chunk.get_block(x, y, z) != BlockId::GRASS {
                continue;
            }
            if rng.gen::<f32>() >= config.tree_density {
                continue;
            }
            plant_one_tree(chunk, x, y, z);
        }
    }
}

fn plant_one_tree(chunk: &mut Chunk, x: i32, y: i32, z: i32) {
    for dy in 1..=4 {
        chunk.set_block(x, y + dy, z, BlockId::WOOD);
    }
    for dx in -2..=2 {
        for dz in -2..=2 {
            for dy in 3..=5 {
                if dx == 0 && dz == 0 && dy < 5 {
                    continue;
                }
                let (lx, lz) = (x + dx, z + dz);
                if !(0..16).contains(&lx) || !(0..16).contains(&lz) {
                    continue;
                }
                if chunk.get_block(lx, y + dy, lz).is_air() {
                    chunk.set_block(lx, y + dy, lz, BlockId::LEAVES);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_seed_is_deterministic() {
        assert_eq!(chunk_seed(42, 3, -7), chunk_seed(42, 3, -7));
    }

    #[test]
    fn neighboring_chunks_get_different_seeds() {
        assert_ne!(chunk_seed(42, 3, -7), chunk_seed(42, 4, -7));
    }

    #[test]
    fn same_seed_produces_identical_rng_stream() {
        let mut a = chunk_rng(1, 2, 3);
        let mut b = chunk_rng(1, 2, 3);
        let sample_a: f32 = a.gen();
        let sample_b: f32 = b.gen();
        assert_eq!(sample_a, sample_b);
    }
}
