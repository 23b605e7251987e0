//! Coordinate-indexed deterministic noise fields.
//!
//! Three fractal-sum fields (`f_base`, `f_detail`, `f_3d`) built on
//! `noise::Fbm`, which wraps exactly the octave/persistence/lacunarity knobs
//! `GenConfig` exposes. Every field is a pure function of `(seed, x[, y], z)`
//! — no RNG state carried between samples, so the same coordinates always
//! produce the same value.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Seedable};

use super::config::GenConfig;

pub struct NoiseFields {
    base: Fbm<Perlin>,
    detail: Fbm<Perlin>,
    cave: Fbm<Perlin>,
    base_scale: f64,
    detail_scale: f64,
    cave_scale: f64,
}

impl NoiseFields {
    pub fn new(config: &GenConfig) -> Self {
        let seed = config.seed as u32;
        let base = Fbm::<Perlin>::new(seed)
            .set_octaves(config.octaves_base as usize)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        let detail = Fbm::<Perlin>::new(seed.wrapping_add(1))
            .set_octaves(config.octaves_detail as usize)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        let cave = Fbm::<Perlin>::new(seed.wrapping_add(2))
            .set_octaves(config.octaves_3d as usize)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        NoiseFields {
            base,
            detail,
            cave,
            base_scale: config.base_scale,
            detail_scale: config.detail_scale,
            cave_scale: config.cave_scale,
        }
    }

    /// `f_base(x, z)`: low spatial frequency, shapes continent-scale relief.
    pub fn f_base(&self, wx: f64, wz: f64) -> f64 {
        self.base.get([wx * self.base_scale, wz * self.base_scale])
    }

    /// `f_detail(x, z)`: high spatial frequency, adds surface roughness.
    pub fn f_detail(&self, wx: f64, wz: f64) -> f64 {
        self.detail.get([wx * self.detail_scale, wz * self.detail_scale])
    }

    /// `f_3d(x, y, z)`: 3D field carving overhangs/caves.
    pub fn f_3d(&self, wx: f64, wy: f64, wz: f64) -> f64 {
        self.cave
            .get([wx * self.cave_scale, wy * self.cave_scale, wz * self.cave_scale])
    }
}
