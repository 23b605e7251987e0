//! Density-field sampling on a coarse lattice, trilinearly upsampled.
//!
//! `D = f_base + f_detail + A·f_3d − B·y`, sampled on a coarse 4×8×4 lattice
//! per chunk and trilinearly interpolated to block resolution — evaluating
//! the noise fields once per lattice point instead of once per block is the
//! actual performance point of the lattice.

use crate::constants::{CHUNK_SIZE, WORLD_HEIGHT};

use super::config::GenConfig;
use super::noise::NoiseFields;

const LATTICE_X: i32 = 4;
const LATTICE_Y: i32 = 8;
const LATTICE_Z: i32 = 4;

/// Spacing (in blocks) between lattice samples along each axis.
const STEP_X: i32 = CHUNK_SIZE / LATTICE_X;
const STEP_Z: i32 = CHUNK_SIZE / LATTICE_Z;
const STEP_Y: i32 = WORLD_HEIGHT / LATTICE_Y;

pub struct DensityLattice {
    values: Vec<f64>,
}

impl DensityLattice {
    /// Samples the `(LATTICE_X+1) × (LATTICE_Y+1) × (LATTICE_Z+1)` lattice
    /// points needed to interpolate every block in chunk `(cx, cz)`.
    pub fn sample(noise: &NoiseFields, config: &GenConfig, cx: i32, cz: i32) -> Self {
        let (origin_x, origin_z) = (cx * CHUNK_SIZE, cz * CHUNK_SIZE);
        let dims = (LATTICE_X + 1, LATTICE_Y + 1, LATTICE_Z + 1);
        let mut values = Vec::with_capacity((dims.0 * dims.1 * dims.2) as usize);
        for lx in 0..dims.0 {
            let wx = (origin_x + lx * STEP_X) as f64;
            for ly in 0..dims.1 {
                let wy = (ly * STEP_Y) as f64;
                for lz in 0..dims.2 {
                    let wz = (origin_z + lz * STEP_Z) as f64;
                    let d = noise.f_base(wx, wz)
                        + noise.f_detail(wx, wz)
                        + config.cave_amplitude as f64 * noise.f_3d(wx, wy, wz)
                        - config.vertical_attenuation as f64 * wy;
                    values.push(d);
                }
            }
        }
        DensityLattice { values }
    }

    fn at(&self, lx: i32, ly: i32, lz: i32) -> f64 {
        let dims_y = LATTICE_Y + 1;
        let dims_z = LATTICE_Z + 1;
        let idx = (lx * dims_y * dims_z + ly * dims_z + lz) as usize;
        self.values[idx]
    }

    /// Trilinearly interpolated density at block-local `(x, y, z)`.
    pub fn density_at(&self, x: i32, y: i32, z: i32) -> f64 {
        let lx0 = x / STEP_X;
        let ly0 = y / STEP_Y;
        let lz0 = z / STEP_Z;
        let tx = (x % STEP_X) as f64 / STEP_X as f64;
        let ty = (y % STEP_Y) as f64 / STEP_Y as f64;
        let tz = (z % STEP_Z) as f64 / STEP_Z as f64;

        let c000 = self.at(lx0, ly0, lz0);
        let c100 = self.at(lx0 + 1, ly0, lz0);
        let c010 = self.at(lx0, ly0 + 1, lz0);
        let c110 = self.at(lx0 + 1, ly0 + 1, lz0);
        let c001 = self.at(lx0, ly0, lz0 + 1);
        let c101 = self.at(lx0 + 1, ly0, lz0 + 1);
        let c011 = self.at(lx0, ly0 + 1, lz0 + 1);
        let c111 = self.at(lx0 + 1, ly0 + 1, lz0 + 1);

        let c00 = lerp(c000, c100, tx);
        let c10 = lerp(c010, c110, tx);
        let c01 = lerp(c001, c101, tx);
        let c11 = lerp(c011, c111, tx);

        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);

        lerp(c0, c1, tz)
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.density_at(x, y, z) > 0.0
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
