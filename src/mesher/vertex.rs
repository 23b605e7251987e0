//! GPU-ready vertex layout.
//!
//! One fixed 11-float layout rather than bit-packed integers: fixing a
//! single canonical width with no unused fields is simpler than carrying
//! multiple runtime-detected formats forward for a handful of bytes saved.

use bytemuck::{Pod, Zeroable};

/// One vertex, laid out exactly as `[x, y, z, u, v, sky_visibility,
/// block_light_scalar, horizon_weight, indirect_r, indirect_g, indirect_b]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex11 {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub sky_visibility: f32,
    pub block_light_scalar: f32,
    pub horizon_weight: f32,
    pub indirect: [f32; 3],
}

pub const VERTEX_FLOATS: usize = 11;

impl Vertex11 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: [f32; 3],
        uv: [f32; 2],
        sky_visibility: f32,
        block_light_scalar: f32,
        horizon_weight: f32,
        indirect: [f32; 3],
    ) -> Self {
        Vertex11 {
            position,
            uv,
            sky_visibility,
            block_light_scalar,
            horizon_weight,
            indirect,
        }
    }

    pub fn to_floats(self) -> [f32; VERTEX_FLOATS] {
        [
            self.position[0],
            self.position[1],
            self.position[2],
            self.uv[0],
            self.uv[1],
            self.sky_visibility,
            self.block_light_scalar,
            self.horizon_weight,
            self.indirect[0],
            self.indirect[1],
            self.indirect[2],
        ]
    }

    /// Legacy 7-float layout: position, uv, sky_visibility,
    /// block_light_scalar. No horizon or indirect terms.
    pub fn to_floats_legacy7(self) -> [f32; 7] {
        [
            self.position[0],
            self.position[1],
            self.position[2],
            self.uv[0],
            self.uv[1],
            self.sky_visibility,
            self.block_light_scalar,
        ]
    }

    /// Legacy 8-float layout: adds `horizon_weight`, still no indirect terms.
    pub fn to_floats_legacy8(self) -> [f32; 8] {
        [
            self.position[0],
            self.position[1],
            self.position[2],
            self.uv[0],
            self.uv[1],
            self.sky_visibility,
            self.block_light_scalar,
            self.horizon_weight,
        ]
    }
}
