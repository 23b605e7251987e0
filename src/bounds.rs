//! A chunk's world-space axis-aligned bounds and a frustum test against it.
//!
//! `iter_renderable()` says nothing about culling on its own, but a render
//! frontend pairing against this core needs *some* way to turn a chunk
//! coordinate into world bounds without re-deriving
//! `CHUNK_SIZE`/`WORLD_HEIGHT` arithmetic itself. The frustum test uses the
//! standard six-plane extraction from a view-projection matrix and a
//! farthest-corner test per plane.

use glam::{Mat4, Vec3, Vec4};

use crate::chunk::ChunkCoord;
use crate::constants::{CHUNK_SIZE, WORLD_HEIGHT};

/// World-space axis-aligned bounding box of one chunk column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ChunkBounds {
    pub fn of(coord: ChunkCoord) -> Self {
        let (ox, oz) = coord.origin_block();
        let min = Vec3::new(ox as f32, 0.0, oz as f32);
        let max = min + Vec3::new(CHUNK_SIZE as f32, WORLD_HEIGHT as f32, CHUNK_SIZE as f32);
        ChunkBounds { min, max }
    }
}

/// Six view-space clipping planes, extracted from a combined view-projection
/// matrix (Gribb/Hartmann plane extraction).
#[derive(Debug, Clone)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let m = view_proj.to_cols_array_2d();
        let mut planes = [
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]), // left
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]), // right
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]), // bottom
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]), // top
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]), // near
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]), // far
        ];
        for plane in &mut planes {
            let len = Vec3::new(plane.x, plane.y, plane.z).length();
            *plane /= len;
        }
        Frustum { planes }
    }

    /// Whether `bounds` is at least partially inside this frustum: for each
    /// plane, the AABB corner farthest along the plane's normal must not lie
    /// behind it.
    pub fn intersects(&self, bounds: &ChunkBounds) -> bool {
        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);
            let mut farthest = bounds.min;
            if normal.x > 0.0 {
                farthest.x = bounds.max.x;
            }
            if normal.y > 0.0 {
                farthest.y = bounds.max.y;
            }
            if normal.z > 0.0 {
                farthest.z = bounds.max.z;
            }
            if normal.dot(farthest) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }
}
