//! Face-culling rule and per-face geometry tables.

use crate::block::{BlockId, BlockRegistry};
use crate::direction::Direction;

/// Whether a face between `current` (non-air, in the center chunk) and
/// `neighbor`, facing `dir`, should be emitted.
///
/// A face is emitted iff the neighbor is air, or the neighbor is non-opaque
/// transparent and either the ids differ or the current block is opaque.
/// This is what rules out internal water-water faces while still drawing
/// the boundary between water and glass, say.
///
/// Liquids are a further special case against air: a liquid only shows its
/// top surface, never its underside or sides, so a liquid-against-air face
/// is emitted only for `Direction::Up`.
pub fn should_emit_face(registry: &BlockRegistry, current: BlockId, neighbor: BlockId, dir: Direction) -> bool {
    if neighbor.is_air() {
        let current_props = registry.get_properties(current);
        return !current_props.liquid || dir == Direction::Up;
    }
    let neighbor_props = registry.get_properties(neighbor);
    if !neighbor_props.transparent {
        return false;
    }
    let current_props = registry.get_properties(current);
    neighbor != current || !current_props.transparent
}

/// Unit offsets for the four corners of a face quad, CCW when viewed from
/// outside the block, in local cell-corner coordinates (0 or 1 per axis).
/// Matches the vertex order the index buffer assumes: `(0,1,2)`, `(0,2,3)`.
pub fn face_corners(dir: Direction) -> [[f32; 3]; 4] {
    match dir {
        Direction::Up => [
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
        ],
        Direction::Down => [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        Direction::East => [
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 1.0],
        ],
        Direction::West => [
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ],
        Direction::South => [
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        Direction::North => [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        ],
    }
}

/// Face index into [`crate::block::BlockProperties::face_textures`],
/// order `+Y, -Y, +X, -X, +Z, -Z`.
pub fn face_texture_slot(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::East => 2,
        Direction::West => 3,
        Direction::South => 4,
        Direction::North => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_neighbor_always_emits() {
        let reg = BlockRegistry::new();
        assert!(should_emit_face(&reg, BlockId::STONE, BlockId::AIR, Direction::Up));
    }

    #[test]
    fn opaque_neighbor_never_emits() {
        let reg = BlockRegistry::new();
        assert!(!should_emit_face(&reg, BlockId::STONE, BlockId::DIRT, Direction::Up));
    }

    #[test]
    fn water_to_water_does_not_emit() {
        let reg = BlockRegistry::new();
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::WATER, Direction::Up));
    }

    #[test]
    fn water_to_glass_emits_once() {
        let reg = BlockRegistry::new();
        assert!(should_emit_face(&reg, BlockId::WATER, BlockId::GLASS, Direction::East));
    }

    #[test]
    fn opaque_against_transparent_emits() {
        let reg = BlockRegistry::new();
        assert!(should_emit_face(&reg, BlockId::STONE, BlockId::WATER, Direction::Up));
    }

    #[test]
    fn water_against_air_emits_only_upward() {
        let reg = BlockRegistry::new();
        assert!(should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::Up));
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::Down));
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::East));
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::West));
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::North));
        assert!(!should_emit_face(&reg, BlockId::WATER, BlockId::AIR, Direction::South));
    }
}
