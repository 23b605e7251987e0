//! The immutable block catalog.
//!
//! No runtime registration API: this core has no plugin/mod-loading surface,
//! so the catalog is a plain static table built once and indexed by id.

use super::data::{BlockProperties, AIR, BLOCK_PROPERTIES};
use super::id::BlockId;

/// Looks up [`BlockProperties`] by [`BlockId`].
///
/// A thin wrapper around the static table rather than a `HashMap`: ids are
/// dense small integers, so direct indexing is both simpler and faster than
/// hashing. Out-of-range ids resolve to air's properties rather than
/// panicking, matching every other hot-path lookup in the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRegistry;

impl BlockRegistry {
    pub const fn new() -> Self {
        BlockRegistry
    }

    #[inline]
    pub fn get_properties(&self, id: BlockId) -> &'static BlockProperties {
        BLOCK_PROPERTIES.get(id.0 as usize).unwrap_or(&AIR)
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get_properties(id).solid
    }

    #[inline]
    pub fn is_transparent(&self, id: BlockId) -> bool {
        self.get_properties(id).transparent
    }

    #[inline]
    pub fn sky_opacity(&self, id: BlockId) -> u8 {
        self.get_properties(id).sky_opacity
    }

    #[inline]
    pub fn light_reduction(&self, id: BlockId) -> f32 {
        self.get_properties(id).light_reduction
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> Option<[u8; 3]> {
        self.get_properties(id).emission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_not_solid_and_not_emissive() {
        let reg = BlockRegistry::new();
        let props = reg.get_properties(BlockId::AIR);
        assert!(!props.solid);
        assert!(props.emission.is_none());
    }

    #[test]
    fn out_of_range_id_resolves_to_air_not_panic() {
        let reg = BlockRegistry::new();
        let props = reg.get_properties(BlockId::new(255));
        assert_eq!(props.name, "Air");
    }

    #[test]
    fn torch_emits_warm_light() {
        let reg = BlockRegistry::new();
        let emission = reg.emission(BlockId::TORCH).unwrap();
        assert_eq!(emission, [255, 204, 128]);
    }

    #[test]
    fn water_reduces_sky_light_and_block_light() {
        let reg = BlockRegistry::new();
        assert_eq!(reg.sky_opacity(BlockId::WATER), 3);
        assert!(reg.light_reduction(BlockId::WATER) < 1.0);
    }
}
