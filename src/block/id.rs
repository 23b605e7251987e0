use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric id of a block kind, indexing the [`super::BlockRegistry`].
///
/// A byte-sized id, per the data model: id 0 is always air, and ids outside
/// the registry's range resolve to air rather than panicking anywhere a
/// `BlockId` is read back out of a chunk's block array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockId(pub u8);

unsafe impl bytemuck::Pod for BlockId {}
unsafe impl bytemuck::Zeroable for BlockId {}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const GRASS: BlockId = BlockId(3);
    pub const SAND: BlockId = BlockId(4);
    pub const WATER: BlockId = BlockId(5);
    pub const LEAVES: BlockId = BlockId(6);
    pub const WOOD: BlockId = BlockId(7);
    pub const GLASS: BlockId = BlockId(8);
    pub const COAL_ORE: BlockId = BlockId(9);
    pub const IRON_ORE: BlockId = BlockId(10);
    pub const GOLD_ORE: BlockId = BlockId(11);
    pub const DIAMOND_ORE: BlockId = BlockId(12);
    pub const TORCH: BlockId = BlockId(13);
    pub const BEDROCK: BlockId = BlockId(14);

    #[inline]
    pub const fn new(raw: u8) -> Self {
        BlockId(raw)
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockId::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::AIR => write!(f, "Air"),
            BlockId::STONE => write!(f, "Stone"),
            BlockId::DIRT => write!(f, "Dirt"),
            BlockId::GRASS => write!(f, "Grass"),
            BlockId::SAND => write!(f, "Sand"),
            BlockId::WATER => write!(f, "Water"),
            BlockId::LEAVES => write!(f, "Leaves"),
            BlockId::WOOD => write!(f, "Wood"),
            BlockId::GLASS => write!(f, "Glass"),
            BlockId::COAL_ORE => write!(f, "Coal Ore"),
            BlockId::IRON_ORE => write!(f, "Iron Ore"),
            BlockId::GOLD_ORE => write!(f, "Gold Ore"),
            BlockId::DIAMOND_ORE => write!(f, "Diamond Ore"),
            BlockId::TORCH => write!(f, "Torch"),
            BlockId::BEDROCK => write!(f, "Bedrock"),
            other => write!(f, "Block({})", other.0),
        }
    }
}
