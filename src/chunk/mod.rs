//! The chunk: its coordinate system, cell data, and the concurrent store
//! that owns all loaded chunks.

mod coord;
mod data;
mod store;

pub use coord::{world_to_local, ChunkCoord};
pub use data::{Chunk, ChunkView, LodLevel, MeshSlots, SectionFlag};
pub use store::{ChunkStore, StoreStats};
