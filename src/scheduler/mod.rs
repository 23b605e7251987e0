//! The streaming scheduler: job/result plumbing plus the `ChunkManager` that
//! drives generation, lighting, meshing, LOD and eviction from one
//! per-frame `update` call.

mod jobs;
mod manager;

pub use manager::{ChunkManager, RenderableChunk};
