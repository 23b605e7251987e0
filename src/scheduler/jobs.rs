//! Worker-pool job/result types shared by the generation and mesh stages.
//!
//! Generation and mesh jobs must not block the observer thread on a store
//! lock held for the whole job, so rayon-driven parallelism is paired with a
//! `crossbeam-channel` completion queue: workers `send` results, the observer
//! thread drains them with bounded `try_recv` loops instead of blocking on a
//! future.

use crate::chunk::{Chunk, ChunkCoord, LodLevel};
use crate::mesher::{MeshPair, RawMesh};

/// Outcome of one generation task.
pub struct GenCompletion {
    pub coord: ChunkCoord,
    pub chunk: Chunk,
    /// The LOD this chunk was generated/loaded for — decides whether step 1
    /// runs `seed_initial` + full mesh, or an LOD mesh job.
    pub target_lod: LodLevel,
}

/// Outcome of one mesh task: full (opaque+transparent) for LOD_0, or a
/// single opaque mesh for LOD_1..=LOD_3 — transparent geometry is only
/// rendered at LOD_0.
pub enum MeshPayload {
    Full(MeshPair),
    Lod(RawMesh),
}

pub struct MeshCompletion {
    pub coord: ChunkCoord,
    pub lod: LodLevel,
    pub payload: MeshPayload,
}

/// Builds a named, fixed-size rayon pool of daemon threads — rayon's own
/// pool threads already behave that way (they park on idle and are
/// reclaimed with the process, never joined by hand).
pub fn build_pool(threads: usize, name: &'static str) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("{name}-{i}"))
        .build()
        .unwrap_or_else(|err| panic!("failed to build {name} pool: {err}"))
}

pub const DEFAULT_GEN_WORKERS: usize = 4;
pub const DEFAULT_MESH_WORKERS: usize = 3;
