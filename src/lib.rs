//! A streaming voxel world core: chunk storage, deterministic procedural
//! generation, sky/block-light propagation, a face-culling mesher with LOD
//! support, and the scheduler that ties them into one per-frame update.
//!
//! This crate is a core, not an engine: it owns no window, no GPU context,
//! and no input handling. A host binary drives it by calling
//! [`scheduler::ChunkManager::update`] once per frame with an observer
//! position, reading back [`scheduler::ChunkManager::iter_renderable`] for
//! what to draw, and routing edits through
//! [`scheduler::ChunkManager::set_block`].

pub mod block;
pub mod bounds;
pub mod chunk;
pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod generation;
pub mod lighting;
pub mod lod;
pub mod mesher;
pub mod persistence;
pub mod scheduler;
pub mod snapshot;
