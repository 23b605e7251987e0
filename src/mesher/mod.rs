//! Face culling and vertex assembly: turns a [`crate::snapshot::Snapshot`]
//! into GPU-ready [`RawMesh`] blobs, pure over its input and safe to run
//! concurrently across chunks with no coordination.

mod ambient;
mod faces;
mod mesh;
mod raw_mesh;
mod vertex;

pub use mesh::{mesh_full, mesh_lod, mesh_sections, MeshPair};
pub use raw_mesh::{RawMesh, RawSectionMesh};
pub use vertex::{Vertex11, VERTEX_FLOATS};
