//! The streaming scheduler: the one piece that owns an observer-thread
//! update loop and drives generation, lighting, meshing and eviction in one
//! fixed ordering per frame.
//!
//! Each frame drains completions before requesting new work, single-threaded:
//! generation completions, then mesh uploads, dirty-mesh rebuilds, LOD
//! reassessment, and (only on observer chunk change) unload/hard-cap
//! enforcement, each bounded by its own frame budget from
//! [`crate::lod::FrameBudgets`].

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use dashmap::DashSet;

use crate::block::{BlockId, BlockRegistry};
use crate::chunk::{world_to_local, Chunk, ChunkCoord, ChunkStore, LodLevel};
use crate::config::RuntimeConfig;
use crate::generation::{generate_full, generate_simplified, GenConfig};
use crate::lighting;
use crate::lod::{self, FrameBudgets, LodBands};
use crate::mesher::{mesh_full, mesh_lod};
use crate::persistence::PersistenceAdapter;

use super::jobs::{build_pool, GenCompletion, MeshCompletion, MeshPayload, DEFAULT_GEN_WORKERS, DEFAULT_MESH_WORKERS};

/// One chunk the observer/render side should currently draw, at the LOD its
/// mesh slot was last populated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableChunk {
    pub coord: ChunkCoord,
    pub lod: LodLevel,
}

/// Owns the chunk store, the generation and mesh worker pools, and every
/// piece of scheduler-private bookkeeping. `update` is the only entry point
/// a host calls once per frame; `set_block` is the only entry point for
/// edits.
pub struct ChunkManager {
    store: ChunkStore,
    registry: BlockRegistry,
    persistence: Arc<dyn PersistenceAdapter>,
    gen_config: GenConfig,
    bands: LodBands,
    budgets: FrameBudgets,
    time_of_day: f32,

    gen_pool: rayon::ThreadPool,
    mesh_pool: rayon::ThreadPool,

    gen_tx: Sender<GenCompletion>,
    gen_rx: Receiver<GenCompletion>,
    mesh_tx: Sender<MeshCompletion>,
    mesh_rx: Receiver<MeshCompletion>,

    // Coordinates with a generation job submitted but not yet completed.
    pending_gen: Arc<DashSet<u64>>,
    // Pending-gen coordinates an observer move has made stale; consumed by
    // the job itself at the top of its closure. Cancellation is cooperative,
    // not preemptive — a job already past this check runs to completion.
    cancelled_gen: Arc<DashSet<u64>>,
    // Coordinates with a mesh job in flight, keyed to prevent duplicate
    // submission of the same chunk before its result comes back.
    meshing_in_progress: Arc<DashSet<u64>>,

    observer_chunk: Option<ChunkCoord>,
}

impl ChunkManager {
    pub fn new(config: &RuntimeConfig, persistence: Arc<dyn PersistenceAdapter>) -> Self {
        let bands = LodBands::from_config(
            config.render_distance_chunks,
            config.lod_threshold_chunks,
            config.max_render_distance_chunks,
        );
        let (gen_tx, gen_rx) = unbounded();
        let (mesh_tx, mesh_rx) = unbounded();

        ChunkManager {
            store: ChunkStore::new(),
            registry: BlockRegistry::new(),
            persistence,
            gen_config: config.resolve_gen_config(),
            bands,
            budgets: FrameBudgets::default(),
            time_of_day: 0.5,

            gen_pool: build_pool(DEFAULT_GEN_WORKERS, "voxelstream-gen"),
            mesh_pool: build_pool(DEFAULT_MESH_WORKERS, "voxelstream-mesh"),

            gen_tx,
            gen_rx,
            mesh_tx,
            mesh_rx,

            pending_gen: Arc::new(DashSet::new()),
            cancelled_gen: Arc::new(DashSet::new()),
            meshing_in_progress: Arc::new(DashSet::new()),

            observer_chunk: None,
        }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn set_time_of_day(&mut self, time_of_day: f32) {
        self.time_of_day = time_of_day.clamp(0.0, 1.0);
    }

    /// Runs one scheduler frame in fixed order: drain generation
    /// completions, drain mesh uploads, rebuild dirty meshes, reassess LOD,
    /// then — only on a chunk change — unload/cancel/evict, and finally
    /// always request new chunks.
    pub fn update(&mut self, observer_position: (f32, f32, f32)) {
        let observer = ChunkCoord::from_world_block(
            observer_position.0.floor() as i32,
            observer_position.2.floor() as i32,
        );
        let chunk_changed = self.observer_chunk != Some(observer);

        self.drain_generation_completions();
        self.drain_mesh_uploads(observer);
        self.rebuild_dirty_meshes();
        self.reassess_lod(observer);

        if chunk_changed {
            self.unload_far_chunks(observer);
            self.cancel_stale_pending(observer);
            self.enforce_hard_cap(observer);
        }
        self.request_new_chunks(observer);

        self.observer_chunk = Some(observer);
    }

    // Step 1.
    fn drain_generation_completions(&mut self) {
        for _ in 0..self.budgets.max_gen_integrations {
            if self.store.len() >= self.budgets.hard_chunk_cap {
                break;
            }
            let Ok(completion) = self.gen_rx.try_recv() else {
                break;
            };
            self.pending_gen.remove(&completion.coord.key());
            self.store.insert(completion.coord, completion.chunk);
            if completion.target_lod == LodLevel::Lod0 {
                lighting::seed_initial(&self.store, &self.registry, completion.coord);
            }
            self.submit_mesh_job(completion.coord, completion.target_lod);
        }
    }

    // Step 2.
    fn drain_mesh_uploads(&mut self, observer: ChunkCoord) {
        // `None` here means severe backpressure, uncapped — draining
        // uploads as fast as possible is exactly the relief valve a deep
        // upload queue needs, the opposite polarity of the generation caps
        // in `request_new_chunks`.
        let cap = self
            .budgets
            .upload_cap_for_depth(self.mesh_rx.len())
            .unwrap_or(u32::MAX);

        let unload_radius_sq = sq(self.bands.r_max as i32 + 2);
        for _ in 0..cap {
            let Ok(completion) = self.mesh_rx.try_recv() else {
                break;
            };
            self.meshing_in_progress.remove(&completion.coord.key());

            let Some(handle) = self.store.get_handle(completion.coord) else {
                continue;
            };
            if dist_sq(completion.coord, observer) > unload_radius_sq {
                continue;
            }

            let mut chunk = handle.write();
            match completion.payload {
                MeshPayload::Full(pair) => {
                    chunk.mesh_slots.full_opaque = Some(pair.opaque);
                    chunk.mesh_slots.full_transparent = Some(pair.transparent);
                    // Only a rebuild-dirty-mesh result clears `dirty`; an
                    // LOD-reassessment mesh (the `Lod` arm below) leaves it
                    // untouched since it says nothing about whether the
                    // chunk's *own* edits have been re-meshed yet.
                    chunk.dirty = false;
                }
                MeshPayload::Lod(mesh) => {
                    chunk.mesh_slots.lod[completion.lod.as_u8() as usize] = Some(mesh);
                }
            }
            chunk.current_lod = completion.lod;
        }
    }

    // Step 3.
    fn rebuild_dirty_meshes(&mut self) {
        let mut submitted = 0u32;
        for coord in self.store.iter_loaded() {
            if submitted >= self.budgets.max_rebuild_dirty {
                break;
            }
            let Some(handle) = self.store.get_handle(coord) else {
                continue;
            };
            let target_lod = {
                let chunk = handle.read();
                if !chunk.dirty || chunk.current_lod != LodLevel::Lod0 {
                    continue;
                }
                chunk.current_lod
            };
            if self.meshing_in_progress.contains(&coord.key()) {
                continue;
            }
            self.submit_mesh_job(coord, target_lod);
            submitted += 1;
        }
    }

    // Step 4.
    fn reassess_lod(&mut self, observer: ChunkCoord) {
        let mut submitted = 0u32;
        for coord in self.store.iter_loaded() {
            let Some(handle) = self.store.get_handle(coord) else {
                continue;
            };
            let current = { handle.read().current_lod };
            let Some(target) = lod::next_lod(current, dist_sq(coord, observer), &self.bands) else {
                // Beyond r_max: `unload_far_chunks` handles eviction.
                continue;
            };
            if target == current {
                continue;
            }
            if mesh_slot_populated(&handle.read(), target) {
                handle.write().current_lod = target;
                continue;
            }
            if submitted >= self.budgets.max_mesh_submissions {
                // Swapping LOD without the matching mesh available leaves
                // the chunk invisible, so leave `current_lod` untouched
                // until a future frame has budget.
                continue;
            }
            if self.meshing_in_progress.contains(&coord.key()) {
                continue;
            }
            self.submit_mesh_job(coord, target);
            submitted += 1;
        }
    }

    // Step 5a.
    fn unload_far_chunks(&mut self, observer: ChunkCoord) {
        let threshold = sq(self.bands.r_max as i32 + 2);
        let stale: Vec<ChunkCoord> = self
            .store
            .iter_loaded()
            .into_iter()
            .filter(|&coord| dist_sq(coord, observer) > threshold)
            .collect();
        for coord in stale {
            self.unload_chunk(coord);
        }
    }

    // Step 5 adjunct: best-effort cancellation of not-yet-completed
    // generation jobs that fell out of range after an observer move.
    fn cancel_stale_pending(&mut self, observer: ChunkCoord) {
        let threshold = sq(self.bands.r_max as i32 + 2);
        let stale: Vec<u64> = self
            .pending_gen
            .iter()
            .map(|e| *e.key())
            .filter(|&key| dist_sq(ChunkCoord::from_key(key), observer) > threshold)
            .collect();
        for key in stale {
            self.cancelled_gen.insert(key);
        }
    }

    // Step 5b.
    fn enforce_hard_cap(&mut self, observer: ChunkCoord) {
        if self.store.len() <= self.budgets.hard_chunk_cap {
            return;
        }
        let mut loaded = self.store.iter_loaded();
        loaded.sort_by_key(|&coord| std::cmp::Reverse(dist_sq(coord, observer)));
        let excess = self.store.len() - self.budgets.hard_chunk_cap;
        for coord in loaded.into_iter().take(excess) {
            log::info!("hard chunk cap reached, evicting farthest chunk {:?}", coord);
            self.unload_chunk(coord);
        }
    }

    fn unload_chunk(&mut self, coord: ChunkCoord) {
        let Some(handle) = self.store.remove(coord) else {
            return;
        };
        let guard = handle.read();
        if guard.modified {
            self.persistence.save_chunk(coord, &guard);
        }
    }

    // Step 6.
    fn request_new_chunks(&mut self, observer: ChunkCoord) {
        let queue_depth = self.mesh_rx.len();
        let Some((close_cap, far_cap)) = self.budgets.gen_caps_for_depth(queue_depth) else {
            // Severe backpressure: submit nothing new this frame.
            return;
        };

        let mut close_submitted = 0u32;
        let mut far_submitted = 0u32;
        for dist in 0..=self.bands.r_max as i32 {
            for coord in ring(observer, dist) {
                if close_submitted >= close_cap && far_submitted >= far_cap {
                    return;
                }
                if self.store.contains(coord) || self.pending_gen.contains(&coord.key()) {
                    continue;
                }
                if self.pending_gen.len() + self.store.len() >= self.budgets.hard_chunk_cap {
                    return;
                }
                let Some(target_lod) = lod::level_for_distance((dist as i64) * (dist as i64), &self.bands) else {
                    continue;
                };
                let is_close = target_lod == LodLevel::Lod0;
                if is_close {
                    if close_submitted >= close_cap {
                        continue;
                    }
                    close_submitted += 1;
                } else {
                    if far_submitted >= far_cap {
                        continue;
                    }
                    far_submitted += 1;
                }
                self.pending_gen.insert(coord.key());
                self.submit_generation_job(coord, target_lod);
            }
        }
    }

    fn submit_generation_job(&self, coord: ChunkCoord, target_lod: LodLevel) {
        let key = coord.key();
        let tx = self.gen_tx.clone();
        let persistence = Arc::clone(&self.persistence);
        let gen_config = self.gen_config;
        let registry = self.registry;
        let cancelled = Arc::clone(&self.cancelled_gen);

        self.gen_pool.spawn(move || {
            if cancelled.remove(&key).is_some() {
                return;
            }
            let chunk = persistence.load_chunk(coord).unwrap_or_else(|| {
                if target_lod == LodLevel::Lod0 {
                    generate_full(coord.cx, coord.cz, &gen_config, &registry)
                } else {
                    generate_simplified(coord.cx, coord.cz, &gen_config)
                }
            });
            let _ = tx.send(GenCompletion { coord, chunk, target_lod });
        });
    }

    /// Captures a [`crate::snapshot::Snapshot`] synchronously on the calling
    /// (observer) thread, then hands the already-captured, lock-free
    /// snapshot to a mesh worker. The store is never shared into the mesh
    /// pool's closures at all — they touch no state but the snapshot they
    /// own.
    fn submit_mesh_job(&self, coord: ChunkCoord, target_lod: LodLevel) {
        let key = coord.key();
        if !self.meshing_in_progress.insert(key) {
            return;
        }
        let Some(snapshot) = crate::snapshot::Snapshot::capture(&self.store, coord) else {
            self.meshing_in_progress.remove(&key);
            return;
        };

        let tx = self.mesh_tx.clone();
        let registry = self.registry;
        let time_of_day = self.time_of_day;
        self.mesh_pool.spawn(move || {
            let payload = if target_lod == LodLevel::Lod0 {
                MeshPayload::Full(mesh_full(&snapshot, &registry, time_of_day))
            } else {
                MeshPayload::Lod(mesh_lod(&snapshot, &registry, time_of_day, target_lod))
            };
            let _ = tx.send(MeshCompletion { coord, lod: target_lod, payload });
        });
    }

    /// Applies a block edit at world coordinates. A no-op (no lighting
    /// recompute, no mesh rebuild scheduled) if the chunk isn't loaded or
    /// the id is already present.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, id: BlockId) {
        let coord = ChunkCoord::from_world_block(wx, wz);
        let Some(handle) = self.store.get_handle(coord) else {
            return;
        };
        let (lx, lz) = world_to_local(wx, wz);

        let unchanged = {
            let mut chunk = handle.write();
            if chunk.get_block(lx, wy, lz) == id {
                true
            } else {
                chunk.set_block(lx, wy, lz, id);
                false
            }
        };
        if unchanged {
            return;
        }

        if id.is_air() {
            lighting::on_block_removed(&self.store, &self.registry, wx, wy, wz);
        } else {
            lighting::on_block_placed(&self.store, &self.registry, wx, wy, wz);
        }
    }

    /// Flushes every modified loaded chunk to persistence and drops both
    /// worker pools. Rayon's `ThreadPool::drop` blocks until every spawned
    /// closure finishes; rayon has no timeout-join API, so there is no way
    /// to bound this wait from inside the pool itself.
    pub fn shutdown(self) {
        for coord in self.store.iter_loaded() {
            if let Some(handle) = self.store.get_handle(coord) {
                let guard = handle.read();
                if guard.modified {
                    self.persistence.save_chunk(coord, &guard);
                }
            }
        }
        self.persistence.flush();
    }

    /// Chunks currently ready to draw: those whose current-LOD mesh slot
    /// holds a built mesh.
    pub fn iter_renderable(&self) -> Vec<RenderableChunk> {
        self.store
            .iter_loaded()
            .into_iter()
            .filter_map(|coord| {
                let handle = self.store.get_handle(coord)?;
                let chunk = handle.read();
                mesh_slot_populated(&chunk, chunk.current_lod).then_some(RenderableChunk {
                    coord,
                    lod: chunk.current_lod,
                })
            })
            .collect()
    }
}

fn mesh_slot_populated(chunk: &Chunk, lod: LodLevel) -> bool {
    if lod == LodLevel::Lod0 {
        chunk.mesh_slots.full_opaque.is_some()
    } else {
        chunk.mesh_slots.lod[lod.as_u8() as usize].is_some()
    }
}

#[inline]
fn sq(n: i32) -> i64 {
    (n as i64) * (n as i64)
}

/// Squared Chebyshev chunk distance, compared against the LOD band radii and
/// the `r_max + 2` unload threshold throughout this module. Chosen over
/// squared Euclidean distance so that a `render_distance` of N chunks keeps
/// exactly the (2N+1)×(2N+1) square of chunks loaded (see `DESIGN.md`).
fn dist_sq(a: ChunkCoord, b: ChunkCoord) -> i64 {
    sq(a.chebyshev_distance(b))
}

/// Every [`ChunkCoord`] at exact Chebyshev distance `dist` from `center`:
/// one ring of a square spiral, walked from the inside out by
/// [`ChunkManager::request_new_chunks`].
fn ring(center: ChunkCoord, dist: i32) -> Vec<ChunkCoord> {
    if dist == 0 {
        return vec![center];
    }
    let mut coords = Vec::with_capacity((8 * dist) as usize);
    for dx in -dist..=dist {
        coords.push(center.neighbor(dx, -dist));
        coords.push(center.neighbor(dx, dist));
    }
    for dz in (-dist + 1)..dist {
        coords.push(center.neighbor(-dist, dz));
        coords.push(center.neighbor(dist, dz));
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::FilePersistence;

    fn manager_with(render_distance: u32) -> ChunkManager {
        let dir = tempfile::tempdir().unwrap();
        let persistence: Arc<dyn PersistenceAdapter> = Arc::new(FilePersistence::new(dir.path()));
        let config = RuntimeConfig {
            render_distance_chunks: render_distance,
            lod_threshold_chunks: render_distance + 2,
            max_render_distance_chunks: render_distance + 4,
            ..Default::default()
        };
        ChunkManager::new(&config, persistence)
    }

    #[test]
    fn ring_zero_is_just_the_center() {
        let center = ChunkCoord::new(3, 3);
        assert_eq!(ring(center, 0), vec![center]);
    }

    #[test]
    fn ring_one_has_eight_coords_all_at_chebyshev_one() {
        let center = ChunkCoord::new(0, 0);
        let r = ring(center, 1);
        assert_eq!(r.len(), 8);
        assert!(r.iter().all(|c| center.chebyshev_distance(*c) == 1));
    }

    #[test]
    fn update_drains_generation_into_loaded_and_renderable_chunks() {
        let mut manager = manager_with(2);
        for _ in 0..20 {
            manager.update((0.0, 70.0, 0.0));
            if !manager.store.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(!manager.store.is_empty());
    }

    #[test]
    fn set_block_on_unloaded_chunk_is_a_no_op() {
        let mut manager = manager_with(2);
        manager.set_block(10_000, 64, 10_000, BlockId::STONE);
        assert!(manager.store.is_empty());
    }

    #[test]
    fn set_block_same_id_does_not_mark_modified() {
        let mut manager = manager_with(2);
        let coord = ChunkCoord::new(0, 0);
        manager.store.insert(coord, Chunk::new_empty());
        manager.set_block(0, 0, 0, BlockId::AIR);
        let handle = manager.store.get_handle(coord).unwrap();
        assert!(!handle.read().modified);
    }

    #[test]
    fn hard_cap_eviction_keeps_store_at_or_under_cap() {
        let mut manager = manager_with(2);
        manager.budgets.hard_chunk_cap = 4;
        for cx in 0..10 {
            manager.store.insert(ChunkCoord::new(cx, 0), Chunk::new_empty());
        }
        manager.enforce_hard_cap(ChunkCoord::new(0, 0));
        assert!(manager.store.len() <= 4);
    }
}
