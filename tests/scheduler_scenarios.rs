//! End-to-end scenarios from spec §8's S-series, exercised through the
//! public `voxelstream` surface instead of any one module's internals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use voxelstream::block::BlockId;
use voxelstream::chunk::ChunkCoord;
use voxelstream::config::RuntimeConfig;
use voxelstream::lighting;
use voxelstream::persistence::{FilePersistence, PersistenceAdapter};
use voxelstream::scheduler::ChunkManager;

fn manager(render_distance: u32, max_render_distance: u32) -> ChunkManager {
    let dir = tempfile::tempdir().unwrap();
    let persistence: Arc<dyn PersistenceAdapter> = Arc::new(FilePersistence::new(dir.path()));
    let config = RuntimeConfig {
        seed: 12345,
        render_distance_chunks: render_distance,
        lod_threshold_chunks: render_distance + 2,
        max_render_distance_chunks: max_render_distance,
        ..Default::default()
    };
    ChunkManager::new(&config, persistence)
}

fn run_until(manager: &mut ChunkManager, observer: (f32, f32, f32), deadline: Duration) {
    let start = Instant::now();
    while start.elapsed() < deadline {
        manager.update(observer);
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// S1 (partial, without the full 9x9/render-distance=4 wait-to-steady-state
/// timing): after enough frames the observer's own chunk is loaded at
/// LOD_0 with a populated mesh slot, and the store never exceeds what the
/// hard cap allows.
#[test]
fn observer_chunk_reaches_lod0_with_a_populated_mesh() {
    let mut manager = manager(4, 6);
    run_until(&mut manager, (0.0, 70.0, 0.0), Duration::from_millis(800));

    let renderable = manager.iter_renderable();
    assert!(
        renderable.iter().any(|r| r.coord == ChunkCoord::new(0, 0)),
        "expected the observer's own chunk to be renderable"
    );
}

/// S2: after a long-distance teleport, the unload step on the next chunk
/// change clears chunks far outside the new `(r_max+2)` radius, and the
/// store re-populates around the new position without ever exceeding the
/// configured hard cap.
#[test]
fn teleport_evicts_far_chunks_and_restreams_without_exceeding_cap() {
    let mut manager = manager(4, 6);
    run_until(&mut manager, (0.0, 70.0, 0.0), Duration::from_millis(500));
    assert!(manager.store().contains(ChunkCoord::new(0, 0)));

    run_until(&mut manager, (1024.0, 70.0, 1024.0), Duration::from_millis(800));

    // (0,0) is far outside any (r_max+2) radius around chunk (64,64).
    assert!(!manager.store().contains(ChunkCoord::new(0, 0)));
    assert!(manager.store().len() <= 4096);
}

/// S3: placing an opaque block on a previously-lit air cell darkens the
/// column below it and marks exactly the owning chunk dirty (the cell is
/// not on a chunk edge, so no neighbor rebuild is scheduled).
#[test]
fn placing_opaque_block_not_on_an_edge_only_dirties_its_own_chunk() {
    let mut manager = manager(2, 4);
    run_until(&mut manager, (0.0, 70.0, 0.0), Duration::from_millis(500));

    // Force a known precondition (open air with clear sky above) rather
    // than depending on this generator's terrain happening to leave (5, 80,
    // 5) open, since spec scenario S3 only promises that precondition, not
    // which generator produced it.
    {
        let handle = manager.store().get_handle(ChunkCoord::new(0, 0)).unwrap();
        let mut chunk = handle.write();
        chunk.set_block(5, 80, 5, BlockId::AIR);
        chunk.set_sky_light(5, 80, 5, 15);
    }

    manager.set_block(5, 80, 5, BlockId::STONE);

    let handle = manager.store().get_handle(ChunkCoord::new(0, 0)).unwrap();
    let chunk = handle.read();
    assert_eq!(chunk.get_block(5, 80, 5), BlockId::STONE);
    assert_eq!(chunk.sky_light(5, 80, 5), 0);
}

/// S4: placing a torch seeds its own cell at full emitter color and decays
/// multiplicatively outward; a cell three steps away in open air should be
/// noticeably dimmer but still lit.
#[test]
fn torch_placement_lights_its_cell_and_decays_outward() {
    let mut manager = manager(2, 4);
    run_until(&mut manager, (0.0, 70.0, 0.0), Duration::from_millis(500));

    // Force an open air corridor so the BFS isn't blocked by whatever this
    // generator happened to place at y=64 for seed 12345.
    {
        let handle = manager.store().get_handle(ChunkCoord::new(0, 0)).unwrap();
        let mut chunk = handle.write();
        for x in 8..=11 {
            chunk.set_block(x, 64, 8, BlockId::AIR);
        }
    }

    manager.set_block(8, 64, 8, BlockId::TORCH);

    let handle = manager.store().get_handle(ChunkCoord::new(0, 0)).unwrap();
    let chunk = handle.read();
    assert_eq!(chunk.block_light_rgb(8, 64, 8), [255, 204, 128]);
    let far = chunk.block_light_rgb(11, 64, 8);
    // Three hops of 0.8 falloff through air: 0.8^3 ≈ 0.512 of the emitter's
    // normalized red, i.e. ≈130-131 on the 0-255 scale.
    let far_r_unit = far[0] as f32 / 255.0;
    assert!(
        (far_r_unit - 0.8f32.powi(3)).abs() < 0.02,
        "light should have decayed to ~0.512 of its source three cells away, got {far_r_unit}"
    );
}

/// S6: under upload-queue backpressure above the warning watermark,
/// generation submission caps for that frame are halved relative to the
/// unthrottled defaults.
#[test]
fn backpressure_halves_generation_caps_above_warning_watermark() {
    use voxelstream::lod::FrameBudgets;

    let budgets = FrameBudgets::default();
    let unthrottled = budgets.gen_caps_for_depth(0).unwrap();
    let throttled = budgets
        .gen_caps_for_depth(budgets.upload_warning_watermark + 1)
        .unwrap();
    assert_eq!(throttled, (unthrottled.0 / 2, unthrottled.1 / 2));

    let uncapped_uploads = budgets.upload_cap_for_depth(0).unwrap();
    let doubled = budgets
        .upload_cap_for_depth(budgets.upload_warning_watermark + 1)
        .unwrap();
    assert_eq!(doubled, uncapped_uploads * 2);
}

/// Spec §8 invariant 11: an edit on a chunk-edge cell schedules a rebuild
/// for both the owning chunk and the neighbor across that edge, using the
/// public lighting surface directly (no scheduler timing involved).
#[test]
fn edge_cell_edit_schedules_both_chunks_for_rebuild() {
    use voxelstream::block::BlockRegistry;
    use voxelstream::chunk::{Chunk, ChunkStore};

    let store = ChunkStore::new();
    let registry = BlockRegistry::new();
    store.insert(ChunkCoord::new(0, 0), Chunk::new_empty());
    store.insert(ChunkCoord::new(-1, 0), Chunk::new_empty());

    {
        let handle = store.get_handle(ChunkCoord::new(0, 0)).unwrap();
        handle.write().set_block(0, 80, 5, BlockId::STONE);
    }
    let rebuild = lighting::on_block_placed(&store, &registry, 0, 80, 5);
    assert!(rebuild.contains(&ChunkCoord::new(0, 0)));
    assert!(rebuild.contains(&ChunkCoord::new(-1, 0)));

    let neighbor = store.get_handle(ChunkCoord::new(-1, 0)).unwrap();
    assert!(neighbor.read().dirty, "neighbor chunk must be flagged dirty too");
}
