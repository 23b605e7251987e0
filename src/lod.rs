//! Distance-band LOD assignment with hysteresis, and the per-frame budget
//! constants the streaming scheduler throttles against.
//!
//! Four distance bands map to a coarser level as distance grows. A chunk
//! may only step to a *finer* LOD once it is two chunks past the boundary in
//! that direction, while coarsening is immediate.

use crate::chunk::LodLevel;

/// The four band radii `r0 < r1 < r2 < r_max`, in chunks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodBands {
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r_max: u32,
}

impl LodBands {
    pub const fn new(r0: u32, r1: u32, r2: u32, r_max: u32) -> Self {
        LodBands { r0, r1, r2, r_max }
    }

    /// Derives bands from the three radii in [`crate::config::RuntimeConfig`]
    /// (`render_distance_chunks`, `lod_threshold_chunks`,
    /// `max_render_distance_chunks`), with `r2` the midpoint of the latter two.
    pub fn from_config(render_distance: u32, lod_threshold: u32, max_render_distance: u32) -> Self {
        let r2 = lod_threshold + (max_render_distance - lod_threshold) / 2;
        LodBands::new(render_distance, lod_threshold, r2, max_render_distance)
    }
}

impl Default for LodBands {
    fn default() -> Self {
        LodBands::new(8, 12, 20, 40)
    }
}

/// Maps a squared chunk distance to a LOD level with no hysteresis applied
/// — the "ideal" band for the current distance alone. `None` means beyond
/// `r_max`: the chunk should be unloaded.
pub fn level_for_distance(dist_sq: i64, bands: &LodBands) -> Option<LodLevel> {
    let r0_sq = sq(bands.r0);
    let r1_sq = sq(bands.r1);
    let r2_sq = sq(bands.r2);
    let r_max_sq = sq(bands.r_max);

    if dist_sq <= r0_sq {
        Some(LodLevel::Lod0)
    } else if dist_sq <= r1_sq {
        Some(LodLevel::Lod1)
    } else if dist_sq <= r2_sq {
        Some(LodLevel::Lod2)
    } else if dist_sq <= r_max_sq {
        Some(LodLevel::Lod3)
    } else {
        None
    }
}

#[inline]
fn sq(r: u32) -> i64 {
    (r as i64) * (r as i64)
}

/// Two-chunk hysteresis margin: a chunk may only step to a finer LOD once
/// its distance is past the boundary by this many chunks.
const HYSTERESIS_CHUNKS: i64 = 2;

/// Applies the hysteresis rule on top of [`level_for_distance`]'s ideal
/// band: coarsening (`target > current`) always applies immediately;
/// refining (`target < current`) only applies once `dist_sq` is at least
/// `HYSTERESIS_CHUNKS` chunks inside the finer band's boundary. Ties stay
/// at the current LOD.
pub fn next_lod(current: LodLevel, dist_sq: i64, bands: &LodBands) -> Option<LodLevel> {
    let target = level_for_distance(dist_sq, bands)?;
    if target.as_u8() > current.as_u8() {
        return Some(target);
    }
    if target.as_u8() == current.as_u8() {
        return Some(current);
    }
    // Refining: only step down (finer) once inside the boundary by the
    // hysteresis margin. Find the boundary radius the current LOD's band
    // exits at, and require dist to be at least `HYSTERESIS_CHUNKS`
    // chunks inside it.
    let boundary = match current {
        LodLevel::Lod1 => bands.r0,
        LodLevel::Lod2 => bands.r1,
        LodLevel::Lod3 => bands.r2,
        LodLevel::Lod0 => return Some(current), // already finest
    };
    let margin = boundary.saturating_sub(HYSTERESIS_CHUNKS as u32);
    if dist_sq <= sq(margin) {
        Some(target)
    } else {
        Some(current)
    }
}

/// Per-frame budget constants the scheduler throttles submissions against.
/// These are reasonable interactive-rate defaults, tunable per deployment —
/// not load-bearing constants the mesher/generator depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBudgets {
    pub max_gen_close: u32,
    pub max_gen_far: u32,
    pub max_mesh_submissions: u32,
    pub max_uploads: u32,
    pub max_rebuild_dirty: u32,
    pub max_gen_integrations: u32,
    pub hard_chunk_cap: usize,
    pub upload_warning_watermark: usize,
    pub upload_severe_watermark: usize,
}

impl Default for FrameBudgets {
    fn default() -> Self {
        FrameBudgets {
            max_gen_close: 4,
            max_gen_far: 2,
            max_mesh_submissions: 8,
            max_uploads: 4,
            max_rebuild_dirty: 4,
            max_gen_integrations: 8,
            hard_chunk_cap: 4096,
            upload_warning_watermark: 20,
            upload_severe_watermark: 60,
        }
    }
}

impl FrameBudgets {
    /// Adaptive upload cap: roughly doubled once the upload queue exceeds a
    /// warning watermark, uncapped once it exceeds a severe watermark.
    pub fn upload_cap_for_depth(&self, queue_depth: usize) -> Option<u32> {
        if queue_depth > self.upload_severe_watermark {
            None
        } else if queue_depth > self.upload_warning_watermark {
            Some(self.max_uploads.saturating_mul(2))
        } else {
            Some(self.max_uploads)
        }
    }

    /// Backpressure on generation submission: halve the close/far caps
    /// above the warning watermark, submit nothing above the severe
    /// watermark.
    pub fn gen_caps_for_depth(&self, queue_depth: usize) -> Option<(u32, u32)> {
        if queue_depth > self.upload_severe_watermark {
            None
        } else if queue_depth > self.upload_warning_watermark {
            Some((self.max_gen_close / 2, self.max_gen_far / 2))
        } else {
            Some((self.max_gen_close, self.max_gen_far))
        }
    }
}
