//! Indirect-light ambient term derived from time of day.
//!
//! Rather than a separate probe-placement system, the vertex format's
//! `indirect_rgb` fields are filled with
//! `sky_visibility * ambient_color(time_of_day)`, a fixed, deterministic
//! function of the one external time-of-day scalar the core is handed.

const NIGHT: [f32; 3] = [0.02, 0.02, 0.05];
const DAY: [f32; 3] = [0.18, 0.18, 0.2];
const DUSK: [f32; 3] = [0.2, 0.12, 0.08];

/// `time_of_day` is `0..=1`: 0 = midnight, 0.5 = noon.
pub fn ambient_color(time_of_day: f32) -> [f32; 3] {
    let t = time_of_day.clamp(0.0, 1.0);
    // Two lerps: night -> dusk over [0, 0.25], dusk -> day over [0.25, 0.5],
    // then mirrored back down over the second half of the day.
    let phase = if t <= 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 };
    if phase < 0.5 {
        lerp3(NIGHT, DUSK, phase * 2.0)
    } else {
        lerp3(DUSK, DAY, (phase - 0.5) * 2.0)
    }
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
