//! Sampling of base points and fixed wiggle offsets along a path.

use serde::{Deserialize, Serialize};

use crate::path_geometry::ArcLengthPath;

/// A base point on the path plus its fixed per-axis offset magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Largest f64 strictly below 1.0.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Deterministic hash of a scalar into `[0, 1)`.
///
/// Same input, same output. Not suitable for anything beyond visual jitter.
pub fn pseudo_random(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    let r = x - x.floor();
    if r.is_nan() {
        return 0.0;
    }
    r.min(BELOW_ONE)
}

/// Offset in `[-amplitude / 2, amplitude / 2)` for one axis.
fn offset_for(seed: f64, amplitude: f64) -> f64 {
    let half = amplitude / 2.0;
    let offset = pseudo_random(seed) * amplitude - half;
    if amplitude > 0.0 && offset >= half {
        // Rounding in the multiply can land on the open upper bound.
        f64::from_bits(half.to_bits() - 1)
    } else {
        offset
    }
}

/// Sample `point_count + 1` evenly spaced points along `path`.
///
/// `point_count` below 1 is treated as 1. The x offset of point `i` is
/// seeded with `seed + i` and the y offset with `seed + i + 1`.
pub fn sample<P: ArcLengthPath + ?Sized>(
    path: &P,
    point_count: usize,
    seed: f64,
    amplitude: f64,
) -> Vec<SamplePoint> {
    let point_count = point_count.max(1);
    let length = path.total_length();

    (0..=point_count)
        .map(|i| {
            let t = i as f64 / point_count as f64;
            let base = path.point_at_length(t * length);
            let i = i as f64;
            SamplePoint {
                x: base.x,
                y: base.y,
                offset_x: offset_for(seed + i, amplitude),
                offset_y: offset_for(seed + i + 1.0, amplitude),
            }
        })
        .collect()
}
