//! Animation parameters shared by the driver, the CLI and the wasm binding.

use serde::{Deserialize, Serialize};

/// Recommended amplitude range (path units).
pub const AMPLITUDE_RANGE: (f64, f64) = (1.0, 50.0);
/// Recommended speed range (radians per frame).
pub const SPEED_RANGE: (f64, f64) = (0.001, 0.5);
/// Recommended point count range.
pub const POINT_COUNT_RANGE: (usize, usize) = (5, 50);

fn default_amplitude() -> f64 {
    10.0
}

fn default_speed() -> f64 {
    0.1
}

fn default_point_count() -> usize {
    10
}

/// The three knobs of the wiggle effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiggleParams {
    /// Peak-to-peak range of the per-point offsets.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Phase advance per frame.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Number of intervals along the path; `point_count + 1` points are sampled.
    #[serde(default = "default_point_count")]
    pub point_count: usize,
}

impl Default for WiggleParams {
    fn default() -> Self {
        Self {
            amplitude: default_amplitude(),
            speed: default_speed(),
            point_count: default_point_count(),
        }
    }
}

impl WiggleParams {
    pub fn new(amplitude: f64, speed: f64, point_count: usize) -> Self {
        Self {
            amplitude,
            speed,
            point_count,
        }
    }

    /// Clamp values the engine cannot use.
    ///
    /// `point_count` is at least 1, amplitude is non-negative, and non-finite
    /// values fall back to their defaults. Values outside the recommended
    /// ranges are kept.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;

        if out.point_count < 1 {
            log::warn!("point_count {} is invalid, clamping to 1", out.point_count);
            out.point_count = 1;
        }

        if !out.amplitude.is_finite() {
            log::warn!("amplitude {} is not finite, using default", out.amplitude);
            out.amplitude = default_amplitude();
        } else if out.amplitude < 0.0 {
            log::warn!("amplitude {} is negative, clamping to 0", out.amplitude);
            out.amplitude = 0.0;
        }

        if !out.speed.is_finite() {
            log::warn!("speed {} is not finite, using default", out.speed);
            out.speed = default_speed();
        }

        out
    }

    /// True if every value lies in its recommended range.
    pub fn is_within_recommended(&self) -> bool {
        (AMPLITUDE_RANGE.0..=AMPLITUDE_RANGE.1).contains(&self.amplitude)
            && (SPEED_RANGE.0..=SPEED_RANGE.1).contains(&self.speed)
            && (POINT_COUNT_RANGE.0..=POINT_COUNT_RANGE.1).contains(&self.point_count)
    }
}
