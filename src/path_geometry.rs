//! Arc-length model of a parsed path.
//!
//! Each drawable segment of the `kurbo` path is measured once and the running
//! total recorded, so `point_at_length` is a binary search over segments
//! followed by one `inv_arclen` solve inside the chosen segment.

use glam::DVec2;
use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point};

use crate::path_data::{parse_path_data, PathDataError};

/// Accuracy passed to kurbo's arc length routines.
const ARCLEN_ACCURACY: f64 = 1e-9;

/// A planar curve that can be queried by distance along it.
pub trait ArcLengthPath {
    /// Total arc length (always >= 0).
    fn total_length(&self) -> f64;

    /// Point at the given arc length. Values outside `[0, total_length]`
    /// are clamped.
    fn point_at_length(&self, length: f64) -> DVec2;
}

#[derive(Debug, Clone, Copy)]
struct MeasuredSegment {
    seg: PathSeg,
    /// Arc length at the segment's start.
    start: f64,
    length: f64,
}

impl MeasuredSegment {
    fn end_length(&self) -> f64 {
        self.start + self.length
    }
}

/// Bezier path with cached cumulative segment lengths.
#[derive(Debug, Clone, Default)]
pub struct MeasuredPath {
    origin: DVec2,
    segments: Vec<MeasuredSegment>,
    total_length: f64,
}

fn to_dvec(p: Point) -> DVec2 {
    DVec2::new(p.x, p.y)
}

impl MeasuredPath {
    /// Measure an already parsed path. Moves contribute no length; a close
    /// contributes the line back to its subpath start.
    pub fn from_bez_path(path: &BezPath) -> Self {
        let origin = path
            .elements()
            .iter()
            .find_map(|el| match el {
                PathEl::MoveTo(p) => Some(to_dvec(*p)),
                _ => None,
            })
            .unwrap_or(DVec2::ZERO);

        let mut segments = Vec::new();
        let mut total_length = 0.0;
        for seg in path.segments() {
            let length = seg.arclen(ARCLEN_ACCURACY);
            // Zero-length segments have no parameter to solve for.
            if length > 0.0 && length.is_finite() {
                segments.push(MeasuredSegment {
                    seg,
                    start: total_length,
                    length,
                });
                total_length += length;
            }
        }

        Self {
            origin,
            segments,
            total_length,
        }
    }

    /// Parse and measure an SVG path description.
    pub fn parse(d: &str) -> Result<Self, PathDataError> {
        Ok(Self::from_bez_path(&parse_path_data(d)?))
    }

    /// Number of segments with non-zero length.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl ArcLengthPath for MeasuredPath {
    fn total_length(&self) -> f64 {
        self.total_length
    }

    fn point_at_length(&self, length: f64) -> DVec2 {
        let Some(last) = self.segments.last() else {
            return self.origin;
        };
        if length >= self.total_length {
            return to_dvec(last.seg.end());
        }
        let s = if length.is_nan() {
            0.0
        } else {
            length.clamp(0.0, self.total_length)
        };

        let idx = self
            .segments
            .partition_point(|m| m.end_length() < s)
            .min(self.segments.len() - 1);
        let measured = &self.segments[idx];

        let local = (s - measured.start).clamp(0.0, measured.length);
        let t = measured.seg.inv_arclen(local, ARCLEN_ACCURACY);
        to_dvec(measured.seg.eval(t))
    }
}
