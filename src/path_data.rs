//! SVG path description parsing.
//!
//! `svgtypes` does the tokenizing and resolves relative commands, the `H`/`V`
//! shorthands, `S`/`T` reflections and arcs into absolute move, line,
//! quadratic and cubic segments. Those are collected into a `kurbo::BezPath`,
//! which is what the geometry layer measures.

use std::fmt;

use kurbo::BezPath;
use svgtypes::{SimplePathSegment, SimplifyingPathParser};

/// A path description that could not be parsed.
#[derive(Debug)]
pub struct PathDataError {
    /// Number of segments read successfully before the failure.
    pub segments_read: usize,
    source: svgtypes::Error,
}

impl PathDataError {
    /// The parser's own description of what went wrong, including the
    /// position in the input where it could tell.
    pub fn cause(&self) -> &svgtypes::Error {
        &self.source
    }
}

impl fmt::Display for PathDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid path data after {} segment(s): {}",
            self.segments_read, self.source
        )
    }
}

impl std::error::Error for PathDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Parse an SVG path description into an absolute Bezier path.
///
/// An empty (or all-whitespace) description gives an empty path. The first
/// malformed segment fails the whole description.
pub fn parse_path_data(d: &str) -> Result<BezPath, PathDataError> {
    let mut path = BezPath::new();
    let mut segments_read = 0;

    for segment in SimplifyingPathParser::from(d) {
        let segment = segment.map_err(|source| PathDataError {
            segments_read,
            source,
        })?;
        match segment {
            SimplePathSegment::MoveTo { x, y } => path.move_to((x, y)),
            SimplePathSegment::LineTo { x, y } => path.line_to((x, y)),
            SimplePathSegment::Quadratic { x1, y1, x, y } => path.quad_to((x1, y1), (x, y)),
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => path.curve_to((x1, y1), (x2, y2), (x, y)),
            SimplePathSegment::ClosePath => path.close_path(),
        }
        segments_read += 1;
    }

    Ok(path)
}
