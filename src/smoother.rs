//! Closed quadratic curve through an ordered set of points.

use glam::DVec2;

/// Path command string for the renderer.
pub type CurveDescription = String;

/// Format a coordinate the way SVG consumers expect: shortest round-trip
/// decimal, no exponent, and no negative zero.
fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{}", v)
    }
}

fn fmt_point(p: DVec2) -> String {
    format!("{},{}", fmt_num(p.x), fmt_num(p.y))
}

/// Build a smooth closed path through `points`.
///
/// Each interior point becomes a `Q` control point whose endpoint is the
/// midpoint to the following point. The loop is closed with a `Q` through the
/// last point towards the midpoint of last and first, then a `T` to the first
/// point. The result does not pass through the last point itself.
///
/// Returns an empty description for fewer than two points.
pub fn smooth(points: &[DVec2]) -> CurveDescription {
    let n = points.len();
    if n < 2 {
        return String::new();
    }

    let first = points[0];
    let last = points[n - 1];
    let mut commands = Vec::with_capacity(n + 2);
    commands.push(format!("M {}", fmt_point(first)));

    for pair in points[1..n - 1].iter().zip(&points[2..]) {
        let (curr, next) = (*pair.0, *pair.1);
        let mid = (curr + next) / 2.0;
        commands.push(format!("Q {} {}", fmt_point(curr), fmt_point(mid)));
    }

    let closing = (last + first) / 2.0;
    commands.push(format!("Q {} {}", fmt_point(last), fmt_point(closing)));
    commands.push(format!("T {}", fmt_point(first)));

    commands.join(" ")
}
