//! Geometry helpers shared by the placement and backbone algorithms.
//!
//! ## Angle convention
//!
//! Angles are in radians, measured with `atan2(dy, dx)` in diagram
//! coordinates (y pointing down), so positive angles turn clockwise on
//! screen. Angles are compared only after normalizing with
//! [`normalize_angle`], which maps into `[-π, π]` using a symmetric remainder.

use std::f64::consts::PI;

use super::types::Point;

/// IEEE 754 style remainder: `x - n * y` where `n` is `x / y` rounded to the
/// nearest integer, ties to even.
///
/// Unlike `%` the result is centered on zero, so for `y = 2π` it lands in
/// `[-π, π]`.
pub fn symmetric_remainder(x: f64, y: f64) -> f64 {
    x - (x / y).round_ties_even() * y
}

/// Normalize an angle into `[-π, π]`
pub fn normalize_angle(angle: f64) -> f64 {
    symmetric_remainder(angle, 2.0 * PI)
}

/// Evaluate one coordinate of a cubic bezier at parameter `t`
pub fn cubic_bezier(t: f64, b0: f64, b1: f64, b2: f64, b3: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * b0 + 3.0 * t * u * u * b1 + 3.0 * t * t * u * b2 + t * t * t * b3
}

/// Evaluate a cubic bezier curve at parameter `t`
pub fn cubic_bezier_point(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    Point::new(
        cubic_bezier(t, p0.x, p1.x, p2.x, p3.x),
        cubic_bezier(t, p0.y, p1.y, p2.y, p3.y),
    )
}

/// Whether `p` lies on the axis-aligned segment `a`-`b`.
///
/// Only horizontal and vertical segments are considered; diagonal segments
/// never contain anything. Coordinates are compared exactly, which is what
/// drawn pathway lines (integer grid positions scaled by a constant) need.
pub fn is_within(p: Point, a: Point, b: Point) -> bool {
    let (min_x, max_x) = if a.x < b.x { (a.x, b.x) } else { (b.x, a.x) };
    let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };

    if min_x == max_x {
        p.x == min_x && min_y <= p.y && p.y <= max_y
    } else if min_y == max_y {
        p.y == min_y && min_x <= p.x && p.x <= max_x
    } else {
        false
    }
}
