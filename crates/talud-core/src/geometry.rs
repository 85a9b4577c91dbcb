//! Core geometry types - solver-agnostic

use serde::{Deserialize, Serialize};

/// 2D point in section coordinates (x chainage, y elevation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Intersection of the infinite line through `p1` and `p2` with the circle
/// centred at `centre` with radius `radius`.
///
/// Uses the shifted-origin discriminant method (Wolfram circle-line
/// intersection). Returns zero points when the line misses the circle, one
/// point when tangent, two otherwise. Callers restrict results to a segment
/// by filtering on x afterwards.
pub fn circle_line_intersection(
    p1: Point2,
    p2: Point2,
    centre: Point2,
    radius: f64,
) -> Vec<Point2> {
    // shift so the circle centre is the datum
    let x1 = p1.x - centre.x;
    let y1 = p1.y - centre.y;
    let x2 = p2.x - centre.x;
    let y2 = p2.y - centre.y;

    let dx = x2 - x1;
    let dy = y2 - y1;
    let dr2 = dx * dx + dy * dy;

    let d = x1 * y2 - x2 * y1;

    let disc = (radius * radius * dr2).abs() - (d * d).abs();

    if disc < 0.0 {
        return Vec::new();
    }

    // sign factor keeps the x/y roots paired on the same point
    let m = if dy < 0.0 { -1.0 } else { 1.0 };
    let root = disc.sqrt();

    let xa = (d * dy + m * dx * root) / dr2 + centre.x;
    let xb = (d * dy - m * dx * root) / dr2 + centre.x;

    let ya = (-(d * dx) + dy.abs() * root) / dr2 + centre.y;
    let yb = (-(d * dx) - dy.abs() * root) / dr2 + centre.y;

    if disc == 0.0 {
        vec![Point2::new(xa, ya)]
    } else {
        vec![Point2::new(xa, ya), Point2::new(xb, yb)]
    }
}
