//! Tests for core geometry types

use pretty_assertions::assert_eq;
use talud_core::{circle_line_intersection, Point2};

// ============================================================
// Point2 Tests
// ============================================================

#[test]
fn point_distance_is_symmetric() {
    let a = Point2::new(1.0, 2.0);
    let b = Point2::new(4.0, 6.0);

    assert_eq!(a.distance_to(&b), b.distance_to(&a));
    assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
}

#[test]
fn point_midpoint() {
    let a = Point2::new(2.0, 8.0);
    let b = Point2::new(6.0, 4.0);

    let m = a.midpoint(&b);
    assert_eq!(m, Point2::new(4.0, 6.0));
}

#[test]
fn point_serde_round_trip() {
    let p = Point2::new(4.5, 6.0);

    let json = serde_json::to_string(&p).unwrap();
    let back: Point2 = serde_json::from_str(&json).unwrap();

    assert_eq!(p, back);
}

// ============================================================
// Circle-Line Intersection Tests
// ============================================================

#[test]
fn vertical_line_through_circle() {
    let hits = circle_line_intersection(
        Point2::new(0.0, -5.0),
        Point2::new(0.0, 5.0),
        Point2::new(0.0, 0.0),
        2.0,
    );

    assert_eq!(hits.len(), 2);
    for p in &hits {
        assert!(p.x.abs() < 1e-9);
        assert!((p.y.abs() - 2.0).abs() < 1e-9);
    }
}

#[test]
fn inclined_line_through_offset_circle() {
    // 45 degree line y = x against circle centred at (3, 3)
    let hits = circle_line_intersection(
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(3.0, 3.0),
        1.0,
    );

    assert_eq!(hits.len(), 2);
    // both intersections lie on the line and on the circle
    for p in &hits {
        assert!((p.y - p.x).abs() < 1e-9);
        let r = Point2::new(3.0, 3.0).distance_to(p);
        assert!((r - 1.0).abs() < 1e-9);
    }
}

#[test]
fn tangent_line_yields_single_point() {
    // y = 1 tangent to the unit circle at (0, 1)
    let hits = circle_line_intersection(
        Point2::new(-3.0, 1.0),
        Point2::new(3.0, 1.0),
        Point2::new(0.0, 0.0),
        1.0,
    );

    // tangency may collapse to one point or two nearly identical points
    // depending on rounding of the discriminant
    assert!(!hits.is_empty());
    for p in &hits {
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }
}

#[test]
fn disjoint_line_yields_nothing() {
    let hits = circle_line_intersection(
        Point2::new(0.0, 10.0),
        Point2::new(1.0, 10.0),
        Point2::new(0.0, 0.0),
        1.0,
    );

    assert!(hits.is_empty());
}
