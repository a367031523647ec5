#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn rect_approx_eq(a: Rect, b: Rect) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.width, b.width) && approx_eq(a.height, b.height)
}

// --- Point ---

#[test]
fn rotate_quarter_turn_clockwise() {
    let p = Point::new(10.0, 0.0).rotate_around(Point::new(0.0, 0.0), 90.0);
    assert!(approx_eq(p.x, 0.0));
    assert!(approx_eq(p.y, 10.0));
}

#[test]
fn rotate_full_turn_is_identity() {
    let p = Point::new(3.0, 4.0).rotate_around(Point::new(1.0, 1.0), 360.0);
    assert!(approx_eq(p.x, 3.0));
    assert!(approx_eq(p.y, 4.0));
}

// --- Rect ---

#[test]
fn rect_edges_and_area() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.area(), 1200.0);
    assert_eq!(r.center(), Point::new(25.0, 40.0));
}

#[test]
fn rect_zero_width_is_degenerate() {
    assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
    assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_degenerate());
    assert!(Rect::new(f64::NAN, 0.0, 10.0, 10.0).is_degenerate());
    assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
}

#[test]
fn rect_union_covers_both() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, 5.0, 5.0, 20.0);
    assert!(rect_approx_eq(a.union(&b), Rect::new(0.0, 0.0, 25.0, 25.0)));
}

#[test]
fn rect_intersection_overlap_and_disjoint() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    let c = Rect::new(20.0, 20.0, 1.0, 1.0);
    assert_eq!(a.intersection(&c), None);
}

#[test]
fn rect_scaled_and_translated() {
    let r = Rect::new(100.0, 50.0, 400.0, 500.0).scaled(0.5).translated(10.0, 20.0);
    assert!(rect_approx_eq(r, Rect::new(60.0, 45.0, 200.0, 250.0)));
}

#[test]
fn rect_serde_roundtrip() {
    let r = Rect::new(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_string(&r).unwrap();
    let back: Rect = serde_json::from_str(&json).unwrap();
    assert_eq!(r, back);
}

// --- Transform ---

#[test]
fn transform_scaled_size_ignores_sign_of_scale() {
    let t = Transform { scale_x: -2.0, scale_y: 0.5, ..Transform::at(0.0, 0.0, 100.0, 80.0) };
    assert_eq!(t.scaled_width(), 200.0);
    assert_eq!(t.scaled_height(), 40.0);
}

#[test]
fn transform_unrotated_bounding_rect_is_local_rect() {
    let t = Transform { scale_x: 2.0, ..Transform::at(10.0, 20.0, 50.0, 30.0) };
    assert!(rect_approx_eq(t.bounding_rect(), Rect::new(10.0, 20.0, 100.0, 30.0)));
}

#[test]
fn transform_quarter_turn_swaps_extents() {
    let t = Transform { angle: 90.0, ..Transform::at(0.0, 0.0, 100.0, 40.0) };
    let bbox = t.bounding_rect();
    assert!(approx_eq(bbox.width, 40.0));
    assert!(approx_eq(bbox.height, 100.0));
    assert!(approx_eq(bbox.center().x, 50.0));
    assert!(approx_eq(bbox.center().y, 20.0));
}

#[test]
fn transform_45_degrees_grows_square_bbox() {
    let t = Transform { angle: 45.0, ..Transform::at(0.0, 0.0, 100.0, 100.0) };
    let bbox = t.bounding_rect();
    let diag = 100.0 * std::f64::consts::SQRT_2;
    assert!(approx_eq(bbox.width, diag));
    assert!(approx_eq(bbox.height, diag));
}

#[test]
fn to_unit_maps_corners_and_center() {
    let t = Transform::at(10.0, 10.0, 100.0, 50.0);
    let c = t.to_unit(Point::new(60.0, 35.0)).unwrap();
    assert!(approx_eq(c.x, 0.5) && approx_eq(c.y, 0.5));
    let tl = t.to_unit(Point::new(10.0, 10.0)).unwrap();
    assert!(approx_eq(tl.x, 0.0) && approx_eq(tl.y, 0.0));
}

#[test]
fn to_unit_honors_flip() {
    let t = Transform { flip_x: true, ..Transform::at(0.0, 0.0, 100.0, 100.0) };
    let p = t.to_unit(Point::new(10.0, 10.0)).unwrap();
    assert!(approx_eq(p.x, 0.9));
    assert!(approx_eq(p.y, 0.1));
}

#[test]
fn to_unit_zero_size_is_none() {
    let t = Transform::at(0.0, 0.0, 0.0, 10.0);
    assert!(t.to_unit(Point::new(0.0, 0.0)).is_none());
}

#[test]
fn transform_deserializes_with_defaults() {
    let t: Transform = serde_json::from_str(r#"{"left":1,"top":2,"width":3,"height":4}"#).unwrap();
    assert_eq!(t.scale_x, 1.0);
    assert_eq!(t.scale_y, 1.0);
    assert_eq!(t.angle, 0.0);
    assert!(!t.flip_x);
}

#[test]
fn transform_serializes_camel_case() {
    let json = serde_json::to_string(&Transform::default()).unwrap();
    assert!(json.contains("\"scaleX\""));
    assert!(json.contains("\"flipY\""));
}

#[test]
fn transform_non_finite_detected() {
    let t = Transform { angle: f64::INFINITY, ..Transform::default() };
    assert!(!t.is_finite());
    assert!(Transform::default().is_finite());
}
