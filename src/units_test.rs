use super::*;
use crate::catalog::{BackgroundImage, RealLifeDimensions};

fn side(product_width_mm: f64) -> Side {
    Side {
        id: "front".into(),
        name: "Front".into(),
        print_area: Rect::new(200.0, 150.0, 400.0, 500.0),
        real_life_dimensions: RealLifeDimensions { product_width_mm },
        zoom_scale: 0.5,
        background: Some(BackgroundImage { url: "tee.png".into(), width: 1600.0, height: 1800.0 }),
        layers: vec![],
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn ratio_is_product_width_over_rendered_width() {
    let ratio = pixel_to_mm_ratio(&side(500.0), Some(800.0), 0.25);
    assert!(approx(ratio, 0.625));
    assert!(approx(pixels_to_mm(100.0, ratio), 62.5));
}

#[test]
fn unknown_width_uses_fallback() {
    assert!(approx(pixel_to_mm_ratio(&side(500.0), None, 0.25), 0.25));
    assert!(approx(pixel_to_mm_ratio(&side(500.0), Some(0.0), 0.25), 0.25));
    assert!(approx(pixel_to_mm_ratio(&side(500.0), Some(f64::NAN), 0.3), 0.3));
}

#[test]
fn rect_to_mm_reports_area() {
    let size = rect_to_mm(&Rect::new(10.0, 10.0, 160.0, 160.0), 0.625);
    assert!(approx(size.width_mm, 100.0));
    assert!(approx(size.height_mm, 100.0));
    assert!(approx(size.area_mm2(), 10_000.0));
}

#[test]
fn zero_size_rect_has_zero_area() {
    let size = rect_to_mm(&Rect::new(10.0, 10.0, 0.0, 50.0), 0.625);
    assert!(approx(size.area_mm2(), 0.0));
}

#[test]
fn metrics_for_side_apply_zoom() {
    let m = BackgroundMetrics::for_side(&side(500.0)).unwrap();
    assert!(approx(m.rendered_width, 800.0));
    assert!(approx(m.rendered_height, 900.0));
    assert_eq!(m.natural_width, Some(1600.0));
}

#[test]
fn print_area_scales_by_rendered_over_natural() {
    let s = side(500.0);
    let metrics = BackgroundMetrics { left: 20.0, top: 10.0, rendered_width: 800.0, rendered_height: 900.0, natural_width: Some(1600.0) };
    let area = print_area_on_canvas(&s, &metrics);
    assert_eq!(area, Rect::new(120.0, 85.0, 200.0, 250.0));
}

#[test]
fn print_area_without_natural_width_uses_zoom() {
    let mut s = side(500.0);
    s.background = None;
    let area = print_area_on_canvas(&s, &BackgroundMetrics::rendered(800.0, 900.0));
    assert_eq!(area, Rect::new(100.0, 75.0, 200.0, 250.0));
}
