use super::*;
use canvas::geometry::Transform;
use canvas::render::BoxRasterizer;
use canvas::scene::{Content, ShapeContent, ShapeKind};
use image::Rgba;

fn rect(left: f64, top: f64, fill: &str) -> SceneObject {
    SceneObject::artwork(
        Transform::at(left, top, 20.0, 20.0),
        Content::Shape(ShapeContent { shape: ShapeKind::Rect, fill: fill.into(), stroke: None, stroke_width: 0.0 }),
    )
}

#[test]
fn empty_image_has_no_colors() {
    let sample = sample_colors(&RgbaImage::new(0, 0), 40.0);
    assert_eq!(sample, ColorSample::default());
}

#[test]
fn near_colors_merge_distant_colors_do_not() {
    let mut img = RgbaImage::new(3, 1);
    img.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
    img.put_pixel(1, 0, Rgba([205, 3, 2, 255]));
    img.put_pixel(2, 0, Rgba([0, 0, 200, 255]));
    let sample = sample_colors(&img, 40.0);
    assert_eq!(sample.count, 2);
    assert_eq!(sample.colors[0], "#c80000");
}

#[test]
fn transparent_pixels_are_ignored() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
    img.put_pixel(1, 0, Rgba([250, 250, 250, 127]));
    assert_eq!(sample_colors(&img, 40.0).colors, vec!["#0a0a0a".to_string()]);
}

#[test]
fn zero_sensitivity_keeps_every_exact_color() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
    img.put_pixel(1, 0, Rgba([101, 100, 100, 255]));
    assert_eq!(sample_colors(&img, 0.0).count, 2);
}

#[test]
fn scene_sampling_excludes_background() {
    let mut scene = Scene::new("front", vec![]);
    scene.set_background(SceneObject::background("tee.png", Transform::at(0.0, 0.0, 200.0, 200.0)));
    scene.add(rect(10.0, 10.0, "#ff0000"));
    scene.add(rect(50.0, 10.0, "#00ff00"));

    let mut raster = BoxRasterizer::new();
    let mut photo = RgbaImage::new(4, 4);
    for px in photo.pixels_mut() {
        *px = Rgba([0, 0, 255, 255]);
    }
    raster.insert_bitmap("tee.png", photo);

    let sample = sample_scene(&scene, &raster, 40.0);
    assert_eq!(sample.count, 2);
    assert!(!sample.colors.contains(&"#0000ff".to_string()));
}

#[test]
fn object_sampling_renders_only_that_object() {
    let mut scene = Scene::new("front", vec![]);
    let red = rect(10.0, 10.0, "#ff0000");
    let red_id = red.id;
    scene.add(red);
    scene.add(rect(50.0, 10.0, "#00ff00"));

    let sample = sample_object(&scene, &red_id, &BoxRasterizer::new(), 40.0);
    assert_eq!(sample.colors, vec!["#ff0000".to_string()]);
}

#[test]
fn sampling_does_not_mutate_the_scene() {
    let mut scene = Scene::new("front", vec![]);
    scene.add(rect(0.0, 0.0, "#123456"));
    let before = scene.version();
    sample_scene(&scene, &BoxRasterizer::new(), 40.0);
    assert_eq!(scene.version(), before);
}
