#![allow(clippy::float_cmp)]

use super::*;

fn text(label: &str) -> Content {
    Content::Text(TextContent::new(label, "Noto Sans", 24.0, "#112233"))
}

fn rect_shape() -> Content {
    Content::Shape(ShapeContent { shape: ShapeKind::Rect, fill: "#ff0000".into(), stroke: None, stroke_width: 0.0 })
}

fn scene_with_background() -> Scene {
    let mut scene = Scene::new("front", vec!["body".into(), "sleeve".into()]);
    scene.set_background(SceneObject::background("front.png", Transform::at(0.0, 0.0, 800.0, 900.0)));
    scene
}

// =============================================================
// PrintMethod
// =============================================================

#[test]
fn print_method_serializes_snake_case() {
    let cases = [
        (PrintMethod::Dtf, "\"dtf\""),
        (PrintMethod::Dtg, "\"dtg\""),
        (PrintMethod::ScreenPrinting, "\"screen_printing\""),
        (PrintMethod::Embroidery, "\"embroidery\""),
        (PrintMethod::Applique, "\"applique\""),
    ];
    for (method, expected) in cases {
        assert_eq!(serde_json::to_string(&method).unwrap(), expected);
        assert_eq!(format!("\"{method}\""), expected);
    }
}

#[test]
fn print_method_rejects_unknown() {
    assert!(serde_json::from_str::<PrintMethod>("\"sublimation\"").is_err());
}

#[test]
fn transfer_and_bulk_partition_all_methods() {
    let transfer: Vec<_> = PrintMethod::ALL.iter().filter(|m| m.is_transfer()).collect();
    let bulk: Vec<_> = PrintMethod::ALL.iter().filter(|m| m.is_bulk()).collect();
    assert_eq!(transfer, [&PrintMethod::Dtf, &PrintMethod::Dtg]);
    assert_eq!(bulk.len(), 3);
}

// =============================================================
// Content serde
// =============================================================

#[test]
fn content_is_tagged_by_kind() {
    let json = serde_json::to_value(text("hi")).unwrap();
    assert_eq!(json["kind"], "text");
    assert_eq!(json["fontFamily"], "Noto Sans");
    assert_eq!(json["fontSize"], 24.0);
}

#[test]
fn content_text_defaults_on_missing_style_fields() {
    let raw = r##"{"kind":"text","text":"a","fontFamily":"Arial","fontSize":12,"fill":"#000"}"##;
    let content: Content = serde_json::from_str(raw).unwrap();
    let Content::Text(t) = content else {
        panic!("expected text content");
    };
    assert_eq!(t.font_weight, "normal");
    assert_eq!(t.font_style, "normal");
    assert_eq!(t.text_align, "left");
}

#[test]
fn content_shape_roundtrip() {
    let content = rect_shape();
    let json = serde_json::to_string(&content).unwrap();
    assert!(!json.contains("stroke\""), "absent stroke is skipped: {json}");
    let back: Content = serde_json::from_str(&json).unwrap();
    assert_eq!(back, content);
    assert_eq!(back.kind(), ObjectKind::Shape);
}

#[test]
fn content_unknown_kind_rejected() {
    assert!(serde_json::from_str::<Content>(r#"{"kind":"video","src":"x"}"#).is_err());
}

#[test]
fn text_weight_and_style_flags() {
    let mut t = TextContent::new("a", "Arial", 10.0, "#000");
    assert!(!t.is_bold());
    t.font_weight = "700".into();
    t.font_style = "italic".into();
    assert!(t.is_bold());
    assert!(t.is_italic());
}

// =============================================================
// Node roles
// =============================================================

#[test]
fn background_and_guides_are_not_exportable() {
    let bg = SceneObject::background("x.png", Transform::default());
    let guide = SceneObject::guide(Rect::new(0.0, 100.0, 800.0, 0.0));
    let art = SceneObject::artwork(Transform::default(), text("a"));
    assert!(bg.is_background() && !bg.is_exportable());
    assert!(guide.is_guide() && !guide.is_exportable());
    assert!(art.is_exportable());
    assert!(!bg.selectable && !bg.evented);
}

// =============================================================
// Scene store
// =============================================================

#[test]
fn new_scene_is_empty_at_version_zero() {
    let scene = Scene::new("back", vec![]);
    assert!(scene.is_empty());
    assert_eq!(scene.version(), 0);
    assert_eq!(scene.side_id(), "back");
}

#[test]
fn every_mutation_bumps_version() {
    let mut scene = scene_with_background();
    let mut last = scene.version();
    let node = SceneObject::artwork(Transform::at(0.0, 0.0, 10.0, 10.0), rect_shape());
    let id = node.id;

    scene.add(node);
    assert!(scene.version() > last);
    last = scene.version();

    assert!(scene.set_transform(&id, Transform::at(5.0, 5.0, 10.0, 10.0)));
    assert!(scene.version() > last);
    last = scene.version();

    assert!(scene.set_print_method(&id, Some(PrintMethod::Dtg)));
    assert!(scene.version() > last);
    last = scene.version();

    assert!(scene.set_content(&id, text("b")));
    assert!(scene.version() > last);
    last = scene.version();

    scene.touch();
    assert!(scene.version() > last);
    last = scene.version();

    assert!(scene.remove(&id).is_some());
    assert!(scene.version() > last);
}

#[test]
fn failed_mutations_leave_version_unchanged() {
    let mut scene = scene_with_background();
    let before = scene.version();
    let missing = Uuid::new_v4();
    assert!(!scene.set_transform(&missing, Transform::default()));
    assert!(!scene.set_print_method(&missing, None));
    assert!(scene.remove(&missing).is_none());
    assert_eq!(scene.version(), before);
}

#[test]
fn set_background_replaces_and_stays_first() {
    let mut scene = scene_with_background();
    scene.add(SceneObject::artwork(Transform::default(), rect_shape()));
    scene.set_background(SceneObject::background("other.png", Transform::default()));
    let backgrounds = scene.nodes().filter(|n| n.is_background()).count();
    assert_eq!(backgrounds, 1);
    assert!(scene.nodes().next().is_some_and(SceneObject::is_background));
}

#[test]
fn adding_a_background_node_replaces_the_marker() {
    let mut scene = scene_with_background();
    scene.add(SceneObject::artwork(Transform::default(), rect_shape()));
    scene.add(SceneObject::background("again.png", Transform::default()));
    assert_eq!(scene.nodes().filter(|n| n.is_background()).count(), 1);
    assert!(scene.nodes().next().is_some_and(SceneObject::is_background));
    assert!(scene.background().is_some_and(|b| matches!(&b.content, Content::Image(i) if i.src == "again.png")));
}

#[test]
fn add_with_same_id_replaces_in_place() {
    let mut scene = scene_with_background();
    let node = SceneObject::artwork(Transform::default(), text("first"));
    let id = node.id;
    scene.add(node.clone());
    scene.add(SceneObject { content: text("second"), ..node });
    assert_eq!(scene.artwork().count(), 1);
    assert_eq!(scene.get(&id).map(|n| n.content.clone()), Some(text("second")));
}

#[test]
fn metadata_lives_in_side_table() {
    let mut scene = scene_with_background();
    let node = SceneObject::artwork(Transform::default(), rect_shape());
    let id = node.id;
    scene.add_with_metadata(node, ObjectMetadata { print_method: Some(PrintMethod::Embroidery) });
    assert_eq!(scene.metadata(&id).and_then(|m| m.print_method), Some(PrintMethod::Embroidery));

    scene.remove(&id);
    assert!(scene.metadata(&id).is_none());
}

#[test]
fn print_method_cannot_be_set_on_background() {
    let mut scene = scene_with_background();
    let bg_id = scene.background().map(|b| b.id).unwrap();
    assert!(!scene.set_print_method(&bg_id, Some(PrintMethod::Dtf)));
}

#[test]
fn clear_artwork_keeps_background_and_guides() {
    let mut scene = scene_with_background();
    scene.add(SceneObject::guide(Rect::new(400.0, 0.0, 0.0, 900.0)));
    scene.add(SceneObject::artwork(Transform::default(), rect_shape()));
    scene.add(SceneObject::artwork(Transform::default(), text("x")));

    let removed = scene.clear_artwork();
    assert_eq!(removed, 2);
    assert_eq!(scene.len(), 2);
    assert_eq!(scene.artwork().count(), 0);
}

#[test]
fn set_interactive_only_touches_artwork() {
    let mut scene = scene_with_background();
    scene.add(SceneObject::artwork(Transform::default(), rect_shape()));
    scene.set_interactive(false);
    assert!(scene.artwork().all(|n| !n.selectable && !n.evented));

    scene.set_interactive(true);
    assert!(scene.artwork().all(|n| n.selectable && n.evented));
    assert!(scene.background().is_some_and(|b| !b.selectable));
}

#[test]
fn has_layer_checks_declared_layers() {
    let scene = scene_with_background();
    assert!(scene.has_layer("body"));
    assert!(!scene.has_layer("hood"));
    assert_eq!(scene.layers().len(), 2);
}

#[test]
fn metadata_serializes_without_absent_method() {
    let json = serde_json::to_string(&ObjectMetadata::default()).unwrap();
    assert_eq!(json, "{}");
}
