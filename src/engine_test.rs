use super::*;
use crate::catalog::{BackgroundImage, BulkPricing, PricingTable, RealLifeDimensions, Side, TransferPricing};
use crate::design::PlacedObject;
use canvas::geometry::Rect;
use canvas::scene::{Content, ImageContent, ObjectMetadata, PrintMethod, SceneObject, TextContent};
use uuid::Uuid;

fn side(id: &str, layers: &[&str]) -> Side {
    Side {
        id: id.into(),
        name: id.into(),
        print_area: Rect::new(100.0, 100.0, 600.0, 700.0),
        real_life_dimensions: RealLifeDimensions { product_width_mm: 500.0 },
        zoom_scale: 1.0,
        background: Some(BackgroundImage { url: format!("{id}.png"), width: 800.0, height: 900.0 }),
        layers: layers.iter().map(|l| (*l).to_string()).collect(),
    }
}

fn engine() -> DesignEngine {
    let catalog = Catalog {
        sides: vec![side("front", &["body"]), side("back", &["body"])],
        pricing: PricingTable {
            dtf: Some(TransferPricing { price_per_mm2: Some(5.0), brackets: vec![] }),
            embroidery: Some(BulkPricing::flat(30_000.0, 50, 400.0)),
            ..PricingTable::default()
        },
    };
    DesignEngine::new(catalog, EngineConfig::default())
}

fn design() -> DesignState {
    let mut state = DesignState::new();
    state.insert(
        "front",
        SideDesign {
            objects: vec![
                PlacedObject {
                    object_id: Uuid::new_v4(),
                    transform: Transform::at(200.0, 200.0, 160.0, 160.0),
                    content: Content::Image(ImageContent { src: "logo.png".into() }),
                    print_method: Some(PrintMethod::Dtf),
                    opacity: 1.0,
                },
                PlacedObject {
                    object_id: Uuid::new_v4(),
                    transform: Transform::at(200.0, 500.0, 80.0, 40.0),
                    content: Content::Text(TextContent::new("Crew", "Roboto", 24.0, "#ffffff")),
                    print_method: Some(PrintMethod::Embroidery),
                    opacity: 1.0,
                },
            ],
            ..SideDesign::default()
        },
    );
    state
}

#[test]
fn mount_side_installs_background_marker() {
    let engine = engine();
    engine.mount_side("front").unwrap();
    let bg = engine.registry().with_scene("front", |s| s.background().map(|b| b.bounding_rect())).unwrap();
    assert_eq!(bg, Some(Rect::new(0.0, 0.0, 800.0, 900.0)));
    assert!(!engine.registry().is_ready("front"));
}

#[test]
fn mount_unknown_side_is_diagnostic() {
    assert_eq!(engine().mount_side("hood").unwrap_err().code(), "E_UNKNOWN_SIDE");
}

#[test]
fn mount_all_makes_every_side_ready() {
    let engine = engine();
    engine.mount_all();
    assert!(engine.registry().is_ready("front"));
    assert!(engine.registry().is_ready("back"));
}

#[tokio::test]
async fn restore_then_quote() {
    let engine = engine();
    engine.mount_all();
    let original = design();
    let report = engine.restore(&original).await;
    assert_eq!(report.restored.get("front"), Some(&2));

    let quote = engine.price_sides(50);
    assert!((quote.total_additional_price - 50_600.0).abs() < 1e-6);

    let saved = engine.save();
    assert_eq!(saved.side("front").map(|d| &d.objects), original.side("front").map(|d| &d.objects));
    assert!(saved.side("back").is_some_and(|d| d.objects.is_empty()));
}

#[tokio::test]
async fn quotes_are_recomputed_after_mutation() {
    let engine = engine();
    engine.mount_all();
    engine.restore(&design()).await;
    let before = engine.price_sides(50);
    assert_eq!(engine.price_sides(50), before);

    let id = engine.save_side("front").unwrap().objects[0].object_id;
    engine.registry().with_scene_mut("front", |s| s.remove(&id)).unwrap();
    let after = engine.price_sides(50);
    assert!((after.total_additional_price - 600.0).abs() < 1e-6);
}

#[tokio::test]
async fn edit_mode_applies_to_live_and_restored_artwork() {
    let engine = engine();
    engine.mount_all();
    engine.set_edit_mode(false);
    assert!(!engine.edit_mode());
    engine.restore(&design()).await;
    let interactive = engine.registry().with_scene("front", |s| s.artwork().any(|n| n.selectable)).unwrap();
    assert!(!interactive);

    engine.set_edit_mode(true);
    let all = engine.registry().with_scene("front", |s| s.artwork().all(|n| n.selectable && n.evented)).unwrap();
    assert!(all);
}

#[test]
fn layer_color_reaches_every_side() {
    let engine = engine();
    engine.mount_all();
    let sides = engine.set_layer_color("front", "body", "#abc").unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(engine.save().side("back").map(|d| d.layer_colors["body"].clone()), Some("#aabbcc".to_string()));
}

#[test]
fn export_text_uses_engine_fonts() {
    let engine = engine();
    let report = engine.export_text(&design());
    assert_eq!(report.sides["front"].len(), 1);
}

#[test]
fn upload_store_follows_config() {
    assert!(engine().upload_store().unwrap().is_none());
    let config = EngineConfig { upload_url: Some("https://assets.example.test".into()), ..EngineConfig::default() };
    let engine = DesignEngine::new(Catalog::default(), config);
    assert!(engine.upload_store().unwrap().is_some());
}

#[test]
fn unmount_removes_side_from_save() {
    let engine = engine();
    engine.mount_all();
    engine.unmount_side("back");
    assert!(engine.save().side("back").is_none());
}

fn add_dtf_square(engine: &DesignEngine, side_id: &str, px: f64) {
    let node = SceneObject::artwork(Transform::at(200.0, 200.0, px, px), Content::Image(ImageContent { src: "logo.png".into() }));
    let meta = ObjectMetadata { print_method: Some(PrintMethod::Dtf) };
    engine.registry().with_scene_mut(side_id, |s| s.add_with_metadata(node, meta)).unwrap();
}

#[test]
fn quote_follows_background_load() {
    let engine = engine();
    engine.mount_side("front").unwrap();
    add_dtf_square(&engine, "front", 160.0);
    let before = engine.price_sides(1);
    assert!((before.total_additional_price - 8_000.0).abs() < 1e-6);

    engine.mark_image_loaded("front", BackgroundMetrics::rendered(1600.0, 1800.0)).unwrap();
    let after = engine.price_sides(1);
    assert!((after.total_additional_price - 12_500.0).abs() < 1e-6);
}

#[test]
fn quote_follows_background_resize() {
    let engine = engine();
    engine.mount_all();
    add_dtf_square(&engine, "front", 160.0);
    let before = engine.price_sides(1);
    assert!((before.total_additional_price - 50_000.0).abs() < 1e-6);

    engine.registry().set_background_metrics("front", BackgroundMetrics::rendered(1000.0, 1125.0)).unwrap();
    let after = engine.price_sides(1);
    assert!((after.total_additional_price - 32_000.0).abs() < 1e-6);
}

#[test]
fn remounted_side_is_not_served_a_stale_quote() {
    let engine = engine();
    engine.mount_all();
    add_dtf_square(&engine, "front", 100.0);
    let small = engine.price_sides(1);
    assert!((small.total_additional_price - 19_531.25).abs() < 1e-6);

    engine.unmount_side("front");
    engine.mount_side("front").unwrap();
    engine.mark_image_loaded("front", BackgroundMetrics::rendered(800.0, 900.0)).unwrap();
    add_dtf_square(&engine, "front", 300.0);
    let big = engine.price_sides(1);
    assert!((big.total_additional_price - 175_781.25).abs() < 1e-6);
}
