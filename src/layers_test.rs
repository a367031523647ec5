use super::*;
use canvas::scene::Scene;

fn mounted() -> CanvasRegistry {
    let reg = CanvasRegistry::new();
    reg.register(Scene::new("front", vec!["body".into(), "sleeves".into()]));
    reg.register(Scene::new("back", vec!["body".into()]));
    reg.register(Scene::new("sleeve", vec!["sleeves".into()]));
    reg
}

#[test]
fn color_propagates_to_sides_sharing_the_layer() {
    let reg = mounted();
    let store = LayerColorStore::new();
    let written = store.set(&reg, "front", "body", "#FF0000").unwrap();
    assert_eq!(written, vec!["back".to_string(), "front".to_string()]);
    assert_eq!(store.get("front", "body").as_deref(), Some("#ff0000"));
    assert_eq!(store.get("back", "body").as_deref(), Some("#ff0000"));
    assert!(store.get("sleeve", "body").is_none());
}

#[test]
fn propagation_bumps_versions_of_touched_scenes_only() {
    let reg = mounted();
    let store = LayerColorStore::new();
    store.set(&reg, "sleeve", "sleeves", "0f0").unwrap();
    let versions: BTreeMap<String, u64> = reg.versions().into_iter().map(|v| (v.side_id, v.version)).collect();
    assert_eq!(versions["front"], 1);
    assert_eq!(versions["sleeve"], 1);
    assert_eq!(versions["back"], 0);
    assert_eq!(store.get("front", "sleeves").as_deref(), Some("#00ff00"));
}

#[test]
fn invalid_color_writes_nothing() {
    let reg = mounted();
    let store = LayerColorStore::new();
    let err = store.set(&reg, "front", "body", "crimson").unwrap_err();
    assert_eq!(err.code(), "E_LAYER_COLOR");
    assert!(store.snapshot("front").is_empty());
    assert!(reg.versions().iter().all(|v| v.version == 0));
}

#[test]
fn unmounted_origin_still_records_its_own_color() {
    let reg = CanvasRegistry::new();
    let store = LayerColorStore::new();
    let written = store.set(&reg, "front", "body", "#123456").unwrap();
    assert_eq!(written, vec!["front".to_string()]);
    assert_eq!(store.snapshot("front").get("body").map(String::as_str), Some("#123456"));
}

#[test]
fn apply_skips_invalid_entries() {
    let reg = mounted();
    let store = LayerColorStore::new();
    let mut saved = SideLayerColors::new();
    saved.insert("body".into(), "#abcdef".into());
    saved.insert("sleeves".into(), "not-a-color".into());
    let diags = store.apply(&reg, "front", &saved);
    assert_eq!(diags.len(), 1);
    assert_eq!(store.get("back", "body").as_deref(), Some("#abcdef"));
    assert!(store.get("front", "sleeves").is_none());
}

#[test]
fn later_write_wins() {
    let reg = mounted();
    let store = LayerColorStore::new();
    store.set(&reg, "front", "body", "#111111").unwrap();
    store.set(&reg, "back", "body", "#222222").unwrap();
    assert_eq!(store.get("front", "body").as_deref(), Some("#222222"));
}
