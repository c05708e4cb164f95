#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;

fn rect_at(x: f64, y: f64, w: f64, h: f64) -> SceneObject {
    let mut desc = ObjectDescriptor::new(ObjectKind::Rectangle(ShapeProps::default()), x, y);
    desc.width = Some(w);
    desc.height = Some(h);
    desc.into_object()
}

fn tilemap(columns: u32, rows: u32) -> SceneObject {
    ObjectDescriptor::new(ObjectKind::Tilemap(TilemapProps::new(None, 32.0, columns, rows)), 0.0, 0.0).into_object()
}

fn store() -> SceneStore {
    SceneStore::new(Scene::default())
}

// =============================================================
// Scene construction
// =============================================================

#[test]
fn new_scene_has_one_active_layer() {
    let scene = Scene::new(SceneConfig::default());
    assert_eq!(scene.layers.len(), 1);
    assert_eq!(scene.active_layer, Some(scene.layers[0].id));
    assert!(scene.layers[0].visible);
}

#[test]
fn new_scene_uses_config() {
    let scene = Scene::new(SceneConfig {
        name: "Level 1".into(),
        width: 1024.0,
        height: 768.0,
        background_color: "#000".into(),
    });
    assert_eq!(scene.name, "Level 1");
    assert_eq!(scene.size(), Size::new(1024.0, 768.0));
    assert_eq!(scene.background_color, "#000");
}

// =============================================================
// Serde
// =============================================================

#[test]
fn object_serializes_type_tag_flat() {
    let obj = rect_at(1.0, 2.0, 3.0, 4.0);
    let v = serde_json::to_value(&obj).unwrap();
    assert_eq!(v["type"], "rectangle");
    assert_eq!(v["fillColor"], "#4a90d9");
    assert_eq!(v["x"], 1.0);
}

#[test]
fn object_deserializes_with_defaults() {
    let id = Uuid::new_v4();
    let obj: SceneObject = serde_json::from_value(json!({
        "id": id, "type": "sprite", "x": 5, "y": 6, "width": 10, "height": 12, "imageId": "hero"
    }))
    .unwrap();
    assert_eq!(obj.id, id);
    assert_eq!(obj.rotation, 0.0);
    assert!(obj.enabled);
    let ObjectKind::Sprite(sp) = obj.kind else {
        panic!("expected sprite");
    };
    assert_eq!(sp.image_id.as_deref(), Some("hero"));
    assert_eq!(sp.opacity, 1.0);
}

#[test]
fn unrecognized_type_becomes_unknown() {
    let obj: SceneObject = serde_json::from_value(json!({
        "id": Uuid::new_v4(), "type": "particle-emitter", "x": 0, "y": 0, "width": 1, "height": 1, "rate": 30
    }))
    .unwrap();
    let ObjectKind::Unknown { type_name, extra } = &obj.kind else {
        panic!("expected unknown");
    };
    assert_eq!(type_name, "particle-emitter");
    assert_eq!(extra.get("rate"), Some(&json!(30)));
    assert!(!extra.contains_key("x"));
    assert!(!extra.contains_key("type"));
    assert_eq!(obj.kind.type_name(), "particle-emitter");
}

#[test]
fn unknown_type_survives_save_round_trip() {
    let id = Uuid::new_v4();
    let raw = json!({
        "id": id, "name": "Outline", "type": "polygon", "x": 1, "y": 2, "width": 3, "height": 4,
        "points": [1, 2, 3], "closed": true
    });
    let obj: SceneObject = serde_json::from_value(raw).unwrap();
    let saved = serde_json::to_value(&obj).unwrap();
    assert_eq!(saved["type"], "polygon");
    assert_eq!(saved["points"], json!([1, 2, 3]));
    assert_eq!(saved["closed"], true);
    assert_eq!(saved["x"], 1.0);

    let reloaded: SceneObject = serde_json::from_value(saved).unwrap();
    assert_eq!(reloaded, obj);
}

#[test]
fn object_without_type_is_rejected() {
    let raw = json!({ "id": Uuid::new_v4(), "x": 0, "y": 0, "width": 1, "height": 1 });
    assert!(serde_json::from_value::<SceneObject>(raw).is_err());
}

#[test]
fn known_type_with_bad_props_is_rejected() {
    let raw = json!({ "id": Uuid::new_v4(), "type": "rectangle", "x": 0, "y": 0, "width": 1, "height": 1, "borderWidth": "thick" });
    assert!(serde_json::from_value::<SceneObject>(raw).is_err());
}

#[test]
fn scene_json_uses_camel_case() {
    let v = serde_json::to_value(Scene::default()).unwrap();
    assert!(v.get("backgroundColor").is_some());
    assert!(v.get("activeLayer").is_some());
}

#[test]
fn type_names() {
    assert_eq!(ObjectKind::Rectangle(ShapeProps::default()).type_name(), "rectangle");
    assert_eq!(ObjectKind::Circle(ShapeProps::default()).type_name(), "circle");
    assert_eq!(ObjectKind::Text(TextProps::default()).type_name(), "text");
    assert_eq!(ObjectKind::Tilemap(TilemapProps::default()).type_name(), "tilemap");
    let unknown = ObjectKind::Unknown { type_name: "emitter".into(), extra: serde_json::Map::new() };
    assert_eq!(unknown.type_name(), "emitter");
}

// =============================================================
// SceneObject geometry
// =============================================================

#[test]
fn contains_is_edge_inclusive() {
    let obj = rect_at(100.0, 100.0, 50.0, 50.0);
    assert!(obj.contains(Point::new(100.0, 100.0)));
    assert!(obj.contains(Point::new(150.0, 150.0)));
    assert!(obj.contains(Point::new(125.0, 125.0)));
    assert!(!obj.contains(Point::new(150.1, 125.0)));
    assert!(!obj.contains(Point::new(10.0, 10.0)));
}

#[test]
fn center_is_box_midpoint() {
    let obj = rect_at(10.0, 20.0, 40.0, 60.0);
    assert_eq!(obj.center(), Point::new(30.0, 50.0));
}

// =============================================================
// ObjectDescriptor
// =============================================================

#[test]
fn descriptor_defaults_size_and_name() {
    let obj = ObjectDescriptor::new(ObjectKind::Circle(ShapeProps::default()), 3.0, 4.0).into_object();
    assert_eq!(obj.width, 100.0);
    assert_eq!(obj.height, 100.0);
    assert_eq!(obj.name, "circle");
    assert!(obj.enabled);
}

#[test]
fn descriptor_generates_unique_ids() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(0.0, 0.0, 1.0, 1.0);
    assert_ne!(a.id, b.id);
}

#[test]
fn descriptor_tilemap_sizes_from_grid() {
    let obj = tilemap(4, 3);
    assert_eq!(obj.width, 128.0);
    assert_eq!(obj.height, 96.0);
}

#[test]
fn descriptor_tilemap_normalizes_data() {
    let tm = TilemapProps { tileset: None, tile_size: 16.0, columns: 2, rows: 2, tile_data: vec![1] };
    let obj = ObjectDescriptor::new(ObjectKind::Tilemap(tm), 0.0, 0.0).into_object();
    let ObjectKind::Tilemap(tm) = obj.kind else {
        panic!("expected tilemap");
    };
    assert_eq!(tm.tile_data, vec![1, 0, 0, 0]);
}

// =============================================================
// TilemapProps
// =============================================================

#[test]
fn cell_at_maps_point_to_cell() {
    let tm = TilemapProps::new(None, 32.0, 10, 10);
    assert_eq!(tm.cell_at(Point::new(35.0, 67.0)), Some((1, 2)));
    assert_eq!(tm.index(1, 2), 21);
}

#[test]
fn cell_at_out_of_bounds_is_none() {
    let tm = TilemapProps::new(None, 32.0, 10, 10);
    assert_eq!(tm.cell_at(Point::new(-1.0, 5.0)), None);
    assert_eq!(tm.cell_at(Point::new(320.0, 5.0)), None);
    assert_eq!(tm.cell_at(Point::new(5.0, 320.0)), None);
    assert_eq!(tm.cell_at(Point::new(319.9, 319.9)), Some((9, 9)));
}

#[test]
fn cell_at_zero_tile_size_is_none() {
    let tm = TilemapProps::new(None, 0.0, 10, 10);
    assert_eq!(tm.cell_at(Point::new(5.0, 5.0)), None);
}

#[test]
fn set_and_get_cell() {
    let mut tm = TilemapProps::new(None, 32.0, 3, 2);
    assert!(tm.set(2, 1, 7));
    assert_eq!(tm.get(2, 1), Some(7));
    assert_eq!(tm.tile_data[5], 7);
    assert!(!tm.set(3, 0, 1));
    assert_eq!(tm.get(0, 2), None);
}

#[test]
fn resize_preserves_overlap() {
    let mut tm = TilemapProps::new(None, 32.0, 3, 2);
    tm.tile_data = vec![1, 2, 3, 4, 5, 6];
    assert!(tm.resize(2, 3));
    assert_eq!(tm.columns, 2);
    assert_eq!(tm.rows, 3);
    assert_eq!(tm.tile_data, vec![1, 2, 4, 5, 0, 0]);
}

#[test]
fn resize_to_zero_empties_data() {
    let mut tm = TilemapProps::new(None, 32.0, 3, 2);
    assert!(tm.resize(0, 5));
    assert!(tm.tile_data.is_empty());
}

#[test]
fn cell_count_is_capped() {
    assert_eq!(cell_count(3, 2), Some(6));
    assert_eq!(cell_count(0, u32::MAX), Some(0));
    assert_eq!(cell_count(u32::MAX, u32::MAX), None);
    assert_eq!(cell_count(4_000_000_000, 4_000_000_000), None);
    assert!(cell_count(2048, 2048).is_some_and(|n| n <= MAX_TILEMAP_CELLS));
    assert_eq!(cell_count(2049, 2048), None);
}

#[test]
fn oversized_resize_is_refused() {
    let mut tm = TilemapProps::new(None, 32.0, 3, 2);
    tm.tile_data = vec![1, 2, 3, 4, 5, 6];
    assert!(!tm.resize(4_000_000_000, 4_000_000_000));
    assert_eq!((tm.columns, tm.rows), (3, 2));
    assert_eq!(tm.tile_data, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn oversized_tilemap_allocates_nothing() {
    let mut tm = TilemapProps::new(None, 32.0, u32::MAX, u32::MAX);
    assert!(tm.tile_data.is_empty());
    assert!(!tm.normalize());
    assert!(tm.tile_data.is_empty());
}

// =============================================================
// SceneStore: insert / get / remove
// =============================================================

#[test]
fn insert_goes_to_active_layer() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    assert!(s.insert(obj));
    assert_eq!(s.layer_of(&id), s.active_layer());
    assert_eq!(s.len(), 1);
    assert!(s.get(&id).is_some());
}

#[test]
fn insert_duplicate_id_rejected() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    assert!(s.insert(obj.clone()));
    assert!(!s.insert(obj));
    assert_eq!(s.len(), 1);
}

#[test]
fn insert_without_layers_is_noop() {
    let mut scene = Scene::default();
    scene.layers.clear();
    let mut s = SceneStore::new(scene);
    assert!(s.active_layer().is_none());
    assert!(!s.insert(rect_at(0.0, 0.0, 1.0, 1.0)));
    assert!(s.is_empty());
}

#[test]
fn remove_clears_owner_index() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    let removed = s.remove(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(s.layer_of(&id).is_none());
    assert!(s.get(&id).is_none());
    assert!(s.layers()[0].objects.is_empty());
}

#[test]
fn remove_missing_returns_none() {
    let mut s = store();
    assert!(s.remove(&Uuid::new_v4()).is_none());
}

#[test]
fn objects_keep_insertion_order() {
    let mut s = store();
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(0.0, 0.0, 1.0, 1.0);
    let (ida, idb) = (a.id, b.id);
    s.insert(a);
    s.insert(b);
    let ids: Vec<_> = s.layers()[0].objects.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![ida, idb]);
}

// =============================================================
// SceneStore: load repair
// =============================================================

#[test]
fn load_drops_duplicate_ids() {
    let obj = rect_at(0.0, 0.0, 1.0, 1.0);
    let mut scene = Scene::default();
    scene.layers[0].objects.push(obj.clone());
    let mut second = Layer::new("Layer 2");
    let mut dup = obj.clone();
    dup.x = 99.0;
    second.objects.push(dup);
    scene.layers.push(second);

    let s = SceneStore::new(scene);
    assert_eq!(s.len(), 1);
    assert_eq!(s.get(&obj.id).unwrap().x, 0.0);
    assert!(s.layers()[1].objects.is_empty());
}

#[test]
fn load_repairs_dangling_active_layer() {
    let mut scene = Scene::default();
    scene.active_layer = Some(Uuid::new_v4());
    let top = scene.layers[0].id;
    let s = SceneStore::new(scene);
    assert_eq!(s.active_layer(), Some(top));
}

#[test]
fn load_normalizes_tilemap_data() {
    let mut obj = tilemap(2, 2);
    if let ObjectKind::Tilemap(tm) = &mut obj.kind {
        tm.tile_data = vec![9; 7];
    }
    let id = obj.id;
    let mut scene = Scene::default();
    scene.layers[0].objects.push(obj);
    let s = SceneStore::new(scene);
    let ObjectKind::Tilemap(tm) = &s.get(&id).unwrap().kind else {
        panic!("expected tilemap");
    };
    assert_eq!(tm.tile_data.len(), 4);
}

#[test]
fn load_drops_oversized_tilemap() {
    let big = tilemap(u32::MAX, u32::MAX);
    let (big_id, small) = (big.id, tilemap(2, 2));
    let small_id = small.id;
    let mut scene = Scene::default();
    scene.layers[0].objects = vec![big, small];
    let s = SceneStore::new(scene);
    assert!(s.get(&big_id).is_none());
    assert!(s.get(&small_id).is_some());
    assert_eq!(s.len(), 1);
    assert_eq!(s.layers()[0].objects.len(), 1);
}

#[test]
fn insert_refuses_oversized_tilemap() {
    let mut s = store();
    let big = tilemap(100_000, 100_000);
    let id = big.id;
    assert!(!s.insert(big));
    assert!(s.get(&id).is_none());
    assert_eq!(s.len(), 0);
}

// =============================================================
// SceneStore: apply_patch
// =============================================================

#[test]
fn patch_common_fields() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { x: Some(5.0), rotation: Some(45.0), name: Some("Box".into()), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    let obj = s.get(&id).unwrap();
    assert_eq!(obj.x, 5.0);
    assert_eq!(obj.y, 0.0);
    assert_eq!(obj.rotation, 45.0);
    assert_eq!(obj.name, "Box");
}

#[test]
fn patch_merges_variant_props() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { props: Some(json!({ "fillColor": "#ff0000" })), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    let ObjectKind::Rectangle(sp) = &s.get(&id).unwrap().kind else {
        panic!("expected rectangle");
    };
    assert_eq!(sp.fill_color, "#ff0000");
    assert_eq!(sp.border_width, 1.0);
}

#[test]
fn patch_cannot_change_type() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { props: Some(json!({ "type": "circle" })), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    assert_eq!(s.get(&id).unwrap().kind.type_name(), "rectangle");
}

#[test]
fn patch_null_resets_to_default() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    s.apply_patch(&id, &ObjectPatch { props: Some(json!({ "borderWidth": 4.0 })), ..Default::default() });
    s.apply_patch(&id, &ObjectPatch { props: Some(json!({ "borderWidth": null })), ..Default::default() });
    let ObjectKind::Rectangle(sp) = &s.get(&id).unwrap().kind else {
        panic!("expected rectangle");
    };
    assert_eq!(sp.border_width, 1.0);
}

#[test]
fn patch_with_bad_props_is_rejected_whole() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { x: Some(50.0), props: Some(json!({ "borderWidth": "thick" })), ..Default::default() };
    assert!(!s.apply_patch(&id, &patch));
    assert_eq!(s.get(&id).unwrap().x, 0.0);
}

#[test]
fn patch_missing_object_returns_false() {
    let mut s = store();
    assert!(!s.apply_patch(&Uuid::new_v4(), &ObjectPatch::default()));
}

#[test]
fn patch_tilemap_columns_reallocates() {
    let mut s = store();
    let mut obj = tilemap(3, 2);
    if let ObjectKind::Tilemap(tm) = &mut obj.kind {
        tm.tile_data = vec![1, 2, 3, 4, 5, 6];
    }
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { props: Some(json!({ "columns": 4, "rows": 1 })), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    let ObjectKind::Tilemap(tm) = &s.get(&id).unwrap().kind else {
        panic!("expected tilemap");
    };
    assert_eq!(tm.tile_data, vec![1, 2, 3, 0]);
    assert_eq!(tm.tile_data.len(), (tm.columns * tm.rows) as usize);
}

#[test]
fn patch_tilemap_explicit_data_is_normalized() {
    let mut s = store();
    let obj = tilemap(2, 2);
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { props: Some(json!({ "tileData": [4, 4, 4, 4, 4, 4] })), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    let ObjectKind::Tilemap(tm) = &s.get(&id).unwrap().kind else {
        panic!("expected tilemap");
    };
    assert_eq!(tm.tile_data, vec![4, 4, 4, 4]);
}

#[test]
fn patch_tilemap_to_oversized_grid_is_rejected() {
    let mut s = store();
    let mut obj = tilemap(3, 2);
    if let ObjectKind::Tilemap(tm) = &mut obj.kind {
        tm.tile_data = vec![1, 2, 3, 4, 5, 6];
    }
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch {
        x: Some(50.0),
        props: Some(json!({ "columns": 4_000_000_000_u32, "rows": 4_000_000_000_u32 })),
        ..Default::default()
    };
    assert!(!s.apply_patch(&id, &patch));
    let obj = s.get(&id).unwrap();
    assert_eq!(obj.x, 0.0);
    let ObjectKind::Tilemap(tm) = &obj.kind else {
        panic!("expected tilemap");
    };
    assert_eq!((tm.columns, tm.rows), (3, 2));
    assert_eq!(tm.tile_data, vec![1, 2, 3, 4, 5, 6]);

    // Explicit data does not bypass the cap.
    let patch = ObjectPatch { props: Some(json!({ "columns": 100_000, "rows": 100_000, "tileData": [] })), ..Default::default() };
    assert!(!s.apply_patch(&id, &patch));
}

#[test]
fn patch_unknown_type_keeps_its_tag() {
    let mut s = store();
    let obj: SceneObject = serde_json::from_value(json!({
        "id": Uuid::new_v4(), "type": "polygon", "x": 0, "y": 0, "width": 1, "height": 1, "points": [1]
    }))
    .unwrap();
    let id = obj.id;
    s.insert(obj);
    let patch = ObjectPatch { props: Some(json!({ "points": [4, 5], "type": "rectangle" })), ..Default::default() };
    assert!(s.apply_patch(&id, &patch));
    let ObjectKind::Unknown { type_name, extra } = &s.get(&id).unwrap().kind else {
        panic!("expected unknown");
    };
    assert_eq!(type_name, "polygon");
    assert_eq!(extra.get("points"), Some(&json!([4, 5])));
}

// =============================================================
// Layers
// =============================================================

#[test]
fn add_layer_appends_and_activates() {
    let mut s = store();
    let id = s.add_layer("Foreground");
    assert_eq!(s.layers().len(), 2);
    assert_eq!(s.layers()[1].id, id);
    assert_eq!(s.active_layer(), Some(id));
}

#[test]
fn set_active_layer_unknown_is_noop() {
    let mut s = store();
    let before = s.active_layer();
    assert!(!s.set_active_layer(&Uuid::new_v4()));
    assert_eq!(s.active_layer(), before);
}

#[test]
fn layer_visibility_tracks_objects() {
    let mut s = store();
    let obj = rect_at(0.0, 0.0, 1.0, 1.0);
    let id = obj.id;
    s.insert(obj);
    let layer = s.active_layer().unwrap();
    assert!(s.is_on_visible_layer(&id));
    assert!(s.set_layer_visible(&layer, false));
    assert!(!s.is_on_visible_layer(&id));
}

// =============================================================
// Tilemaps in the active layer
// =============================================================

#[test]
fn ensure_active_tilemap_creates_scene_sized_map() {
    let mut s = store();
    let id = s.ensure_active_tilemap(32.0, Some("dungeon".into())).unwrap();
    let obj = s.get(&id).unwrap();
    let ObjectKind::Tilemap(tm) = &obj.kind else {
        panic!("expected tilemap");
    };
    // 800x600 scene → 25 x 19 (600 / 32 = 18.75, rounded up).
    assert_eq!(tm.columns, 25);
    assert_eq!(tm.rows, 19);
    assert_eq!(tm.tile_data.len(), 25 * 19);
    assert_eq!(tm.tileset.as_deref(), Some("dungeon"));
    assert_eq!((obj.x, obj.y), (0.0, 0.0));
}

#[test]
fn ensure_active_tilemap_reuses_existing() {
    let mut s = store();
    let first = s.ensure_active_tilemap(32.0, None).unwrap();
    let second = s.ensure_active_tilemap(16.0, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(s.len(), 1);
}

#[test]
fn ensure_active_tilemap_is_per_layer() {
    let mut s = store();
    let first = s.ensure_active_tilemap(32.0, None).unwrap();
    s.add_layer("Top");
    let second = s.ensure_active_tilemap(32.0, None).unwrap();
    assert_ne!(first, second);
}

#[test]
fn ensure_active_tilemap_without_layers_is_none() {
    let mut scene = Scene::default();
    scene.layers.clear();
    let mut s = SceneStore::new(scene);
    assert!(s.ensure_active_tilemap(32.0, None).is_none());
}

#[test]
fn ensure_active_tilemap_refuses_huge_scene() {
    let mut scene = Scene::default();
    scene.width = 1.0e9;
    scene.height = 1.0e9;
    let mut s = SceneStore::new(scene);
    assert!(s.ensure_active_tilemap(1.0, None).is_none());
    assert_eq!(s.len(), 0);
}
