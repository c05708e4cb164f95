//! Scene model: layers, typed scene objects, and the in-memory store.
//!
//! This module defines the data that describes what is in the authored scene
//! (`Scene`, `Layer`, `SceneObject`, `ObjectKind`), the request shapes used to
//! create and edit objects (`ObjectDescriptor`, `ObjectPatch`), and the runtime
//! store that owns the active scene (`SceneStore`).
//!
//! The store keeps an explicit owning-layer index so membership lookups never
//! scan layers and objects never hold back-pointers. Object ids are the only
//! handle other components keep; every lookup goes through the store.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{HashMap, HashSet};

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::camera::{Point, Size};
use crate::consts::{DEFAULT_OBJECT_SIZE, MAX_TILEMAP_CELLS};

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

// =============================================================
// Scene
// =============================================================

/// Parameters for creating a fresh scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub background_color: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { name: "Untitled Scene".into(), width: 800.0, height: 600.0, background_color: "#2d2d2d".into() }
    }
}

/// The authored scene: an ordered stack of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: Uuid,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    /// Back-to-front render order.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Layer that receives new objects and tile painting.
    #[serde(default)]
    pub active_layer: Option<LayerId>,
}

impl Scene {
    /// Build a scene with a single empty, active layer.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let layer = Layer::new("Layer 1");
        let active = layer.id;
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            width: config.width,
            height: config.height,
            background_color: config.background_color,
            layers: vec![layer],
            active_layer: Some(active),
        }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Look up a layer by id.
    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == *id)
    }

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == *id)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

/// A named, ordered group of objects. Objects render back-to-front in vector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Layer {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { id: Uuid::new_v4(), name: name.to_owned(), visible: true, objects: Vec::new() }
    }
}

// =============================================================
// Objects
// =============================================================

/// A placed object. Geometry is in scene units; rotation is degrees about the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `pt` lies inside the axis-aligned bounding box (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// Variant-specific object data. The `type` tag is fixed for an object's lifetime.
///
/// Serialized as a map holding the `type` tag next to the variant fields, so it
/// can be flattened into [`SceneObject`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Sprite(SpriteProps),
    Rectangle(ShapeProps),
    Circle(ShapeProps),
    Text(TextProps),
    Tilemap(TilemapProps),
    /// A type tag this editor does not understand. The tag and its fields are
    /// kept verbatim so saving the scene writes them back unchanged.
    Unknown { type_name: String, extra: Map<String, Value> },
}

/// Keys owned by [`SceneObject`] itself, never stored as unknown variant data.
const COMMON_FIELDS: &[&str] = &["id", "name", "x", "y", "width", "height", "rotation", "enabled"];

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownKindRef<'a> {
    Sprite(&'a SpriteProps),
    Rectangle(&'a ShapeProps),
    Circle(&'a ShapeProps),
    Text(&'a TextProps),
    Tilemap(&'a TilemapProps),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownKind {
    Sprite(SpriteProps),
    Rectangle(ShapeProps),
    Circle(ShapeProps),
    Text(TextProps),
    Tilemap(TilemapProps),
}

impl From<KnownKind> for ObjectKind {
    fn from(kind: KnownKind) -> Self {
        match kind {
            KnownKind::Sprite(p) => Self::Sprite(p),
            KnownKind::Rectangle(p) => Self::Rectangle(p),
            KnownKind::Circle(p) => Self::Circle(p),
            KnownKind::Text(p) => Self::Text(p),
            KnownKind::Tilemap(p) => Self::Tilemap(p),
        }
    }
}

impl ObjectKind {
    /// The wire name of the variant.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Sprite(_) => "sprite",
            Self::Rectangle(_) => "rectangle",
            Self::Circle(_) => "circle",
            Self::Text(_) => "text",
            Self::Tilemap(_) => "tilemap",
            Self::Unknown { type_name, .. } => type_name,
        }
    }
}

impl Serialize for ObjectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let known = match self {
            Self::Sprite(p) => KnownKindRef::Sprite(p),
            Self::Rectangle(p) => KnownKindRef::Rectangle(p),
            Self::Circle(p) => KnownKindRef::Circle(p),
            Self::Text(p) => KnownKindRef::Text(p),
            Self::Tilemap(p) => KnownKindRef::Tilemap(p),
            Self::Unknown { type_name, extra } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", type_name)?;
                for (k, v) in extra.iter().filter(|(k, _)| k.as_str() != "type") {
                    map.serialize_entry(k, v)?;
                }
                return map.end();
            }
        };
        known.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let type_name = match fields.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(_) => return Err(D::Error::custom("object `type` must be a string")),
            None => return Err(D::Error::missing_field("type")),
        };
        if matches!(type_name.as_str(), "sprite" | "rectangle" | "circle" | "text" | "tilemap") {
            return serde_json::from_value::<KnownKind>(Value::Object(fields))
                .map(Self::from)
                .map_err(D::Error::custom);
        }
        fields.retain(|k, _| k != "type" && !COMMON_FIELDS.contains(&k.as_str()));
        Ok(Self::Unknown { type_name, extra: fields })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpriteProps {
    /// Asset id resolved by the asset subsystem.
    pub image_id: Option<String>,
    /// Optional CSS color multiplied over the object box. Transparent image
    /// pixels are tinted too.
    pub tint: Option<String>,
    pub flip_x: bool,
    pub flip_y: bool,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f64,
}

impl Default for SpriteProps {
    fn default() -> Self {
        Self { image_id: None, tint: None, flip_x: false, flip_y: false, opacity: 1.0 }
    }
}

/// Fill/stroke data shared by rectangles and circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeProps {
    pub fill_color: String,
    pub border_color: String,
    /// Zero disables the stroke.
    pub border_width: f64,
    /// Rectangles only.
    pub corner_radius: f64,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            fill_color: "#4a90d9".into(),
            border_color: "#1f1a17".into(),
            border_width: 1.0,
            corner_radius: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    /// CSS font style prefix, e.g. `normal`, `bold`, `italic`.
    pub font_style: String,
    /// `left`, `center` or `right`.
    pub text_align: String,
    pub text_color: String,
    pub background_color: Option<String>,
    /// Word-wrap to the object width.
    pub wrap: bool,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".into(),
            font_size: 16.0,
            font_style: "normal".into(),
            text_align: "left".into(),
            text_color: "#ffffff".into(),
            background_color: None,
            wrap: false,
        }
    }
}

/// A grid of tile indices, row-major, `0` meaning empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TilemapProps {
    pub tileset: Option<String>,
    pub tile_size: f64,
    pub columns: u32,
    pub rows: u32,
    pub tile_data: Vec<u32>,
}

impl Default for TilemapProps {
    fn default() -> Self {
        Self { tileset: None, tile_size: 32.0, columns: 0, rows: 0, tile_data: Vec::new() }
    }
}

impl TilemapProps {
    /// An empty tilemap of `columns × rows` cells.
    ///
    /// Cell data is only allocated when the grid fits [`MAX_TILEMAP_CELLS`];
    /// an oversized tilemap is rejected by the store.
    #[must_use]
    pub fn new(tileset: Option<String>, tile_size: f64, columns: u32, rows: u32) -> Self {
        let tile_data = cell_count(columns, rows).map_or_else(Vec::new, |n| vec![0; n]);
        Self { tileset, tile_size, columns, rows, tile_data }
    }

    /// Cell under a point given relative to the tilemap's top-left corner.
    ///
    /// Returns `None` outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_at(&self, local: Point) -> Option<(u32, u32)> {
        if !(self.tile_size > 0.0) || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let col = (local.x / self.tile_size).floor();
        let row = (local.y / self.tile_size).floor();
        if col >= f64::from(self.columns) || row >= f64::from(self.rows) {
            return None;
        }
        Some((col as u32, row as u32))
    }

    /// Flat index of a cell. Callers must check bounds first.
    #[must_use]
    pub fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.columns as usize + col as usize
    }

    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> Option<u32> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.tile_data.get(self.index(col, row)).copied()
    }

    /// Write a tile index. Returns false when the cell is out of bounds.
    pub fn set(&mut self, col: u32, row: u32, tile: u32) -> bool {
        if col >= self.columns || row >= self.rows {
            return false;
        }
        let idx = self.index(col, row);
        match self.tile_data.get_mut(idx) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Change the grid dimensions, keeping cells that exist in both layouts.
    ///
    /// Returns false and leaves the tilemap untouched if either layout is
    /// larger than [`MAX_TILEMAP_CELLS`].
    pub fn resize(&mut self, columns: u32, rows: u32) -> bool {
        let Some(len) = cell_count(columns, rows) else {
            return false;
        };
        if !self.normalize() {
            return false;
        }
        let mut data = vec![0; len];
        for row in 0..rows.min(self.rows) {
            for col in 0..columns.min(self.columns) {
                data[row as usize * columns as usize + col as usize] = self.tile_data[self.index(col, row)];
            }
        }
        self.columns = columns;
        self.rows = rows;
        self.tile_data = data;
        true
    }

    /// Pad or truncate `tile_data` so its length is `columns × rows`.
    ///
    /// Returns false without touching the data if the grid is oversized.
    pub fn normalize(&mut self) -> bool {
        let Some(len) = cell_count(self.columns, self.rows) else {
            return false;
        };
        self.tile_data.resize(len, 0);
        true
    }
}

/// Cells in a `columns × rows` grid, or `None` above [`MAX_TILEMAP_CELLS`].
#[must_use]
pub fn cell_count(columns: u32, rows: u32) -> Option<usize> {
    (columns as usize)
        .checked_mul(rows as usize)
        .filter(|n| *n <= MAX_TILEMAP_CELLS)
}

fn default_true() -> bool {
    true
}

// =============================================================
// Requests
// =============================================================

/// An "add object" request. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl ObjectDescriptor {
    /// A descriptor at `(x, y)` with default size and name.
    #[must_use]
    pub fn new(kind: ObjectKind, x: f64, y: f64) -> Self {
        Self { name: None, x, y, width: None, height: None, rotation: 0.0, kind }
    }

    /// Materialize the descriptor with a freshly generated id.
    #[must_use]
    pub fn into_object(self) -> SceneObject {
        let mut kind = self.kind;
        let (default_w, default_h) = match &mut kind {
            ObjectKind::Tilemap(tm) => {
                // An oversized grid stays empty here and is refused on insert.
                tm.normalize();
                (f64::from(tm.columns) * tm.tile_size, f64::from(tm.rows) * tm.tile_size)
            }
            _ => (DEFAULT_OBJECT_SIZE, DEFAULT_OBJECT_SIZE),
        };
        let name = self.name.unwrap_or_else(|| kind.type_name().to_owned());
        SceneObject {
            id: Uuid::new_v4(),
            name,
            x: self.x,
            y: self.y,
            width: self.width.unwrap_or(default_w),
            height: self.height.unwrap_or(default_h),
            rotation: self.rotation,
            enabled: true,
            kind,
        }
    }
}

/// Sparse update for a scene object. Only present fields are applied.
///
/// `props` is merged key-by-key into the variant data; a `null` value resets
/// that key to its default. The `type` key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

// =============================================================
// Store
// =============================================================

/// Owner of the active scene plus the object-to-layer index.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    scene: Scene,
    owners: HashMap<ObjectId, LayerId>,
}

impl SceneStore {
    /// Take ownership of a scene, repairing anything that breaks the model invariants.
    ///
    /// Duplicate object ids keep their first occurrence, tilemap data is resized
    /// to `columns × rows` (oversized tilemaps are dropped), and a dangling
    /// `active_layer` falls back to the topmost layer.
    #[must_use]
    pub fn new(mut scene: Scene) -> Self {
        let mut owners = HashMap::new();
        let mut seen = HashSet::new();
        for layer in &mut scene.layers {
            let layer_id = layer.id;
            layer.objects.retain_mut(|obj| {
                if !seen.insert(obj.id) {
                    tracing::warn!(id = %obj.id, %layer_id, "dropping object with duplicate id");
                    return false;
                }
                if let ObjectKind::Tilemap(tm) = &mut obj.kind {
                    if !tm.normalize() {
                        tracing::warn!(id = %obj.id, columns = tm.columns, rows = tm.rows, "dropping oversized tilemap");
                        return false;
                    }
                }
                true
            });
            for obj in &layer.objects {
                owners.insert(obj.id, layer_id);
            }
        }
        let active_ok = scene.active_layer.is_some_and(|id| scene.layer(&id).is_some());
        if !active_ok {
            scene.active_layer = scene.layers.last().map(|l| l.id);
        }
        Self { scene, owners }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.scene.layers
    }

    #[must_use]
    pub fn active_layer(&self) -> Option<LayerId> {
        self.scene.active_layer
    }

    /// Return a reference to an object by id.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        let layer = self.scene.layer(self.owners.get(id)?)?;
        layer.objects.iter().find(|o| o.id == *id)
    }

    /// Return a mutable reference to an object by id.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        let layer_id = *self.owners.get(id)?;
        let layer = self.scene.layer_mut(&layer_id)?;
        layer.objects.iter_mut().find(|o| o.id == *id)
    }

    /// The layer that owns an object.
    #[must_use]
    pub fn layer_of(&self, id: &ObjectId) -> Option<LayerId> {
        self.owners.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.owners.contains_key(id)
    }

    /// Number of objects across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Append an object to the active layer. Returns false if there is no active
    /// layer or the id is already taken.
    pub fn insert(&mut self, obj: SceneObject) -> bool {
        let Some(layer_id) = self.scene.active_layer else {
            return false;
        };
        self.insert_into(&layer_id, obj)
    }

    /// Append an object to a specific layer. Oversized tilemaps are refused.
    pub fn insert_into(&mut self, layer_id: &LayerId, mut obj: SceneObject) -> bool {
        if self.owners.contains_key(&obj.id) {
            return false;
        }
        if let ObjectKind::Tilemap(tm) = &mut obj.kind {
            if !tm.normalize() {
                tracing::debug!(id = %obj.id, columns = tm.columns, rows = tm.rows, "refusing oversized tilemap");
                return false;
            }
        }
        let Some(layer) = self.scene.layer_mut(layer_id) else {
            return false;
        };
        self.owners.insert(obj.id, *layer_id);
        layer.objects.push(obj);
        true
    }

    /// Remove an object from whichever layer holds it.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let layer_id = self.owners.remove(id)?;
        let layer = self.scene.layer_mut(&layer_id)?;
        let pos = layer.objects.iter().position(|o| o.id == *id)?;
        Some(layer.objects.remove(pos))
    }

    /// Apply a partial update. Returns false if the object doesn't exist or the
    /// variant props could not be merged.
    pub fn apply_patch(&mut self, id: &ObjectId, patch: &ObjectPatch) -> bool {
        let Some(obj) = self.get_mut(id) else {
            return false;
        };
        if let Some(ref props) = patch.props {
            let Some(kind) = merge_props(&obj.kind, props) else {
                return false;
            };
            obj.kind = kind;
        }
        if let Some(ref name) = patch.name {
            obj.name.clone_from(name);
        }
        if let Some(x) = patch.x {
            obj.x = x;
        }
        if let Some(y) = patch.y {
            obj.y = y;
        }
        if let Some(w) = patch.width {
            obj.width = w;
        }
        if let Some(h) = patch.height {
            obj.height = h;
        }
        if let Some(r) = patch.rotation {
            obj.rotation = r;
        }
        if let Some(e) = patch.enabled {
            obj.enabled = e;
        }
        true
    }

    // --- Layers ---

    /// Append a new visible layer on top and make it active.
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.scene.layers.push(layer);
        self.scene.active_layer = Some(id);
        id
    }

    /// Returns false for an unknown layer id.
    pub fn set_active_layer(&mut self, id: &LayerId) -> bool {
        if self.scene.layer(id).is_none() {
            return false;
        }
        self.scene.active_layer = Some(*id);
        true
    }

    /// Returns false for an unknown layer id.
    pub fn set_layer_visible(&mut self, id: &LayerId, visible: bool) -> bool {
        let Some(layer) = self.scene.layer_mut(id) else {
            return false;
        };
        layer.visible = visible;
        true
    }

    /// Whether the object's owning layer is visible.
    #[must_use]
    pub fn is_on_visible_layer(&self, id: &ObjectId) -> bool {
        self.owners
            .get(id)
            .and_then(|lid| self.scene.layer(lid))
            .is_some_and(|l| l.visible)
    }

    // --- Tilemaps ---

    /// The first tilemap in the active layer.
    #[must_use]
    pub fn active_tilemap(&self) -> Option<ObjectId> {
        let layer = self.scene.layer(&self.scene.active_layer?)?;
        layer
            .objects
            .iter()
            .find(|o| matches!(o.kind, ObjectKind::Tilemap(_)))
            .map(|o| o.id)
    }

    /// The active layer's tilemap, creating one that covers the scene if needed.
    ///
    /// Returns `None` when there is no active layer or the scene is too large
    /// to cover with tiles of this size.
    pub fn ensure_active_tilemap(&mut self, tile_size: f64, tileset: Option<String>) -> Option<ObjectId> {
        if let Some(id) = self.active_tilemap() {
            return Some(id);
        }
        let layer_id = self.scene.active_layer?;
        let tile_size = if tile_size > 0.0 { tile_size } else { 32.0 };
        let columns = tiles_to_cover(self.scene.width, tile_size);
        let rows = tiles_to_cover(self.scene.height, tile_size);
        if cell_count(columns, rows).is_none() {
            tracing::debug!(columns, rows, "scene too large for a painting tilemap");
            return None;
        }
        let mut desc = ObjectDescriptor::new(
            ObjectKind::Tilemap(TilemapProps::new(tileset, tile_size, columns, rows)),
            0.0,
            0.0,
        );
        desc.name = Some("Tilemap".into());
        let obj = desc.into_object();
        let id = obj.id;
        if !self.insert_into(&layer_id, obj) {
            return None;
        }
        tracing::debug!(%id, columns, rows, "created tilemap for painting");
        Some(id)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tiles_to_cover(extent: f64, tile_size: f64) -> u32 {
    if extent <= 0.0 {
        return 0;
    }
    (extent / tile_size).ceil() as u32
}

/// Merge a JSON props patch into variant data without changing the variant.
fn merge_props(kind: &ObjectKind, props: &serde_json::Value) -> Option<ObjectKind> {
    let incoming = props.as_object()?;
    let mut value = match serde_json::to_value(kind) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "object props could not be serialized for merge");
            return None;
        }
    };
    let existing = value.as_object_mut()?;
    for (k, v) in incoming {
        if k == "type" {
            continue;
        }
        if v.is_null() {
            existing.remove(k);
        } else {
            existing.insert(k.clone(), v.clone());
        }
    }
    let mut merged: ObjectKind = match serde_json::from_value(value) {
        Ok(k) => k,
        Err(e) => {
            tracing::debug!(error = %e, "rejected props patch");
            return None;
        }
    };
    if let (ObjectKind::Tilemap(before), ObjectKind::Tilemap(after)) = (kind, &mut merged) {
        let fits = if incoming.contains_key("tileData") {
            after.normalize()
        } else if before.columns != after.columns || before.rows != after.rows {
            let mut resized = before.clone();
            let ok = resized.resize(after.columns, after.rows);
            after.tile_data = resized.tile_data;
            ok
        } else {
            true
        };
        if !fits {
            tracing::debug!(columns = after.columns, rows = after.rows, "rejected oversized tilemap patch");
            return None;
        }
    }
    Some(merged)
}
