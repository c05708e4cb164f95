use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{Camera, Point, Size};
use crate::config::EditorConfig;
use crate::consts::WHEEL_ZOOM_FACTOR;
use crate::error::EditorError;
use crate::input::{Button, Key, Modifiers, TileBrush, Tool, ToolSession, UiState, WheelDelta};
use crate::render;
use crate::scene::{LayerId, ObjectDescriptor, ObjectId, ObjectPatch, Scene, SceneConfig, SceneObject, SceneStore};
use crate::surface::CanvasSurface;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Notifications returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A scene was created or loaded and is now active.
    SceneCreated(Scene),
    /// The selection changed; carries the full new selection.
    SelectionChanged(Vec<ObjectId>),
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    /// A gesture or property patch finished changing an object.
    ObjectChanged(ObjectId),
    /// One tilemap cell was written by the paint tool.
    TilePainted { id: ObjectId, col: u32, row: u32, tile: u32 },
    /// Layer order, visibility or the active layer changed.
    LayersChanged,
    RenderNeeded,
}

/// Requests from collaborating panels (asset browser, inspector, hierarchy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum EditorCommand {
    NewScene(SceneConfig),
    LoadScene(Scene),
    AddObject(ObjectDescriptor),
    RemoveObject(ObjectId),
    SelectObject(ObjectId),
    UpdateProperties { id: ObjectId, patch: ObjectPatch },
    AddLayer(String),
    ActivateLayer(LayerId),
    SetLayerVisibility { id: LayerId, visible: bool },
}

/// Serializable project snapshot handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub active_scene: Scene,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug)]
pub struct EngineCore {
    pub store: SceneStore,
    pub camera: Camera,
    pub ui: UiState,
    pub session: ToolSession,
    pub config: EditorConfig,
    /// Drawing surface size in CSS pixels.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            store: SceneStore::default(),
            camera: Camera::default(),
            ui: UiState::default(),
            session: ToolSession::Idle,
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    // --- Scene ---

    /// Replace the active scene with a fresh one.
    pub fn new_scene(&mut self, config: SceneConfig) -> Vec<Action> {
        self.replace_scene(Scene::new(config))
    }

    /// Replace the active scene with a loaded one.
    pub fn load_scene(&mut self, scene: Scene) -> Vec<Action> {
        self.replace_scene(scene)
    }

    fn replace_scene(&mut self, scene: Scene) -> Vec<Action> {
        self.store = SceneStore::new(scene);
        self.session = ToolSession::Idle;
        self.camera = Camera::default();
        let mut actions = vec![Action::SceneCreated(self.store.scene().clone())];
        actions.extend(self.select_only(None));
        actions.push(Action::RenderNeeded);
        let scene = self.store.scene();
        tracing::info!(id = %scene.id, name = %scene.name, layers = scene.layers.len(), objects = self.store.len(), "scene activated");
        actions
    }

    // --- Objects ---

    /// Create an object from a descriptor in the active layer.
    pub fn add_object(&mut self, desc: ObjectDescriptor) -> Vec<Action> {
        let obj = desc.into_object();
        let id = obj.id;
        let kind = obj.kind.type_name().to_owned();
        if !self.store.insert(obj) {
            tracing::debug!(%kind, "add object ignored: no active layer or oversized tilemap");
            return Vec::new();
        }
        tracing::debug!(%id, %kind, "object added");
        vec![Action::ObjectAdded(id), Action::RenderNeeded]
    }

    /// Remove an object and strike it from the selection.
    pub fn remove_object(&mut self, id: &ObjectId) -> Vec<Action> {
        if self.store.remove(id).is_none() {
            return Vec::new();
        }
        tracing::debug!(%id, "object removed");
        let mut actions = vec![Action::ObjectRemoved(*id)];
        actions.extend(self.prune_selection());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Make `id` the sole selection.
    pub fn select_object(&mut self, id: &ObjectId) -> Vec<Action> {
        if !self.store.contains(id) {
            return Vec::new();
        }
        match self.select_only(Some(*id)) {
            Some(action) => vec![action, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Apply a property patch from the inspector.
    pub fn update_properties(&mut self, id: &ObjectId, patch: &ObjectPatch) -> Vec<Action> {
        if !self.store.apply_patch(id, patch) {
            tracing::debug!(%id, "property patch ignored");
            return Vec::new();
        }
        vec![Action::ObjectChanged(*id), Action::RenderNeeded]
    }

    // --- Layers ---

    /// Append a visible layer on top and make it active.
    pub fn add_layer(&mut self, name: &str) -> Vec<Action> {
        let id = self.store.add_layer(name);
        tracing::debug!(%id, name, "layer added");
        vec![Action::LayersChanged, Action::RenderNeeded]
    }

    pub fn activate_layer(&mut self, id: &LayerId) -> Vec<Action> {
        if !self.store.set_active_layer(id) {
            return Vec::new();
        }
        vec![Action::LayersChanged]
    }

    /// Show or hide a layer. Hidden objects leave the selection.
    pub fn set_layer_visibility(&mut self, id: &LayerId, visible: bool) -> Vec<Action> {
        if !self.store.set_layer_visible(id, visible) {
            return Vec::new();
        }
        tracing::debug!(%id, visible, "layer visibility changed");
        let mut actions = vec![Action::LayersChanged];
        actions.extend(self.prune_selection());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Drop selected ids that no longer exist or sit on hidden layers.
    fn prune_selection(&mut self) -> Option<Action> {
        let before = self.ui.selected.len();
        let store = &self.store;
        self.ui.selected.retain(|id| store.is_on_visible_layer(id));
        if self.ui.selected.len() == before {
            return None;
        }
        Some(Action::SelectionChanged(self.ui.selected.clone()))
    }

    /// Route an inbound command to its handler.
    pub fn dispatch(&mut self, cmd: EditorCommand) -> Vec<Action> {
        match cmd {
            EditorCommand::NewScene(config) => self.new_scene(config),
            EditorCommand::LoadScene(scene) => self.load_scene(scene),
            EditorCommand::AddObject(desc) => self.add_object(desc),
            EditorCommand::RemoveObject(id) => self.remove_object(&id),
            EditorCommand::SelectObject(id) => self.select_object(&id),
            EditorCommand::UpdateProperties { id, patch } => self.update_properties(&id, &patch),
            EditorCommand::AddLayer(name) => self.add_layer(&name),
            EditorCommand::ActivateLayer(id) => self.activate_layer(&id),
            EditorCommand::SetLayerVisibility { id, visible } => self.set_layer_visibility(&id, visible),
        }
    }

    // --- Tool / settings ---

    /// Set the active tool, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.session = ToolSession::Idle;
        if self.ui.tool != tool {
            tracing::debug!(from = ?self.ui.tool, to = ?tool, "tool switched");
            self.ui.tool = tool;
        }
    }

    pub fn set_tile_brush(&mut self, brush: TileBrush) {
        self.ui.brush = brush;
    }

    /// Replace the editor settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] and keeps the old settings if a
    /// value is out of range.
    pub fn set_config(&mut self, config: EditorConfig) -> Result<(), EditorError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.config.snap_to_grid = enabled;
    }

    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] for a non-positive size.
    pub fn set_grid_size(&mut self, size: f64) -> Result<(), EditorError> {
        let mut config = self.config.clone();
        config.grid_size = size;
        self.set_config(config)
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.config.show_grid = show;
    }

    // --- View ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.camera.set_zoom(zoom);
        vec![Action::RenderNeeded]
    }

    /// Zoom 1, no pan.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.camera = Camera::default();
        vec![Action::RenderNeeded]
    }

    /// Zoom one step about the pointer. Scrolling up zooms in.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 || !delta.dy.is_finite() {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { WHEEL_ZOOM_FACTOR } else { 1.0 / WHEEL_ZOOM_FACTOR };
        let zoom = self.camera.scale() * factor;
        let (surface, scene) = (self.surface_size(), self.store.scene().size());
        self.camera.zoom_about(screen_pt, zoom, surface, scene);
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        // A session still open here lost its pointer-up.
        self.session = ToolSession::Idle;
        match button {
            Button::Primary => self.tool_down(screen_pt),
            Button::Middle => {
                self.session = ToolSession::Panning { last_screen: screen_pt };
                Vec::new()
            }
            Button::Secondary => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.tool_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.tool_up()
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => {
                self.session = ToolSession::Idle;
                match self.select_only(None) {
                    Some(action) => vec![action, Action::RenderNeeded],
                    None => Vec::new(),
                }
            }
            k if !(modifiers.ctrl || modifiers.meta) => {
                if let Some(tool) = Tool::from_shortcut(k) {
                    self.set_tool(tool);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.ui.selected.is_empty() {
            return Vec::new();
        }
        self.session = ToolSession::Idle;
        let mut actions: Vec<Action> = std::mem::take(&mut self.ui.selected)
            .into_iter()
            .filter(|id| self.store.remove(id).is_some())
            .map(Action::ObjectRemoved)
            .collect();
        tracing::debug!(count = actions.len(), "deleted selection");
        actions.push(Action::SelectionChanged(Vec::new()));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// Selected object ids, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.ui.selected
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.store.get(id)
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.store.scene()
    }

    #[must_use]
    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    #[must_use]
    pub fn surface_size(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    /// Convert a screen point (CSS pixels) to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen_pt: Point) -> Point {
        self.camera.screen_to_scene(screen_pt, self.surface_size(), self.store.scene().size())
    }

    // --- Project ---

    #[must_use]
    pub fn project_data(&self) -> ProjectData {
        ProjectData { active_scene: self.store.scene().clone() }
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Json`] if serialization fails.
    pub fn project_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(&self.project_data())?)
    }

    /// Load a project snapshot produced by [`EngineCore::project_json`].
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Json`] for malformed input; the current scene is kept.
    pub fn load_project_json(&mut self, raw: &str) -> Result<Vec<Action>, EditorError> {
        let data: ProjectData = serde_json::from_str(raw)?;
        Ok(self.load_scene(data.active_scene))
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoContext`] if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EditorError> {
        Self::with_config(canvas, EditorConfig::default())
    }

    /// # Errors
    ///
    /// Returns [`EditorError::NoContext`] if the canvas has no 2D context and
    /// [`EditorError::InvalidConfig`] for out-of-range settings.
    pub fn with_config(canvas: HtmlCanvasElement, config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| EditorError::Surface(format!("{e:?}")))?
            .ok_or(EditorError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EditorError::NoContext)?;
        Ok(Self { canvas, ctx, images: HashMap::new(), core: EngineCore::with_config(config) })
    }

    /// Redraw if any action asks for it, then hand the actions to the host.
    fn settle(&self, actions: Vec<Action>) -> Vec<Action> {
        if actions.contains(&Action::RenderNeeded) {
            self.render_or_log();
        }
        actions
    }

    fn render_or_log(&self) {
        if let Err(e) = self.render() {
            tracing::warn!(error = %e, "render failed");
        }
    }

    // --- Delegated commands ---

    pub fn dispatch(&mut self, cmd: EditorCommand) -> Vec<Action> {
        let actions = self.core.dispatch(cmd);
        self.settle(actions)
    }

    pub fn new_scene(&mut self, config: SceneConfig) -> Vec<Action> {
        self.dispatch(EditorCommand::NewScene(config))
    }

    pub fn load_scene(&mut self, scene: Scene) -> Vec<Action> {
        self.dispatch(EditorCommand::LoadScene(scene))
    }

    pub fn add_object(&mut self, desc: ObjectDescriptor) -> Vec<Action> {
        self.dispatch(EditorCommand::AddObject(desc))
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Vec<Action> {
        self.dispatch(EditorCommand::RemoveObject(id))
    }

    pub fn select_object(&mut self, id: ObjectId) -> Vec<Action> {
        self.dispatch(EditorCommand::SelectObject(id))
    }

    pub fn update_properties(&mut self, id: ObjectId, patch: ObjectPatch) -> Vec<Action> {
        self.dispatch(EditorCommand::UpdateProperties { id, patch })
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.core.set_tool(tool);
    }

    pub fn set_tile_brush(&mut self, brush: TileBrush) {
        self.core.set_tile_brush(brush);
    }

    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] for out-of-range settings.
    pub fn set_config(&mut self, config: EditorConfig) -> Result<(), EditorError> {
        self.core.set_config(config)?;
        self.render()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        let actions = self.core.set_zoom(zoom);
        self.settle(actions)
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        let actions = self.core.reset_view();
        self.settle(actions)
    }

    /// Register a decoded image under its asset id and redraw.
    pub fn set_image(&mut self, asset_id: &str, image: HtmlImageElement) {
        self.images.insert(asset_id.to_owned(), image);
        self.render_or_log();
    }

    // --- Project ---

    #[must_use]
    pub fn project_data(&self) -> ProjectData {
        self.core.project_data()
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Json`] if serialization fails.
    pub fn project_json(&self) -> Result<String, EditorError> {
        self.core.project_json()
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Json`] for malformed input.
    pub fn load_project_json(&mut self, raw: &str) -> Result<Vec<Action>, EditorError> {
        let actions = self.core.load_project_json(raw)?;
        Ok(self.settle(actions))
    }

    // --- Viewport ---

    /// Update viewport dimensions and size the backing store for the device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        let dpr = self.core.dpr;
        self.canvas.set_width((self.core.viewport_width * dpr).round() as u32);
        self.canvas.set_height((self.core.viewport_height * dpr).round() as u32);
        self.render_or_log();
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.settle(actions)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.settle(actions)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.settle(actions)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_wheel(screen_pt, delta, modifiers);
        self.settle(actions)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers);
        self.settle(actions)
    }

    // --- Render ---

    /// Draw the current state to the canvas. An empty viewport draws nothing.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a canvas drawing call fails.
    pub fn render(&self) -> Result<(), EditorError> {
        let viewport = self.core.surface_size();
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Ok(());
        }
        let mut surface = CanvasSurface::new(&self.ctx, &self.images, self.core.dpr);
        render::draw(&mut surface, &self.core.store, &self.core.camera, &self.core.ui, &self.core.config, viewport)
    }
}
