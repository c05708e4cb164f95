//! Pointer handlers for each tool.
//!
//! Every handler runs in scene space: the screen point is converted once at the
//! top and all geometry below is in scene units. Handlers mutate the scene
//! store in place and report what changed as [`Action`]s. A pointer-down that
//! finds nothing to act on leaves the session `Idle`; tile painting is the
//! exception and always starts a session when an active layer exists.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use crate::camera::Point;
use crate::engine::{Action, EngineCore};
use crate::hit;
use crate::input::{Modifiers, MoveTarget, RotateTarget, ScaleTarget, Tool, ToolSession};
use crate::scene::{ObjectId, ObjectKind};
use crate::snap::{snap_angle, snap_if};

/// Denominators smaller than this leave the scale factor at 1.
const SCALE_EPSILON: f64 = 1e-6;

/// Pointer angle around `center`, in degrees.
#[must_use]
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees()
}

/// Scale factor along one axis from the drag anchor and pointer positions.
#[must_use]
pub fn scale_factor(anchor: f64, start_pointer: f64, pointer: f64) -> f64 {
    let denom = start_pointer - anchor;
    if denom.abs() < SCALE_EPSILON {
        return 1.0;
    }
    (pointer - anchor) / denom
}

impl EngineCore {
    /// Whether snapping applies to this event.
    fn snap_enabled(&self, modifiers: Modifiers) -> bool {
        self.config.snap_to_grid != modifiers.alt
    }

    /// Replace the selection. Returns the notification if it changed.
    pub(crate) fn select_only(&mut self, id: Option<ObjectId>) -> Option<Action> {
        let next: Vec<ObjectId> = id.into_iter().collect();
        if self.ui.selected == next {
            return None;
        }
        self.ui.selected = next;
        Some(Action::SelectionChanged(self.ui.selected.clone()))
    }

    /// Hit-test and make the hit object part of the selection, keeping the
    /// current selection when the hit object is already in it.
    fn grab(&mut self, scene_pt: Point, actions: &mut Vec<Action>) -> Option<ObjectId> {
        let id = hit::hit_test(scene_pt, &self.store)?;
        if !self.ui.is_selected(&id) {
            actions.extend(self.select_only(Some(id)));
        }
        Some(id)
    }

    // =============================================================
    // Pointer down
    // =============================================================

    pub(crate) fn tool_down(&mut self, screen: Point) -> Vec<Action> {
        let scene_pt = self.screen_to_scene(screen);
        match self.ui.tool {
            Tool::Select => self.select_down(screen, scene_pt),
            Tool::Move => self.move_down(screen, scene_pt),
            Tool::Rotate => self.rotate_down(scene_pt),
            Tool::Scale => self.scale_down(scene_pt),
            Tool::TilePaint => self.paint_down(scene_pt),
        }
    }

    fn select_down(&mut self, screen: Point, scene_pt: Point) -> Vec<Action> {
        let hit = hit::hit_test(scene_pt, &self.store);
        let mut actions: Vec<Action> = self.select_only(hit).into_iter().collect();
        if hit.is_none() {
            self.session = ToolSession::Panning { last_screen: screen };
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn move_down(&mut self, screen: Point, scene_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.grab(scene_pt, &mut actions).is_none() {
            return actions;
        }
        let targets: Vec<MoveTarget> = self
            .ui
            .selected
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|obj| MoveTarget { id: obj.id, start_x: obj.x, start_y: obj.y })
            .collect();
        self.session = ToolSession::Moving { start_screen: screen, targets };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn rotate_down(&mut self, scene_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.grab(scene_pt, &mut actions).is_none() {
            return actions;
        }
        let targets: Vec<RotateTarget> = self
            .ui
            .selected
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|obj| {
                let center = obj.center();
                RotateTarget {
                    id: obj.id,
                    center,
                    start_rotation: obj.rotation,
                    start_angle: pointer_angle(center, scene_pt),
                }
            })
            .collect();
        self.session = ToolSession::Rotating { targets };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn scale_down(&mut self, scene_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(hit_id) = self.grab(scene_pt, &mut actions) else {
            return actions;
        };
        let Some(anchor) = self.store.get(&hit_id).map(|obj| Point::new(obj.x, obj.y)) else {
            return actions;
        };
        let targets: Vec<ScaleTarget> = self
            .ui
            .selected
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|obj| ScaleTarget { id: obj.id, start_width: obj.width, start_height: obj.height })
            .collect();
        self.session = ToolSession::Scaling { anchor, start_pointer: scene_pt, targets };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn paint_down(&mut self, scene_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let existed = self.store.active_tilemap();
        let tileset = self.ui.brush.tileset.clone();
        let Some(tilemap) = self.store.ensure_active_tilemap(self.config.default_tile_size, tileset) else {
            tracing::debug!("tile paint ignored: no active layer");
            return actions;
        };
        if existed.is_none() {
            actions.push(Action::ObjectAdded(tilemap));
        }
        self.session = ToolSession::Painting { tilemap, last_cell: None };
        actions.extend(self.paint_at(scene_pt));
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // =============================================================
    // Pointer move
    // =============================================================

    pub(crate) fn tool_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let snap = self.snap_enabled(modifiers);
        match self.session {
            ToolSession::Idle => Vec::new(),
            ToolSession::Panning { last_screen } => {
                self.camera.pan_x += screen.x - last_screen.x;
                self.camera.pan_y += screen.y - last_screen.y;
                self.session = ToolSession::Panning { last_screen: screen };
                vec![Action::RenderNeeded]
            }
            ToolSession::Moving { .. } => self.move_drag(screen, snap),
            ToolSession::Rotating { .. } => self.rotate_drag(self.screen_to_scene(screen), snap),
            ToolSession::Scaling { .. } => self.scale_drag(self.screen_to_scene(screen), snap),
            ToolSession::Painting { .. } => {
                let mut actions: Vec<Action> = self.paint_at(self.screen_to_scene(screen)).into_iter().collect();
                if !actions.is_empty() {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    fn move_drag(&mut self, screen: Point, snap: bool) -> Vec<Action> {
        let ToolSession::Moving { start_screen, ref targets } = self.session else {
            return Vec::new();
        };
        let dx = self.camera.screen_dist_to_scene(screen.x - start_screen.x);
        let dy = self.camera.screen_dist_to_scene(screen.y - start_screen.y);
        let grid = self.config.grid_size;
        for t in targets {
            if let Some(obj) = self.store.get_mut(&t.id) {
                obj.x = snap_if(t.start_x + dx, grid, snap);
                obj.y = snap_if(t.start_y + dy, grid, snap);
            }
        }
        vec![Action::RenderNeeded]
    }

    fn rotate_drag(&mut self, scene_pt: Point, snap: bool) -> Vec<Action> {
        let ToolSession::Rotating { ref targets } = self.session else {
            return Vec::new();
        };
        let step = self.config.angle_step;
        for t in targets {
            if let Some(obj) = self.store.get_mut(&t.id) {
                let rotation = t.start_rotation + (pointer_angle(t.center, scene_pt) - t.start_angle);
                obj.rotation = if snap { snap_angle(rotation, step) } else { rotation };
            }
        }
        vec![Action::RenderNeeded]
    }

    fn scale_drag(&mut self, scene_pt: Point, snap: bool) -> Vec<Action> {
        let ToolSession::Scaling { anchor, start_pointer, ref targets } = self.session else {
            return Vec::new();
        };
        let sx = scale_factor(anchor.x, start_pointer.x, scene_pt.x);
        let sy = scale_factor(anchor.y, start_pointer.y, scene_pt.y);
        let grid = self.config.grid_size;
        let floor = self.config.min_object_size;
        for t in targets {
            if let Some(obj) = self.store.get_mut(&t.id) {
                obj.width = snap_if(t.start_width * sx, grid, snap).max(floor);
                obj.height = snap_if(t.start_height * sy, grid, snap).max(floor);
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Write the brush tile under `scene_pt`, unless it is outside the tilemap
    /// or is the cell written last.
    fn paint_at(&mut self, scene_pt: Point) -> Option<Action> {
        let ToolSession::Painting { tilemap, ref mut last_cell } = self.session else {
            return None;
        };
        let obj = self.store.get_mut(&tilemap)?;
        let ObjectKind::Tilemap(tm) = &mut obj.kind else {
            return None;
        };
        let cell = tm.cell_at(Point::new(scene_pt.x - obj.x, scene_pt.y - obj.y))?;
        if *last_cell == Some(cell) {
            return None;
        }
        let tile = self.ui.brush.tile;
        if !tm.set(cell.0, cell.1, tile) {
            return None;
        }
        *last_cell = Some(cell);
        Some(Action::TilePainted { id: tilemap, col: cell.0, row: cell.1, tile })
    }

    // =============================================================
    // Pointer up
    // =============================================================

    pub(crate) fn tool_up(&mut self) -> Vec<Action> {
        let session = std::mem::take(&mut self.session);
        let changed: Vec<ObjectId> = match session {
            ToolSession::Idle | ToolSession::Panning { .. } => Vec::new(),
            ToolSession::Moving { targets, .. } => targets.iter().map(|t| t.id).collect(),
            ToolSession::Rotating { targets } => targets.iter().map(|t| t.id).collect(),
            ToolSession::Scaling { targets, .. } => targets.iter().map(|t| t.id).collect(),
            ToolSession::Painting { tilemap, .. } => vec![tilemap],
        };
        changed
            .into_iter()
            .filter(|id| self.store.contains(id))
            .map(Action::ObjectChanged)
            .collect()
    }
}
