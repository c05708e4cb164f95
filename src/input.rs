//! Input model: tools, modifier keys, mouse buttons, and tool sessions.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `ToolSession` is the transient state of the active gesture between
//! pointer-down and pointer-up. It is replaced wholesale on every transition
//! and reset to `Idle` whenever the tool or scene changes, so no tool ever
//! sees another tool's drag state.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::scene::ObjectId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Click to select; drag on empty space to pan (default).
    #[default]
    Select,
    /// Drag selected objects.
    Move,
    /// Rotate selected objects about their centers.
    Rotate,
    /// Resize selected objects from their top-left corner.
    Scale,
    /// Paint tiles into the active layer's tilemap.
    TilePaint,
}

impl Tool {
    /// Map a single-key shortcut to a tool.
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key {
            "v" | "V" => Some(Self::Select),
            "m" | "M" => Some(Self::Move),
            "r" | "R" => Some(Self::Rotate),
            "s" | "S" => Some(Self::Scale),
            "t" | "T" => Some(Self::TilePaint),
            _ => None,
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held. Inverts the snap toggle for this event.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap). Drives the active tool.
    Primary,
    /// Middle mouse button. Always pans.
    Middle,
    /// Right mouse button. Ignored by the editing core.
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// The tile the paint tool writes, as chosen in the tileset palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBrush {
    /// Tile index written into cells. `0` erases.
    pub tile: u32,
    /// Tileset assigned to tilemaps created by the paint tool.
    pub tileset: Option<String>,
}

impl Default for TileBrush {
    fn default() -> Self {
        Self { tile: 1, tileset: None }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Selected object ids, in selection order.
    pub selected: Vec<ObjectId>,
    /// Current tile palette choice.
    pub brush: TileBrush,
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selected.contains(id)
    }
}

/// Start state of one object being moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTarget {
    pub id: ObjectId,
    pub start_x: f64,
    pub start_y: f64,
}

/// Start state of one object being rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateTarget {
    pub id: ObjectId,
    /// Rotation pivot in scene space.
    pub center: Point,
    /// Object rotation in degrees when the drag began.
    pub start_rotation: f64,
    /// Pointer angle around `center`, in degrees, when the drag began.
    pub start_angle: f64,
}

/// Start state of one object being scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTarget {
    pub id: ObjectId,
    pub start_width: f64,
    pub start_height: f64,
}

/// The active gesture, if any.
///
/// Each active variant carries the context needed to compute the object state
/// from the current pointer position alone, so updates never accumulate error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolSession {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Move tool drag.
    Moving {
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        targets: Vec<MoveTarget>,
    },
    /// Rotate tool drag.
    Rotating { targets: Vec<RotateTarget> },
    /// Scale tool drag.
    Scaling {
        /// Top-left corner of the grabbed object at pointer-down, in scene space.
        anchor: Point,
        /// Scene-space pointer position at pointer-down.
        start_pointer: Point,
        targets: Vec<ScaleTarget>,
    },
    /// Tile-paint drag.
    Painting {
        /// Tilemap receiving the tiles.
        tilemap: ObjectId,
        /// Last cell written, used to skip repeat writes within one cell.
        last_cell: Option<(u32, u32)>,
    },
}

impl ToolSession {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
