#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::scene::{ObjectId, SceneObject, SceneStore};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All anchors, clockwise from the top edge.
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Position of this anchor on an `(x, y, w, h)` box.
    #[must_use]
    pub fn position(self, x: f64, y: f64, w: f64, h: f64) -> Point {
        let (fx, fy) = match self {
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
            Self::Nw => (0.0, 0.0),
        };
        Point::new(x + w * fx, y + h * fy)
    }
}

/// The eight resize handle positions (corners and edge midpoints) of an object's box,
/// in [`ResizeAnchor::ALL`] order.
#[must_use]
pub fn resize_handle_positions(obj: &SceneObject) -> [Point; 8] {
    ResizeAnchor::ALL.map(|a| a.position(obj.x, obj.y, obj.width, obj.height))
}

/// The topmost object whose bounding box contains `scene_pt`.
///
/// Layers are scanned top to bottom and objects last to first, so whatever
/// renders on top wins. Hidden layers and disabled objects are skipped.
/// Rotation is ignored: the unrotated bounding box is used.
#[must_use]
pub fn hit_test(scene_pt: Point, store: &SceneStore) -> Option<ObjectId> {
    store
        .layers()
        .iter()
        .rev()
        .filter(|layer| layer.visible)
        .flat_map(|layer| layer.objects.iter().rev())
        .find(|obj| obj.enabled && obj.contains(scene_pt))
        .map(|obj| obj.id)
}
