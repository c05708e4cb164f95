#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a drawing surface or a scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input maps to 1.0.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// Camera state for zoom/pan over a centered scene.
///
/// The scene is centered on the drawing surface and then shifted by
/// `pan_x` / `pan_y` (CSS pixels). `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// The zoom factor actually used for conversions, always inside the allowed range.
    #[must_use]
    pub fn scale(&self) -> f64 {
        clamp_zoom(self.zoom)
    }

    /// Set the zoom factor, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Screen-space position of the scene's top-left corner.
    #[must_use]
    pub fn scene_origin(&self, surface: Size, scene: Size) -> Point {
        let z = self.scale();
        Point {
            x: (surface.width - scene.width * z) / 2.0 + self.pan_x,
            y: (surface.height - scene.height * z) / 2.0 + self.pan_y,
        }
    }

    /// Convert a screen-space point (CSS pixels) to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point, surface: Size, scene: Size) -> Point {
        let origin = self.scene_origin(surface, scene);
        let z = self.scale();
        Point { x: (screen.x - origin.x) / z, y: (screen.y - origin.y) / z }
    }

    /// Convert a scene-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn scene_to_screen(&self, point: Point, surface: Size, scene: Size) -> Point {
        let origin = self.scene_origin(surface, scene);
        let z = self.scale();
        Point { x: point.x * z + origin.x, y: point.y * z + origin.y }
    }

    /// Convert a screen-space distance (pixels) to a scene-space distance.
    #[must_use]
    pub fn screen_dist_to_scene(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale()
    }

    /// Change zoom while keeping the scene point under `screen` fixed on screen.
    pub fn zoom_about(&mut self, screen: Point, zoom: f64, surface: Size, scene: Size) {
        let anchor = self.screen_to_scene(screen, surface, scene);
        self.set_zoom(zoom);
        let z = self.scale();
        self.pan_x = screen.x - anchor.x * z - (surface.width - scene.width * z) / 2.0;
        self.pan_y = screen.y - anchor.y * z - (surface.height - scene.height * z) / 2.0;
    }
}
