//! Editor settings: grid, snapping and tile defaults.
//!
//! The host owns persistence of these settings; the engine only consumes them.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

pub const DEFAULT_GRID_SIZE: f64 = 32.0;
pub const DEFAULT_ANGLE_STEP: f64 = 15.0;
pub const DEFAULT_MIN_OBJECT_SIZE: f64 = 10.0;
pub const DEFAULT_TILE_SIZE: f64 = 32.0;

/// Editor-wide settings that shape tool behavior and grid rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Grid spacing and snap quantum, in scene units.
    pub grid_size: f64,
    /// Whether tool output is quantized to the grid / angle step.
    pub snap_to_grid: bool,
    /// Whether the grid overlay is drawn.
    pub show_grid: bool,
    /// Rotate-tool snap increment in degrees.
    pub angle_step: f64,
    /// Smallest width or height the scale tool may produce.
    pub min_object_size: f64,
    /// Tile size used when the paint tool has to create a tilemap.
    pub default_tile_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: false,
            show_grid: true,
            angle_step: DEFAULT_ANGLE_STEP,
            min_object_size: DEFAULT_MIN_OBJECT_SIZE,
            default_tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Json`] for malformed JSON and
    /// [`EditorError::InvalidConfig`] when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, EditorError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every size and step is a positive finite number.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), EditorError> {
        positive("gridSize", self.grid_size)?;
        positive("angleStep", self.angle_step)?;
        positive("minObjectSize", self.min_object_size)?;
        positive("defaultTileSize", self.default_tile_size)?;
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), EditorError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EditorError::InvalidConfig(format!("{field} must be a positive number, got {value}")))
    }
}
