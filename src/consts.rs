//! Shared numeric constants for the scene editor.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom multiplier applied per wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

// ── Grid ────────────────────────────────────────────────────────

/// Grid lines closer than this many screen pixels are not drawn.
pub const GRID_MIN_SPACING_PX: f64 = 5.0;

// ── Selection UI ────────────────────────────────────────────────

/// Half the side length of a resize handle, in screen pixels.
pub const HANDLE_HALF_PX: f64 = 4.0;

/// Selection outline dash segment length in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;

// ── Objects ─────────────────────────────────────────────────────

/// Width and height given to objects added without an explicit size.
pub const DEFAULT_OBJECT_SIZE: f64 = 100.0;

/// Largest `columns × rows` a tilemap may have.
pub const MAX_TILEMAP_CELLS: usize = 1 << 22;
