//! Grid and angle quantization.
//!
//! Both functions are idempotent: snapping an already-snapped value returns it
//! unchanged. A non-positive or non-finite step disables quantization.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

/// Round `value` to the nearest multiple of `grid_size`.
#[must_use]
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Round an angle in degrees to the nearest multiple of `step`.
#[must_use]
pub fn snap_angle(degrees: f64, step: f64) -> f64 {
    snap(degrees, step)
}

/// Apply [`snap`] only when `enabled`.
#[must_use]
pub fn snap_if(value: f64, grid_size: f64, enabled: bool) -> f64 {
    if enabled { snap(value, grid_size) } else { value }
}
