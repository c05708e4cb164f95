//! Drawing surface abstraction.
//!
//! [`Surface`] is the subset of the `Canvas2D` API the renderer needs. The
//! browser implementation, [`CanvasSurface`], is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]; tests drive the renderer with a
//! recording surface instead.

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::error::EditorError;

/// Immediate-mode 2D drawing target.
///
/// Coordinates are in the current transform's space. Fallible calls mirror the
/// `Canvas2D` methods that can throw.
pub trait Surface {
    /// Reset the transform to device pixels scaled to CSS pixels.
    fn reset_transform(&mut self) -> Result<(), EditorError>;
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64) -> Result<(), EditorError>;
    fn rotate(&mut self, radians: f64) -> Result<(), EditorError>;
    fn scale(&mut self, x: f64, y: f64) -> Result<(), EditorError>;

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    /// Dash pattern in current units; empty for solid lines.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), EditorError>;
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_composite(&mut self, op: &str) -> Result<(), EditorError>;

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), EditorError>;
    fn ellipse(&mut self, x: f64, y: f64, rx: f64, ry: f64) -> Result<(), EditorError>;
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), EditorError>;
    /// Rendered width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f64;

    /// Draw a loaded image asset into a box. Returns `Ok(false)` when the asset
    /// is not available yet so the caller can draw a placeholder.
    fn draw_image(&mut self, asset_id: &str, x: f64, y: f64, w: f64, h: f64) -> Result<bool, EditorError>;
}

/// [`Surface`] over a browser `<canvas>` 2D context.
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    images: &'a HashMap<String, HtmlImageElement>,
    dpr: f64,
}

impl<'a> CanvasSurface<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, images: &'a HashMap<String, HtmlImageElement>, dpr: f64) -> Self {
        Self { ctx, images, dpr }
    }
}

fn js_err(e: JsValue) -> EditorError {
    EditorError::Surface(format!("{e:?}"))
}

impl Surface for CanvasSurface<'_> {
    fn reset_transform(&mut self) -> Result<(), EditorError> {
        self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0).map_err(js_err)
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), EditorError> {
        self.ctx.translate(x, y).map_err(js_err)
    }

    fn rotate(&mut self, radians: f64) -> Result<(), EditorError> {
        self.ctx.rotate(radians).map_err(js_err)
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<(), EditorError> {
        self.ctx.scale(x, y).map_err(js_err)
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.clear_rect(x, y, w, h);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), EditorError> {
        let dash = js_sys::Array::new();
        for s in segments {
            dash.push(&JsValue::from_f64(*s));
        }
        self.ctx.set_line_dash(&dash).map_err(js_err)
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_composite(&mut self, op: &str) -> Result<(), EditorError> {
        self.ctx.set_global_composite_operation(op).map_err(js_err)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), EditorError> {
        self.ctx.arc(x, y, radius, start, end).map_err(js_err)
    }

    fn ellipse(&mut self, x: f64, y: f64, rx: f64, ry: f64) -> Result<(), EditorError> {
        self.ctx
            .ellipse(x, y, rx, ry, 0.0, 0.0, std::f64::consts::TAU)
            .map_err(js_err)
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), EditorError> {
        self.ctx.fill_text(text, x, y).map_err(js_err)
    }

    fn measure_text(&self, text: &str) -> f64 {
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => f64::INFINITY,
        }
    }

    fn draw_image(&mut self, asset_id: &str, x: f64, y: f64, w: f64, h: f64) -> Result<bool, EditorError> {
        let Some(img) = self.images.get(asset_id) else {
            return Ok(false);
        };
        if !img.complete() || img.natural_width() == 0 {
            return Ok(false);
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)
            .map_err(js_err)?;
        Ok(true)
    }
}
