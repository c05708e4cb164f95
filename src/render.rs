//! Rendering: draws the full editor view onto a [`Surface`].
//!
//! The renderer receives read-only views of the scene, camera and UI state and
//! produces pixels. It never mutates application state. Draw order is fixed:
//! background, grid, scene border, every visible layer bottom-to-top (objects in
//! vector order), then selection decorations on top of everything.
//!
//! Objects are drawn in scene units under a `translate(origin) · scale(zoom)`
//! transform; each object is then drawn about its own center so rotation is a
//! single `rotate` call.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Size};
use crate::config::EditorConfig;
use crate::consts::{GRID_MIN_SPACING_PX, HANDLE_HALF_PX, SELECTION_DASH_PX};
use crate::error::EditorError;
use crate::hit::ResizeAnchor;
use crate::input::UiState;
use crate::scene::{ObjectKind, Scene, SceneObject, SceneStore, ShapeProps, SpriteProps, TextProps, TilemapProps};
use crate::surface::Surface;

const GRID_COLOR: &str = "rgba(255, 255, 255, 0.08)";
const BORDER_COLOR: &str = "#888888";
const SELECTION_COLOR: &str = "#1E90FF";
const HANDLE_FILL: &str = "#ffffff";
const PLACEHOLDER_FILL: &str = "rgba(128, 128, 128, 0.35)";
const PLACEHOLDER_STROKE: &str = "#9a9a9a";
const TILEMAP_BOUNDS_COLOR: &str = "rgba(255, 255, 255, 0.15)";

/// Opacity applied to disabled objects.
const DISABLED_ALPHA: f64 = 0.4;

/// Line height as a multiple of font size.
const LINE_HEIGHT: f64 = 1.2;

/// Draw the full scene: background, grid, objects and selection UI.
///
/// `viewport` is in CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails. Every `save` issued by
/// the frame is still matched by a `restore`.
pub fn draw<S: Surface>(
    s: &mut S,
    store: &SceneStore,
    camera: &Camera,
    ui: &UiState,
    config: &EditorConfig,
    viewport: Size,
) -> Result<(), EditorError> {
    // Layer 1: clear and set up transforms.
    s.reset_transform()?;
    s.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    s.save();
    let result = draw_scene(s, store, camera, ui, config, viewport);
    s.restore();
    result
}

fn draw_scene<S: Surface>(
    s: &mut S,
    store: &SceneStore,
    camera: &Camera,
    ui: &UiState,
    config: &EditorConfig,
    viewport: Size,
) -> Result<(), EditorError> {
    let scene = store.scene();
    let origin = camera.scene_origin(viewport, scene.size());
    let zoom = camera.scale();
    s.translate(origin.x, origin.y)?;
    s.scale(zoom, zoom)?;

    // Layer 2: scene backdrop.
    s.set_fill_style(&scene.background_color);
    s.fill_rect(0.0, 0.0, scene.width, scene.height);
    if config.show_grid && grid_visible(config.grid_size, zoom) {
        draw_grid(s, scene, config.grid_size, zoom);
    }
    s.set_stroke_style(BORDER_COLOR);
    s.set_line_width(1.0 / zoom);
    s.stroke_rect(0.0, 0.0, scene.width, scene.height);

    // Layer 3: objects, bottom layer first.
    for layer in scene.layers.iter().filter(|l| l.visible) {
        for obj in &layer.objects {
            draw_object(s, obj)?;
        }
    }

    // Layer 4: selection UI.
    for layer in scene.layers.iter().filter(|l| l.visible) {
        for obj in layer.objects.iter().filter(|o| ui.is_selected(&o.id)) {
            draw_selection(s, obj, zoom)?;
        }
    }
    Ok(())
}

/// Whether grid lines at this spacing and zoom are far enough apart to draw.
#[must_use]
pub fn grid_visible(grid_size: f64, zoom: f64) -> bool {
    grid_size > 0.0 && grid_size * zoom >= GRID_MIN_SPACING_PX
}

/// Deterministic placeholder color for a tile index.
#[must_use]
pub fn tile_color(tile: u32) -> String {
    let hue = (u64::from(tile) * 47) % 360;
    format!("hsl({hue}, 60%, 55%)")
}

fn draw_grid<S: Surface>(s: &mut S, scene: &Scene, grid: f64, zoom: f64) {
    s.set_stroke_style(GRID_COLOR);
    s.set_line_width(1.0 / zoom);
    s.begin_path();
    let mut x = grid;
    while x < scene.width {
        s.move_to(x, 0.0);
        s.line_to(x, scene.height);
        x += grid;
    }
    let mut y = grid;
    while y < scene.height {
        s.move_to(0.0, y);
        s.line_to(scene.width, y);
        y += grid;
    }
    s.stroke();
}

// =============================================================
// Object dispatch
// =============================================================

fn draw_object<S: Surface>(s: &mut S, obj: &SceneObject) -> Result<(), EditorError> {
    s.save();
    let result = draw_object_local(s, obj);
    s.restore();
    result
}

fn draw_object_local<S: Surface>(s: &mut S, obj: &SceneObject) -> Result<(), EditorError> {
    translate_and_rotate(s, obj)?;
    if !obj.enabled {
        s.set_global_alpha(DISABLED_ALPHA);
    }
    match &obj.kind {
        ObjectKind::Rectangle(props) => draw_rect(s, obj, props),
        ObjectKind::Circle(props) => draw_circle(s, obj, props),
        ObjectKind::Text(props) => draw_text(s, obj, props),
        ObjectKind::Tilemap(props) => {
            draw_tilemap(s, obj, props);
            Ok(())
        }
        ObjectKind::Sprite(props) => draw_sprite(s, obj, props),
        ObjectKind::Unknown { type_name, .. } => draw_placeholder(s, obj, type_name),
    }
}

// =============================================================
// Shape renderers
// =============================================================

fn draw_rect<S: Surface>(s: &mut S, obj: &SceneObject, props: &ShapeProps) -> Result<(), EditorError> {
    let (x, y) = (-obj.width / 2.0, -obj.height / 2.0);
    let radius = props.corner_radius.min(obj.width / 2.0).min(obj.height / 2.0);

    s.set_fill_style(&props.fill_color);
    if radius > 0.0 {
        rounded_rect_path(s, x, y, obj.width, obj.height, radius)?;
        s.fill();
    } else {
        s.fill_rect(x, y, obj.width, obj.height);
    }

    if props.border_width > 0.0 {
        s.set_stroke_style(&props.border_color);
        s.set_line_width(props.border_width);
        if radius > 0.0 {
            s.stroke();
        } else {
            s.stroke_rect(x, y, obj.width, obj.height);
        }
    }
    Ok(())
}

fn rounded_rect_path<S: Surface>(s: &mut S, x: f64, y: f64, w: f64, h: f64, r: f64) -> Result<(), EditorError> {
    use std::f64::consts::{FRAC_PI_2, PI};

    s.begin_path();
    s.move_to(x + r, y);
    s.line_to(x + w - r, y);
    s.arc(x + w - r, y + r, r, -FRAC_PI_2, 0.0)?;
    s.line_to(x + w, y + h - r);
    s.arc(x + w - r, y + h - r, r, 0.0, FRAC_PI_2)?;
    s.line_to(x + r, y + h);
    s.arc(x + r, y + h - r, r, FRAC_PI_2, PI)?;
    s.line_to(x, y + r);
    s.arc(x + r, y + r, r, PI, PI + FRAC_PI_2)?;
    s.close_path();
    Ok(())
}

fn draw_circle<S: Surface>(s: &mut S, obj: &SceneObject, props: &ShapeProps) -> Result<(), EditorError> {
    if obj.width <= 0.0 || obj.height <= 0.0 {
        return Ok(());
    }
    s.begin_path();
    s.ellipse(0.0, 0.0, obj.width / 2.0, obj.height / 2.0)?;
    s.set_fill_style(&props.fill_color);
    s.fill();
    if props.border_width > 0.0 {
        s.set_stroke_style(&props.border_color);
        s.set_line_width(props.border_width);
        s.stroke();
    }
    Ok(())
}

fn draw_tilemap<S: Surface>(s: &mut S, obj: &SceneObject, tm: &TilemapProps) {
    let (x0, y0) = (-obj.width / 2.0, -obj.height / 2.0);
    let ts = tm.tile_size;
    let columns = tm.columns as usize;
    if columns > 0 {
        for (idx, &tile) in tm.tile_data.iter().enumerate().filter(|(_, t)| **t != 0) {
            #[allow(clippy::cast_precision_loss)]
            let (col, row) = ((idx % columns) as f64, (idx / columns) as f64);
            s.set_fill_style(&tile_color(tile));
            s.fill_rect(x0 + col * ts, y0 + row * ts, ts, ts);
        }
    }
    s.set_stroke_style(TILEMAP_BOUNDS_COLOR);
    s.set_line_width(1.0);
    s.stroke_rect(x0, y0, f64::from(tm.columns) * ts, f64::from(tm.rows) * ts);
}

/// The tint is a multiply fill over the whole object box, so transparent
/// parts of the image pick up the tint color as well.
fn draw_sprite<S: Surface>(s: &mut S, obj: &SceneObject, props: &SpriteProps) -> Result<(), EditorError> {
    let Some(image_id) = props.image_id.as_deref() else {
        return draw_placeholder(s, obj, &obj.name);
    };

    s.save();
    let drawn = draw_sprite_image(s, obj, props, image_id);
    s.restore();

    if drawn? { Ok(()) } else { draw_placeholder(s, obj, image_id) }
}

fn draw_sprite_image<S: Surface>(
    s: &mut S,
    obj: &SceneObject,
    props: &SpriteProps,
    image_id: &str,
) -> Result<bool, EditorError> {
    let (x, y) = (-obj.width / 2.0, -obj.height / 2.0);
    s.set_global_alpha(props.opacity.clamp(0.0, 1.0) * if obj.enabled { 1.0 } else { DISABLED_ALPHA });
    s.scale(if props.flip_x { -1.0 } else { 1.0 }, if props.flip_y { -1.0 } else { 1.0 })?;
    let drawn = s.draw_image(image_id, x, y, obj.width, obj.height)?;
    if drawn {
        if let Some(tint) = props.tint.as_deref() {
            s.set_composite("multiply")?;
            s.set_fill_style(tint);
            s.fill_rect(x, y, obj.width, obj.height);
        }
    }
    Ok(drawn)
}

/// Labeled box used for unresolved images and unknown object types.
fn draw_placeholder<S: Surface>(s: &mut S, obj: &SceneObject, label: &str) -> Result<(), EditorError> {
    let (x, y) = (-obj.width / 2.0, -obj.height / 2.0);
    s.set_fill_style(PLACEHOLDER_FILL);
    s.fill_rect(x, y, obj.width, obj.height);
    s.set_stroke_style(PLACEHOLDER_STROKE);
    s.set_line_width(1.0);
    s.stroke_rect(x, y, obj.width, obj.height);

    s.begin_path();
    s.move_to(x, y);
    s.line_to(x + obj.width, y + obj.height);
    s.move_to(x + obj.width, y);
    s.line_to(x, y + obj.height);
    s.stroke();

    if label.is_empty() {
        return Ok(());
    }
    let font_size = (obj.height / 5.0).clamp(8.0, 14.0);
    s.set_fill_style("#ffffff");
    s.set_font(&format!("{font_size:.0}px sans-serif"));
    s.set_text_align("center");
    s.set_text_baseline("middle");
    let fitted = fit_text_with_ellipsis(s, label, (obj.width - 4.0).max(1.0));
    s.fill_text(&fitted, 0.0, 0.0)
}

// =============================================================
// Text
// =============================================================

fn draw_text<S: Surface>(s: &mut S, obj: &SceneObject, props: &TextProps) -> Result<(), EditorError> {
    let (x, y) = (-obj.width / 2.0, -obj.height / 2.0);
    if let Some(bg) = props.background_color.as_deref() {
        s.set_fill_style(bg);
        s.fill_rect(x, y, obj.width, obj.height);
    }
    if props.text.is_empty() {
        return Ok(());
    }

    let font_size = props.font_size.max(1.0);
    s.set_font(&format!("{} {font_size}px {}", props.font_style, props.font_family));
    s.set_fill_style(&props.text_color);
    s.set_text_baseline("top");
    let (align, text_x) = match props.text_align.as_str() {
        "center" => ("center", 0.0),
        "right" => ("right", obj.width / 2.0),
        _ => ("left", x),
    };
    s.set_text_align(align);

    let lines = if props.wrap {
        wrap_text_lines(s, &props.text, obj.width.max(1.0))
    } else {
        props.text.lines().map(str::to_owned).collect()
    };
    let line_height = font_size * LINE_HEIGHT;
    for (idx, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let line_y = y + idx as f64 * line_height;
        s.fill_text(line, text_x, line_y)?;
    }
    Ok(())
}

/// Greedy word wrap to `max_w`, breaking words that are wider than a line.
pub fn wrap_text_lines<S: Surface>(s: &S, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let words: Vec<&str> = raw_line.split_whitespace().collect();
        if words.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if s.measure_text(&candidate) <= max_w {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if s.measure_text(word) <= max_w {
                current = word.to_owned();
            } else {
                let mut chunks = break_long_word(s, word, max_w);
                if let Some(last) = chunks.pop() {
                    out.extend(chunks);
                    current = last;
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn break_long_word<S: Surface>(s: &S, word: &str, max_w: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && s.measure_text(&candidate) > max_w {
            lines.push(current);
            current = ch.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn fit_text_with_ellipsis<S: Surface>(s: &S, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if s.measure_text(trimmed) <= max_w {
        return trimmed.to_owned();
    }

    let ellipsis = "...";
    let mut chars: Vec<char> = trimmed.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{}", chars.iter().collect::<String>().trim_end(), ellipsis);
        if s.measure_text(&candidate) <= max_w {
            return candidate;
        }
    }
    ellipsis.to_owned()
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection<S: Surface>(s: &mut S, obj: &SceneObject, zoom: f64) -> Result<(), EditorError> {
    s.save();
    let result = draw_selection_local(s, obj, zoom);
    s.restore();
    result
}

fn draw_selection_local<S: Surface>(s: &mut S, obj: &SceneObject, zoom: f64) -> Result<(), EditorError> {
    translate_and_rotate(s, obj)?;

    let (x, y) = (-obj.width / 2.0, -obj.height / 2.0);
    let dash = SELECTION_DASH_PX / zoom;
    s.set_stroke_style(SELECTION_COLOR);
    s.set_line_width(1.0 / zoom);
    s.set_line_dash(&[dash, dash])?;
    s.stroke_rect(x, y, obj.width, obj.height);
    s.set_line_dash(&[])?;

    let half = HANDLE_HALF_PX / zoom;
    s.set_fill_style(HANDLE_FILL);
    for anchor in ResizeAnchor::ALL {
        let p = anchor.position(x, y, obj.width, obj.height);
        s.fill_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
        s.stroke_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
    }
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Translate to the object's center and rotate by its rotation angle.
fn translate_and_rotate<S: Surface>(s: &mut S, obj: &SceneObject) -> Result<(), EditorError> {
    let c = obj.center();
    s.translate(c.x, c.y)?;
    s.rotate(obj.rotation.to_radians())?;
    Ok(())
}
