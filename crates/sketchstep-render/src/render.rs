//! Rasterizes one drawing step onto a gridded canvas.
//!
//! Layers, bottom to top: white paper, grid and border, previously drawn
//! strokes, this step's highlighted strokes, the shading hatch, the start
//! marker, and the step header. Every call starts from a blank canvas.

use std::path::Path;

use image::{ImageFormat, RgbaImage};
use sketchstep_pipeline::tone::ToneBand;
use sketchstep_pipeline::{AnalyzedShape, Point, ToneMask};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect,
    Stroke, Transform,
};

use crate::canvas::{CanvasOptions, DrawArea, Footprint};
use crate::error::RenderError;
use crate::text::{draw_text, text_width};

const GRID_COLOR: [u8; 3] = [220, 220, 220];
const BORDER_COLOR: [u8; 3] = [200, 200, 200];
const PREVIOUS_STROKE: [u8; 3] = [80, 80, 80];
const NEW_STROKE: [u8; 3] = [200, 30, 30];
const MARKER_COLOR: [u8; 3] = [255, 140, 0];
const DEEP_HATCH: [u8; 3] = [180, 180, 180];
const MID_HATCH: [u8; 3] = [210, 210, 210];
const HEADER_COLOR: [u8; 3] = [60, 60, 60];
const DESCRIPTION_COLOR: [u8; 3] = [120, 120, 120];

const BORDER_WIDTH: f32 = 2.0;
const PREVIOUS_WIDTH: f32 = 2.0;
const NEW_WIDTH: f32 = 3.0;
const MARKER_RADIUS: f32 = 12.0;
const MARKER_RING_WIDTH: f32 = 3.0;
const MARKER_DOT_RADIUS: f32 = 4.0;
/// Hatch columns are sampled every this many pixels.
const HATCH_STRIDE: usize = 3;

/// Everything needed to draw one step. All state is explicit.
#[derive(Debug, Clone, Copy)]
pub struct StepScene<'a> {
    /// Step number shown in the header.
    pub step_number: usize,
    /// Phase name shown in the header.
    pub phase_name: &'a str,
    /// Instruction line under the header.
    pub description: &'a str,
    /// Shapes introduced in earlier steps, drawn muted.
    pub previous_shapes: &'a [AnalyzedShape],
    /// Shapes introduced in this step, drawn highlighted.
    pub new_shapes: &'a [AnalyzedShape],
    /// Width divided by height of the source image.
    pub image_aspect: f64,
    /// Start marker position, honored on steps 0 and 1 only.
    pub start_centroid: Option<Point>,
    /// Tone bands to hatch, for the shading step.
    pub shading: Option<Shading<'a>>,
}

/// A tone mask and the band values that receive a hatch.
///
/// Mask pixels matching neither value stay blank.
#[derive(Debug, Clone, Copy)]
pub struct Shading<'a> {
    /// Per-pixel band values.
    pub mask: &'a ToneMask,
    /// Band value hatched densely.
    pub deep_value: Option<u8>,
    /// Band value hatched sparsely.
    pub mid_value: Option<u8>,
}

impl<'a> Shading<'a> {
    /// Hatch the first two entries of `bands`, the darkest when the table is
    /// in increasing-intensity order.
    #[must_use]
    pub fn for_bands(mask: &'a ToneMask, bands: &[ToneBand]) -> Self {
        Self {
            mask,
            deep_value: bands.first().map(|band| band.value),
            mid_value: bands.get(1).map(|band| band.value),
        }
    }
}

/// Render one step and, when `output_path` is given, save it as PNG.
///
/// # Errors
///
/// Returns [`RenderError::CanvasAllocation`] if the canvas cannot be
/// allocated, or [`RenderError::CreateDir`] / [`RenderError::Encode`] if
/// the image cannot be written.
pub fn render_step(
    scene: &StepScene<'_>,
    options: &CanvasOptions,
    output_path: Option<&Path>,
) -> Result<RgbaImage, RenderError> {
    let (width, height) = options.paper_size.pixels();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or(RenderError::CanvasAllocation { width, height })?;
    pixmap.fill(Color::WHITE);

    let area = DrawArea::for_canvas(width, height);
    draw_grid(&mut pixmap, area, options.grid_divisions);

    let footprint = area.fit(scene.image_aspect);
    stroke_shapes(&mut pixmap, scene.previous_shapes, footprint, PREVIOUS_STROKE, PREVIOUS_WIDTH);
    stroke_shapes(&mut pixmap, scene.new_shapes, footprint, NEW_STROKE, NEW_WIDTH);

    if let Some(shading) = &scene.shading {
        hatch_shading(&mut pixmap, shading, footprint);
    }

    let marker = scene
        .start_centroid
        .filter(|_| scene.step_number <= 1)
        .map(|centroid| footprint.to_canvas(centroid));
    if let Some(center) = marker {
        draw_marker_shape(&mut pixmap, center);
    }

    let mut canvas = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(RenderError::CanvasAllocation { width, height })?;

    if let Some(center) = marker {
        draw_marker_label(&mut canvas, center);
    }
    draw_header(&mut canvas, scene);

    if let Some(path) = output_path {
        save_png(&canvas, path)?;
    }

    tracing::debug!(
        step = scene.step_number,
        previous = scene.previous_shapes.len(),
        new = scene.new_shapes.len(),
        shading = scene.shading.is_some(),
        "rendered step"
    );
    Ok(canvas)
}

/// Write `canvas` as a PNG, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`RenderError::CreateDir`] if the parent directory cannot be
/// created, or [`RenderError::Encode`] if encoding or writing fails.
pub fn save_png(canvas: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    canvas
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| RenderError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

fn solid(color: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::cast_precision_loss)]
fn draw_grid(pixmap: &mut Pixmap, area: DrawArea, divisions: u32) {
    let paint = Paint {
        anti_alias: false,
        ..solid(GRID_COLOR)
    };
    let (xs, ys) = area.grid_lines(divisions);
    let (top, left) = (area.y_start as f32, area.x_start as f32);
    let (w, h) = (area.width() as f32, area.height() as f32);

    for x in xs {
        if let Some(rect) = Rect::from_xywh(x as f32, top, 1.0, h + 1.0) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
    for y in ys {
        if let Some(rect) = Rect::from_xywh(left, y as f32, w + 1.0, 1.0) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    if let Some(rect) = Rect::from_xywh(left, top, w, h) {
        let border = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: BORDER_WIDTH,
            ..Stroke::default()
        };
        pixmap.stroke_path(
            &border,
            &solid(BORDER_COLOR),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

/// Closed anti-aliased polylines through integer pixel centers.
#[allow(clippy::cast_precision_loss)]
fn stroke_shapes(
    pixmap: &mut Pixmap,
    shapes: &[AnalyzedShape],
    footprint: Footprint,
    color: [u8; 3],
    width: f32,
) {
    let paint = solid(color);
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    for shape in shapes {
        let mut pb = PathBuilder::new();
        let mut points = shape.points.iter().map(|&p| footprint.to_canvas(p));
        let Some((x0, y0)) = points.next() else {
            continue;
        };
        pb.move_to(x0 as f32 + 0.5, y0 as f32 + 0.5);
        for (x, y) in points {
            pb.line_to(x as f32 + 0.5, y as f32 + 0.5);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            continue;
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Stylized cross-hatch over the footprint: dense on the deep band,
/// sparse on the mid band, nothing elsewhere.
fn hatch_shading(pixmap: &mut Pixmap, shading: &Shading<'_>, footprint: Footprint) {
    let mask = shading.mask;
    if footprint.width == 0 || footprint.height == 0 || mask.width() == 0 || mask.height() == 0 {
        return;
    }
    let resized = image::imageops::resize(
        mask.as_image(),
        footprint.width,
        footprint.height,
        image::imageops::FilterType::Nearest,
    );
    let (Some(deep), Some(mid)) = (opaque(DEEP_HATCH), opaque(MID_HATCH)) else {
        return;
    };

    let canvas_width = pixmap.width() as usize;
    let pixels = pixmap.pixels_mut();
    for y in 0..footprint.height {
        for x in (0..footprint.width).step_by(HATCH_STRIDE) {
            let phase = (x + y) as usize;
            let value = Some(resized.get_pixel(x, y).0[0]);
            let color = if value == shading.deep_value && phase % 6 < 3 {
                deep
            } else if value == shading.mid_value && phase % 10 < 2 {
                mid
            } else {
                continue;
            };
            let index = (footprint.y + y) as usize * canvas_width + (footprint.x + x) as usize;
            if let Some(pixel) = pixels.get_mut(index) {
                *pixel = color;
            }
        }
    }
}

fn opaque(color: [u8; 3]) -> Option<PremultipliedColorU8> {
    PremultipliedColorU8::from_rgba(color[0], color[1], color[2], 255)
}

#[allow(clippy::cast_precision_loss)]
fn draw_marker_shape(pixmap: &mut Pixmap, (cx, cy): (i32, i32)) {
    let (x, y) = (cx as f32 + 0.5, cy as f32 + 0.5);
    let paint = solid(MARKER_COLOR);

    if let Some(ring) = PathBuilder::from_circle(x, y, MARKER_RADIUS) {
        let stroke = Stroke {
            width: MARKER_RING_WIDTH,
            ..Stroke::default()
        };
        pixmap.stroke_path(&ring, &paint, &stroke, Transform::identity(), None);
    }
    if let Some(dot) = PathBuilder::from_circle(x, y, MARKER_DOT_RADIUS) {
        pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_marker_label(canvas: &mut RgbaImage, (cx, cy): (i32, i32)) {
    const LABEL: &str = "Start Here";
    const SCALE: u32 = 2;
    let gap = MARKER_RADIUS as i32 + 6;
    let width = text_width(LABEL, SCALE) as i32;
    let right_side = cx + gap;
    // Flip to the left of the marker when the label would leave the canvas.
    let x = if right_side + width > canvas.width() as i32 {
        cx - gap - width
    } else {
        right_side
    };
    draw_text(canvas, LABEL, x, cy + 5, SCALE, MARKER_COLOR);
}

fn draw_header(canvas: &mut RgbaImage, scene: &StepScene<'_>) {
    let title = format!("Step {}: {}", scene.step_number, scene.phase_name);
    draw_text(canvas, &title, 20, 30, 3, HEADER_COLOR);
    draw_text(canvas, scene.description, 20, 55, 2, DESCRIPTION_COLOR);
}
