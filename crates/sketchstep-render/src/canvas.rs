//! Canvas geometry: paper presets, the drawing area, and the single
//! normalized-to-pixel transform shared by strokes, markers, and hatching.

use serde::{Deserialize, Serialize};
use sketchstep_pipeline::Point;

/// Fraction of each canvas side reserved as margin around the drawing area.
pub const MARGIN_FRACTION: f64 = 0.05;

/// Supported paper presets, in pixels at 150 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// 210 x 297 mm.
    #[default]
    A4,
    /// 297 x 420 mm.
    A3,
    /// Square format.
    #[serde(rename = "square")]
    Square,
}

impl PaperSize {
    /// Canvas size in pixels as `(width, height)`.
    #[must_use]
    pub const fn pixels(self) -> (u32, u32) {
        match self {
            Self::A4 => (1240, 1754),
            Self::A3 => (1754, 2480),
            Self::Square => (1500, 1500),
        }
    }

    /// Resolve a preset by name. Unknown names fall back to A4.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "a3" => Self::A3,
            "square" => Self::Square,
            "a4" => Self::A4,
            other => {
                tracing::warn!(paper_size = other, "unknown paper size, using A4");
                Self::A4
            }
        }
    }

    /// Name used in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::Square => "square",
        }
    }
}

/// Per-session canvas settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasOptions {
    /// Paper preset.
    pub paper_size: PaperSize,
    /// Grid cells per side.
    pub grid_divisions: u32,
}

impl CanvasOptions {
    /// Smallest accepted grid.
    pub const MIN_GRID_DIVISIONS: u32 = 4;
    /// Largest accepted grid.
    pub const MAX_GRID_DIVISIONS: u32 = 20;
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            grid_divisions: 8,
        }
    }
}

/// Margin-inset rectangle in canvas pixels where the grid and strokes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawArea {
    /// Left edge.
    pub x_start: u32,
    /// Top edge.
    pub y_start: u32,
    /// Right edge.
    pub x_end: u32,
    /// Bottom edge.
    pub y_end: u32,
}

impl DrawArea {
    /// Drawing area for a canvas of `width` x `height` pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let mx = (f64::from(width) * MARGIN_FRACTION) as u32;
        let my = (f64::from(height) * MARGIN_FRACTION) as u32;
        Self {
            x_start: mx,
            y_start: my,
            x_end: width.saturating_sub(mx),
            y_end: height.saturating_sub(my),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        self.x_end - self.x_start
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(self) -> u32 {
        self.y_end - self.y_start
    }

    /// Positions of the `divisions + 1` grid lines along each axis,
    /// as `(xs, ys)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn grid_lines(self, divisions: u32) -> (Vec<u32>, Vec<u32>) {
        let divisions = divisions.max(1);
        let along = |start: u32, span: u32| -> Vec<u32> {
            (0..=divisions)
                .map(|i| start + (u64::from(i) * u64::from(span) / u64::from(divisions)) as u32)
                .collect()
        };
        (
            along(self.x_start, self.width()),
            along(self.y_start, self.height()),
        )
    }

    /// Largest rectangle of `image_aspect` that fits, centered in this area.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fit(self, image_aspect: f64) -> Footprint {
        let area_w = self.width();
        let area_h = self.height();
        let area_aspect = if area_h == 0 {
            1.0
        } else {
            f64::from(area_w) / f64::from(area_h)
        };
        let aspect = if image_aspect.is_finite() && image_aspect > 0.0 {
            image_aspect
        } else {
            1.0
        };

        let (width, height) = if aspect > area_aspect {
            (area_w, (f64::from(area_w) / aspect) as u32)
        } else {
            ((f64::from(area_h) * aspect) as u32, area_h)
        };

        Footprint {
            x: self.x_start + (area_w - width) / 2,
            y: self.y_start + (area_h - height) / 2,
            width,
            height,
        }
    }
}

/// Where the image lands on the canvas. The one source of truth for
/// mapping normalized coordinates to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Left edge in canvas pixels.
    pub x: u32,
    /// Top edge in canvas pixels.
    pub y: u32,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
}

impl Footprint {
    /// Canvas pixel for a normalized point, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_canvas(self, p: Point) -> (i32, i32) {
        (
            p.x.mul_add(f64::from(self.width), f64::from(self.x)) as i32,
            p.y.mul_add(f64::from(self.height), f64::from(self.y)) as i32,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn paper_presets() {
        assert_eq!(PaperSize::A4.pixels(), (1240, 1754));
        assert_eq!(PaperSize::A3.pixels(), (1754, 2480));
        assert_eq!(PaperSize::Square.pixels(), (1500, 1500));
    }

    #[test]
    fn unknown_paper_falls_back_to_a4() {
        assert_eq!(PaperSize::from_name("letter"), PaperSize::A4);
        assert_eq!(PaperSize::from_name("A3"), PaperSize::A3);
        assert_eq!(PaperSize::from_name("Square"), PaperSize::Square);
    }

    #[test]
    fn draw_area_is_margin_inset() {
        let area = DrawArea::for_canvas(1240, 1754);
        assert_eq!(
            area,
            DrawArea {
                x_start: 62,
                y_start: 87,
                x_end: 1178,
                y_end: 1667
            }
        );
    }

    #[test]
    fn grid_has_divisions_plus_one_lines() {
        let area = DrawArea::for_canvas(1500, 1500);
        let (xs, ys) = area.grid_lines(8);
        assert_eq!(xs.len(), 9);
        assert_eq!(ys.len(), 9);
        assert_eq!(xs[0], area.x_start);
        assert_eq!(*xs.last().unwrap(), area.x_end);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn wide_image_fits_width_and_centers_vertically() {
        let area = DrawArea::for_canvas(1500, 1500);
        let fp = area.fit(2.0);
        assert_eq!(fp.width, area.width());
        assert_eq!(fp.height, area.width() / 2);
        assert_eq!(fp.x, area.x_start);
        assert_eq!(fp.y, area.y_start + (area.height() - fp.height) / 2);
    }

    #[test]
    fn tall_image_fits_height_and_centers_horizontally() {
        let area = DrawArea::for_canvas(1240, 1754);
        let fp = area.fit(0.5);
        assert_eq!(fp.height, area.height());
        assert_eq!(fp.width, area.height() / 2);
        assert_eq!(fp.x, area.x_start + (area.width() - fp.width) / 2);
    }

    #[test]
    fn transform_maps_unit_corners_to_footprint() {
        let fp = DrawArea::for_canvas(1500, 1500).fit(1.0);
        let (x0, y0) = fp.to_canvas(Point::new(0.0, 0.0));
        let (x1, y1) = fp.to_canvas(Point::new(1.0, 1.0));
        assert_eq!((x0, y0), (fp.x as i32, fp.y as i32));
        assert_eq!((x1, y1), ((fp.x + fp.width) as i32, (fp.y + fp.height) as i32));
    }

    #[test]
    fn transform_is_repeatable() {
        let area = DrawArea::for_canvas(1754, 2480);
        let points: Vec<Point> = (0..50)
            .map(|i| Point::new(f64::from(i) / 49.0, 1.0 - f64::from(i) / 49.0))
            .collect();
        let first: Vec<_> = points.iter().map(|&p| area.fit(0.75).to_canvas(p)).collect();
        let second: Vec<_> = points.iter().map(|&p| area.fit(0.75).to_canvas(p)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_aspect_is_square() {
        let area = DrawArea::for_canvas(1500, 1500);
        assert_eq!(area.fit(f64::NAN), area.fit(1.0));
        assert_eq!(area.fit(0.0), area.fit(1.0));
    }
}
