//! Bitmap text for canvas labels.
//!
//! Glyphs come from the 8x8 public-domain font in `font8x8`, scaled by
//! pixel replication. Characters without a glyph render as blanks.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

/// Glyph cell side in font pixels.
const GLYPH_SIZE: u32 = 8;

/// Draw `text` with its baseline at `baseline_y` and left edge at `x`.
///
/// Pixels falling outside the canvas are clipped.
pub fn draw_text(
    canvas: &mut RgbaImage,
    text: &str,
    x: i32,
    baseline_y: i32,
    scale: u32,
    color: [u8; 3],
) {
    let scale = scale.max(1);
    let cell = i64::from(GLYPH_SIZE * scale);
    let top = i64::from(baseline_y) - cell;
    let paint = Rgba([color[0], color[1], color[2], 255]);

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let Ok(index) = i64::try_from(i) else {
            break;
        };
        let left = i64::from(x) + index * cell;
        for (row, bits) in (0..GLYPH_SIZE).zip(glyph) {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = left + i64::from(col * scale);
                let py = top + i64::from(row * scale);
                fill_block(canvas, px, py, scale, paint);
            }
        }
    }
}

/// Width in pixels that [`draw_text`] would cover.
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    chars.saturating_mul(GLYPH_SIZE * scale.max(1))
}

fn fill_block(canvas: &mut RgbaImage, x: i64, y: i64, size: u32, paint: Rgba<u8>) {
    for dy in 0..i64::from(size) {
        for dx in 0..i64::from(size) {
            let (Ok(px), Ok(py)) = (u32::try_from(x + dx), u32::try_from(y + dy)) else {
                continue;
            };
            if px < canvas.width() && py < canvas.height() {
                canvas.put_pixel(px, py, paint);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn inked(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| **p != WHITE).count()
    }

    #[test]
    fn text_sits_above_baseline() {
        let mut canvas = RgbaImage::from_pixel(200, 60, WHITE);
        draw_text(&mut canvas, "Step 1", 10, 40, 2, [60, 60, 60]);
        assert!(inked(&canvas) > 0);
        for (x, y, p) in canvas.enumerate_pixels() {
            if *p != WHITE {
                assert!((24..40).contains(&y), "ink at y={y}");
                assert!((10..10 + 6 * 16).contains(&x), "ink at x={x}");
            }
        }
    }

    #[test]
    fn text_is_clipped_at_canvas_edges() {
        let mut canvas = RgbaImage::from_pixel(20, 20, WHITE);
        draw_text(&mut canvas, "Start Here", 12, 5, 3, [255, 140, 0]);
        draw_text(&mut canvas, "X", -100, -100, 1, [0, 0, 0]);
        assert_eq!(canvas.dimensions(), (20, 20));
    }

    #[test]
    fn spaces_leave_no_ink() {
        let mut canvas = RgbaImage::from_pixel(64, 16, WHITE);
        draw_text(&mut canvas, "    ", 0, 12, 1, [0, 0, 0]);
        assert_eq!(inked(&canvas), 0);
    }

    #[test]
    fn width_scales_with_length() {
        assert_eq!(text_width("abc", 2), 48);
        assert_eq!(text_width("", 2), 0);
    }
}
