//! Canny edge detection and gap-closing dilation.
//!
//! Wraps [`imageproc::edges::canny`] to detect edges in a blurred grayscale
//! image. Returns a binary image where white pixels (255) are edges and
//! black pixels (0) are background.
//!
//! [`close_gaps`] thickens the edge map by one pixel so that faint,
//! slightly broken strokes still enclose a shape for contour extraction.

use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Minimum allowed Canny threshold.
///
/// A low threshold of zero causes every pixel with any gradient to be
/// treated as a potential edge, producing an extremely dense edge map.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

/// Dilate a binary edge map with a 3x3 cross structuring element.
///
/// Bridges one-pixel gaps between edge fragments before shape extraction.
#[must_use = "returns the dilated edge map"]
pub fn close_gaps(edges: &GrayImage) -> GrayImage {
    imageproc::morphology::dilate(edges, Norm::L1, 1)
}
