//! Gaussian smoothing for noise reduction.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`]. Edge detection uses a
//! sigma directly; tone segmentation is specified by an odd kernel size,
//! which [`sigma_for_kernel`] converts with the usual kernel-to-sigma
//! rule (`0.3 * ((k - 1) / 2 - 1) + 0.8`).

use image::GrayImage;

/// Apply Gaussian blur to a grayscale image.
///
/// Higher `sigma` values produce more smoothing. Non-positive sigma values
/// (zero or negative) return the image unchanged, since `imageproc`'s
/// underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Sigma equivalent to a square Gaussian kernel of side `kernel`.
///
/// Kernels of size 1 or smaller mean "no smoothing" and map to 0.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    if kernel <= 1 {
        return 0.0;
    }
    let half = (kernel as f32 - 1.0) * 0.5;
    0.3f32.mul_add(half - 1.0, 0.8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sharp_edge_image() -> GrayImage {
        GrayImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        })
    }

    #[test]
    fn zero_sigma_returns_identical_image() {
        let img = sharp_edge_image();
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn blur_smooths_sharp_edge() {
        let blurred = gaussian_blur(&sharp_edge_image(), 2.0);
        assert!(blurred.get_pixel(4, 5).0[0] > 0);
        assert!(blurred.get_pixel(5, 5).0[0] < 255);
    }

    #[test]
    fn uniform_image_unchanged_by_blur() {
        let img = GrayImage::from_pixel(10, 10, image::Luma([200]));
        let blurred = gaussian_blur(&img, sigma_for_kernel(7));
        for pixel in blurred.pixels() {
            assert!((i16::from(pixel.0[0]) - 200).abs() <= 1);
        }
    }

    #[test]
    fn kernel_seven_maps_to_sigma_one_point_four() {
        assert!((sigma_for_kernel(7) - 1.4).abs() < 1e-6);
        assert!((sigma_for_kernel(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn trivial_kernel_disables_blur() {
        assert!(sigma_for_kernel(1).abs() < f32::EPSILON);
        assert!(sigma_for_kernel(0).abs() < f32::EPSILON);
    }
}
