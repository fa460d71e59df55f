//! Image decoding, working-resolution resize, and edge-map derivation.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP), resizes so the longer
//! side equals the configured working size, and derives the grayscale
//! and binary edge rasters every later stage consumes.
//!
//! This is the first step in the pipeline: raw bytes in, [`Preprocessed`] out.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, Preprocessed};

/// Resampling filter used when resizing to the working resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    Triangle,
    /// Bicubic (Catmull-Rom): good quality for photos.
    #[default]
    CatmullRom,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl ResizeFilter {
    const fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Triangle => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Parameters for [`preprocess`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Length of the longer image side after resizing, in pixels.
    pub working_size: u32,
    /// Filter used for the working-resolution resize.
    pub resize_filter: ResizeFilter,
    /// Gaussian sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny low threshold. Kept low so soft, sketch-like edges survive.
    pub canny_low: f32,
    /// Canny high threshold.
    pub canny_high: f32,
}

impl PreprocessConfig {
    /// Default working resolution (longer side, pixels).
    pub const DEFAULT_WORKING_SIZE: u32 = 1024;
    /// Default pre-edge blur sigma.
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.4;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 30.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 100.0;
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            working_size: Self::DEFAULT_WORKING_SIZE,
            resize_filter: ResizeFilter::default(),
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
        }
    }
}

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Size an image must be resized to so its longer side equals
/// `working_size`, never altering the aspect ratio.
///
/// Both sides are truncated toward zero and floored at one pixel.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn working_dimensions(width: u32, height: u32, working_size: u32) -> Dimensions {
    let longer = width.max(height).max(1);
    let scale = f64::from(working_size) / f64::from(longer);
    Dimensions {
        width: ((f64::from(width) * scale) as u32).max(1),
        height: ((f64::from(height) * scale) as u32).max(1),
    }
}

/// Resize `image` to the working resolution (up or down).
#[must_use]
pub fn resize_to_working(image: &DynamicImage, config: &PreprocessConfig) -> DynamicImage {
    let target = working_dimensions(image.width(), image.height(), config.working_size);
    if target.width == image.width() && target.height == image.height() {
        return image.clone();
    }
    image.resize_exact(
        target.width,
        target.height,
        config.resize_filter.to_image_filter(),
    )
}

/// Decode, resize, convert to grayscale, and detect edges.
///
/// Grayscale uses the standard luminance weights. The edge map is a
/// Gaussian blur followed by Canny with the configured thresholds.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or [`PipelineError::ImageDecode`]
/// when the bytes cannot be decoded.
pub fn preprocess(bytes: &[u8], config: &PreprocessConfig) -> Result<Preprocessed, PipelineError> {
    let decoded = decode(bytes)?;
    let resized = resize_to_working(&decoded, config);
    let grayscale = resized.to_luma8();
    let blurred = crate::blur::gaussian_blur(&grayscale, config.blur_sigma);
    let edges = crate::edge::canny(&blurred, config.canny_low, config.canny_high);
    let dimensions = Dimensions {
        width: grayscale.width(),
        height: grayscale.height(),
    };

    tracing::info!(
        source_width = decoded.width(),
        source_height = decoded.height(),
        width = dimensions.width,
        height = dimensions.height,
        "preprocessed image"
    );

    Ok(Preprocessed {
        resized: resized.to_rgba8(),
        grayscale,
        edges,
        dimensions,
    })
}
