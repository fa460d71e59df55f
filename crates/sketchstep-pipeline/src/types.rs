//! Shared types for the sketchstep image-structure pipeline.

use serde::{Deserialize, Serialize};

use crate::contour::ContourConfig;
use crate::planner::PlannerConfig;
use crate::preprocess::PreprocessConfig;
use crate::shading::ShadingConfig;
use crate::tone::ToneConfig;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// resized working image without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point.
///
/// Pipeline outputs use normalized coordinates: `x` is a fraction of the
/// image width and `y` a fraction of the image height, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (+Y points down, as in the source image).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Center of the unit square, used as the fallback start marker.
    pub const CENTER: Self = Self::new(0.5, 0.5);

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Clamp both coordinates into `[0, 1]`.
    #[must_use]
    pub fn clamp_unit(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The longer of width and height, as `f64`.
    #[must_use]
    pub fn longer_dim(self) -> f64 {
        f64::from(self.width.max(self.height))
    }

    /// Width divided by height.
    ///
    /// Returns 1.0 for a degenerate zero-height image.
    #[must_use]
    pub fn aspect(self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

/// Coarse shape classification by containment depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Top-level silhouette shapes (depth 0).
    Outer,
    /// Holes and major internal structures (depth 1 to 2).
    Inner,
    /// Fine features nested three or more levels deep.
    Detail,
}

impl Tier {
    /// Classify a hierarchy depth.
    #[must_use]
    pub const fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Outer,
            1 | 2 => Self::Inner,
            _ => Self::Detail,
        }
    }

    /// Lowercase label used in records and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Inner => "inner",
            Self::Detail => "detail",
        }
    }
}

/// One extracted closed shape with its measures and ranking score.
///
/// Shapes are created once per extraction run and never mutated.
/// `parent` is a lookup-only back-reference: it holds the
/// [`extraction_index`](Self::extraction_index) of the enclosing shape,
/// which may itself have been discarded as noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedShape {
    /// Position of this shape in the raw containment hierarchy.
    pub extraction_index: usize,
    /// Outline points normalized to `[0, 1]`.
    pub points: Vec<Point>,
    /// Enclosed area as a fraction of the image area.
    pub area: f64,
    /// Closed perimeter as a fraction of the longer image side.
    pub perimeter: f64,
    /// Number of enclosing shapes (0 = outermost).
    pub depth: usize,
    /// Extraction index of the immediate parent, if any.
    pub parent: Option<usize>,
    /// Normalized centroid.
    pub centroid: Point,
    /// Tier derived from `depth`.
    pub tier: Tier,
    /// Composite ranking score in `[0, 1]`.
    pub importance: f64,
}

/// Output of [`preprocess`](crate::preprocess::preprocess).
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Decoded image resized to the working resolution.
    pub resized: RgbaImage,
    /// Luminance of `resized`.
    pub grayscale: GrayImage,
    /// Binary edge map (255 = edge) of `grayscale`.
    pub edges: GrayImage,
    /// Working-resolution size shared by all three rasters.
    pub dimensions: Dimensions,
}

/// Configuration for the analysis half of the pipeline.
///
/// Every table (tone bands, phases) is plain data so tests can swap
/// it without touching shared state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Resize and edge-detection parameters.
    pub preprocess: PreprocessConfig,
    /// Shape extraction parameters.
    pub contour: ContourConfig,
    /// Tone-mask banding for the shading step.
    pub tone: ToneConfig,
    /// Region banding for the blueprint shading layer.
    pub shading: ShadingConfig,
    /// Phase table and shading toggle.
    pub planner: PlannerConfig,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
