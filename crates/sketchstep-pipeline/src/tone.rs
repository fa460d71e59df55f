//! Tone-band segmentation for the shading step.
//!
//! The grayscale image is smoothed, then every band in the configured
//! table overwrites the mask pixels whose smoothed intensity lies in its
//! inclusive range. Bands are applied in table order, so where ranges
//! overlap the later (lighter) band wins. Pixels matched by no band keep
//! the fallback value.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// One intensity band: pixels with intensity in `low..=high` are tagged
/// with `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneBand {
    /// Human-readable label (e.g. `deep_shadow`).
    pub label: String,
    /// Inclusive lower intensity bound.
    pub low: u8,
    /// Inclusive upper intensity bound.
    pub high: u8,
    /// Value written into the mask.
    pub value: u8,
}

impl ToneBand {
    /// Create a band.
    #[must_use]
    pub fn new(label: impl Into<String>, low: u8, high: u8, value: u8) -> Self {
        Self {
            label: label.into(),
            low,
            high,
            value,
        }
    }

    /// Whether `intensity` falls inside this band.
    #[must_use]
    pub const fn contains(&self, intensity: u8) -> bool {
        self.low <= intensity && intensity <= self.high
    }
}

/// Mask value for the darkest band.
pub const DEEP_SHADOW: u8 = 0;
/// Mask value for the middle band.
pub const MID_TONE: u8 = 1;
/// Mask value for the lightest band.
pub const HIGHLIGHT: u8 = 2;

/// Parameters for [`generate_tone_mask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Bands in increasing-intensity order.
    pub bands: Vec<ToneBand>,
    /// Value for pixels no band claims.
    pub fallback_value: u8,
    /// Side of the square smoothing kernel (odd, pixels).
    pub blur_kernel: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                ToneBand::new("deep_shadow", 0, 80, DEEP_SHADOW),
                ToneBand::new("mid_tone", 81, 180, MID_TONE),
                ToneBand::new("highlight", 181, 255, HIGHLIGHT),
            ],
            fallback_value: HIGHLIGHT,
            blur_kernel: 7,
        }
    }
}

/// Dense per-pixel tone-band map, the same size as its grayscale source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneMask(GrayImage);

impl ToneMask {
    /// Wrap an existing band-value raster.
    #[must_use]
    pub const fn from_raw(mask: GrayImage) -> Self {
        Self(mask)
    }

    /// Band value at `(x, y)`, or `None` outside the mask.
    #[must_use]
    pub fn value_at(&self, x: u32, y: u32) -> Option<u8> {
        self.0.get_pixel_checked(x, y).map(|pixel| pixel.0[0])
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// The underlying raster of band values.
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

/// Share of the image covered by one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandShare {
    /// Band label.
    pub label: String,
    /// Percentage of all pixels, rounded to one decimal.
    pub percent: f64,
}

/// Per-band coverage of a [`ToneMask`], in band-table order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToneSummary(pub Vec<BandShare>);

impl ToneSummary {
    /// Percentage recorded for `label`, if that band exists.
    #[must_use]
    pub fn percent_of(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|s| s.label == label).map(|s| s.percent)
    }

    /// Sum of all band percentages.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|s| s.percent).sum()
    }
}

/// Segment a grayscale image into tone bands.
#[must_use]
pub fn generate_tone_mask(grayscale: &GrayImage, config: &ToneConfig) -> ToneMask {
    let sigma = crate::blur::sigma_for_kernel(config.blur_kernel);
    let smoothed = crate::blur::gaussian_blur(grayscale, sigma);

    let mask = GrayImage::from_fn(smoothed.width(), smoothed.height(), |x, y| {
        let intensity = smoothed.get_pixel(x, y).0[0];
        let value = config
            .bands
            .iter()
            .rev()
            .find(|band| band.contains(intensity))
            .map_or(config.fallback_value, |band| band.value);
        image::Luma([value])
    });

    ToneMask(mask)
}

/// Percentage of pixels assigned to each band.
///
/// An empty mask reports 0% for every band.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tone_summary(mask: &ToneMask, bands: &[ToneBand]) -> ToneSummary {
    let total = u64::from(mask.width()) * u64::from(mask.height());
    let mut counts = [0u64; 256];
    for pixel in mask.0.pixels() {
        counts[usize::from(pixel.0[0])] += 1;
    }

    let shares = bands
        .iter()
        .map(|band| {
            let percent = if total == 0 {
                0.0
            } else {
                round_to(counts[usize::from(band.value)] as f64 / total as f64 * 100.0, 1)
            };
            BandShare {
                label: band.label.clone(),
                percent,
            }
        })
        .collect();

    ToneSummary(shares)
}

/// Round to `places` decimal places.
#[must_use]
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
