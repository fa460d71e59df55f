//! Connected shading regions per tone band.
//!
//! Unlike the tone mask, each band here is thresholded independently on
//! the raw grayscale image, split into 8-connected components, and every
//! component above the noise floor is reported with its bounding box.
//! Region ids are dense across all bands, in band order.

use image::GrayImage;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use crate::tone::{ToneBand, round_to};

/// Parameters for [`map_shading`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    /// Bands to extract regions for. `ToneBand::value` is unused here.
    pub bands: Vec<ToneBand>,
    /// Components covering less than this fraction of the image are noise.
    pub noise_fraction: f64,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                ToneBand::new("deep_shadow", 0, 63, crate::tone::DEEP_SHADOW),
                ToneBand::new("mid_tone", 64, 191, crate::tone::MID_TONE),
                ToneBand::new("highlight", 192, 255, crate::tone::HIGHLIGHT),
            ],
            noise_fraction: 0.001,
        }
    }
}

/// Axis-aligned box in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x_min: f64,
    /// Top edge.
    pub y_min: f64,
    /// Right edge (exclusive pixel bound, normalized).
    pub x_max: f64,
    /// Bottom edge (exclusive pixel bound, normalized).
    pub y_max: f64,
}

/// One connected component inside a single tone band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneRegion {
    /// Dense id across all bands.
    pub region_id: usize,
    /// Label of the band this region belongs to.
    pub label: String,
    /// Inclusive intensity range of the band.
    pub intensity_range: (u8, u8),
    /// Number of pixels in the component.
    pub pixel_count: u64,
    /// Normalized bounding box.
    pub bounding_box: BoundingBox,
}

#[derive(Clone, Copy)]
struct ComponentStats {
    count: u64,
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

/// Extract labeled shading regions for every band in `config`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_shading(grayscale: &GrayImage, config: &ShadingConfig) -> Vec<ToneRegion> {
    let (width, height) = grayscale.dimensions();
    let total = u64::from(width) * u64::from(height);
    if total == 0 {
        return Vec::new();
    }
    let noise_floor = total as f64 * config.noise_fraction;

    let mut regions = Vec::new();
    for band in &config.bands {
        let binary = GrayImage::from_fn(width, height, |x, y| {
            if band.contains(grayscale.get_pixel(x, y).0[0]) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        });

        for stats in component_stats(&binary) {
            if (stats.count as f64) < noise_floor {
                continue;
            }
            regions.push(ToneRegion {
                region_id: regions.len(),
                label: band.label.clone(),
                intensity_range: (band.low, band.high),
                pixel_count: stats.count,
                bounding_box: BoundingBox {
                    x_min: round_to(f64::from(stats.x_min) / f64::from(width), 6),
                    y_min: round_to(f64::from(stats.y_min) / f64::from(height), 6),
                    x_max: round_to(f64::from(stats.x_max + 1) / f64::from(width), 6),
                    y_max: round_to(f64::from(stats.y_max + 1) / f64::from(height), 6),
                },
            });
        }
    }

    tracing::info!(regions = regions.len(), "mapped shading regions");
    regions
}

/// Pixel count and extent of every foreground component, in label order.
fn component_stats(binary: &GrayImage) -> Vec<ComponentStats> {
    let labels = connected_components(binary, Connectivity::Eight, image::Luma([0u8]));

    let mut stats: Vec<Option<ComponentStats>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let Ok(label) = usize::try_from(label.0[0]) else {
            continue;
        };
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, None);
        }
        let slot = &mut stats[label - 1];
        *slot = Some(match *slot {
            None => ComponentStats {
                count: 1,
                x_min: x,
                y_min: y,
                x_max: x,
                y_max: y,
            },
            Some(s) => ComponentStats {
                count: s.count + 1,
                x_min: s.x_min.min(x),
                y_min: s.y_min.min(y),
                x_max: s.x_max.max(x),
                y_max: s.y_max.max(y),
            },
        });
    }

    stats.into_iter().flatten().collect()
}
