//! Weighted drawing-complexity score in `[0, 100]`.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::tone::round_to;

/// Feature weights and saturation points for [`score_complexity`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    /// Weight of the landmark-count term.
    pub landmarks: f64,
    /// Weight of the grid-density term.
    pub grid_density: f64,
    /// Weight of the edge-variance term.
    pub edge_variance: f64,
    /// Landmark count at which the first term saturates.
    pub max_landmarks: f64,
    /// Grid density (percent) at which the second term saturates.
    pub max_grid_density: f64,
    /// Edge variance at which the third term saturates.
    pub max_edge_variance: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            landmarks: 0.35,
            grid_density: 0.25,
            edge_variance: 0.40,
            max_landmarks: 33.0,
            max_grid_density: 100.0,
            max_edge_variance: 5000.0,
        }
    }
}

/// Population variance of edge-map intensities.
///
/// Busier edge maps have more pixels at 255 and therefore more variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn edge_variance(edge_map: &GrayImage) -> f64 {
    let n = edge_map.pixels().len();
    if n == 0 {
        return 0.0;
    }
    let (sum, sum_sq) = edge_map.pixels().fold((0.0_f64, 0.0_f64), |(s, sq), p| {
        let v = f64::from(p.0[0]);
        (s + v, v.mul_add(v, sq))
    });
    let mean = sum / n as f64;
    mean.mul_add(-mean, sum_sq / n as f64).max(0.0)
}

/// Combine the three features into a score rounded to 2 decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_complexity(
    landmark_count: usize,
    grid_density: f64,
    edge_variance: f64,
    weights: &ComplexityWeights,
) -> f64 {
    let saturate = |value: f64, max: f64| {
        if max <= 0.0 {
            1.0
        } else {
            (value / max).min(1.0)
        }
    };
    let raw = weights.edge_variance.mul_add(
        saturate(edge_variance, weights.max_edge_variance),
        weights.landmarks.mul_add(
            saturate(landmark_count as f64, weights.max_landmarks),
            weights.grid_density * saturate(grid_density, weights.max_grid_density),
        ),
    ) * 100.0;
    round_to(raw.clamp(0.0, 100.0), 2)
}
