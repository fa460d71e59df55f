//! Proportion scoring against a reference figure, and blueprint assembly.
//!
//! [`score_proportions`] measures a fixed set of landmark pairs and
//! compares each distance with its ideal length from a [`ProportionModel`].
//! [`generate_blueprint`] wraps landmarks, grid, shading regions, and a
//! wireframe into four self-contained layers.

use serde::{Deserialize, Serialize};

use crate::grid::{Difficulty, GridCell};
use crate::landmarks::{Landmark, find};
use crate::shading::ToneRegion;
use crate::tone::round_to;

/// Accuracy reported when no landmark pair can be measured.
pub const NEUTRAL_ACCURACY: f64 = 50.0;

/// One measured segment and its ideal normalized length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionRule {
    /// Segment name (e.g. `shoulder_width`).
    pub name: String,
    /// First landmark.
    pub from: String,
    /// Second landmark.
    pub to: String,
    /// Ideal distance in normalized image units.
    pub ideal: f64,
}

impl ProportionRule {
    fn new(name: &str, from: &str, to: &str, ideal: f64) -> Self {
        Self {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            ideal,
        }
    }
}

/// Reference table of segment lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProportionModel {
    /// Segments to measure, in reporting order.
    pub rules: Vec<ProportionRule>,
}

impl Default for ProportionModel {
    /// The classical eight-head standing figure.
    fn default() -> Self {
        Self {
            rules: vec![
                ProportionRule::new("shoulder_width", "left_shoulder", "right_shoulder", 0.30),
                ProportionRule::new("torso_length", "left_shoulder", "left_hip", 0.32),
                ProportionRule::new("upper_arm", "left_shoulder", "left_elbow", 0.17),
                ProportionRule::new("forearm", "left_elbow", "left_wrist", 0.17),
                ProportionRule::new("thigh", "left_hip", "left_knee", 0.20),
                ProportionRule::new("shin", "left_knee", "left_ankle", 0.20),
                ProportionRule::new("head_to_shoulder", "nose", "left_shoulder", 0.12),
            ],
        }
    }
}

/// Landmark pairs joined into the wireframe outline.
pub const WIREFRAME: [(&str, &str); 14] = [
    ("left_shoulder", "right_shoulder"),
    ("left_shoulder", "left_elbow"),
    ("left_elbow", "left_wrist"),
    ("right_shoulder", "right_elbow"),
    ("right_elbow", "right_wrist"),
    ("left_shoulder", "left_hip"),
    ("right_shoulder", "right_hip"),
    ("left_hip", "right_hip"),
    ("left_hip", "left_knee"),
    ("left_knee", "left_ankle"),
    ("right_hip", "right_knee"),
    ("right_knee", "right_ankle"),
    ("nose", "left_shoulder"),
    ("nose", "right_shoulder"),
];

/// Accuracy percentage of `landmarks` against `model`.
///
/// Each measurable rule contributes a relative error clamped to `[0, 1]`.
/// Rules with a missing endpoint are skipped. The result is
/// `(1 - mean error) * 100` rounded to 2 decimals, or
/// [`NEUTRAL_ACCURACY`] when no rule could be measured.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_proportions(landmarks: &[Landmark], model: &ProportionModel) -> f64 {
    let errors: Vec<f64> = model
        .rules
        .iter()
        .filter_map(|rule| {
            let a = find(landmarks, &rule.from)?;
            let b = find(landmarks, &rule.to)?;
            let measured = a.point().distance(b.point());
            Some(((measured - rule.ideal).abs() / rule.ideal.max(1e-6)).min(1.0))
        })
        .collect();

    if errors.is_empty() {
        tracing::warn!(
            landmarks = landmarks.len(),
            "no measurable landmark pairs, using neutral accuracy"
        );
        return NEUTRAL_ACCURACY;
    }

    let mean = errors.iter().sum::<f64>() / errors.len() as f64;
    round_to(((1.0 - mean) * 100.0).clamp(0.0, 100.0), 2)
}

/// One segment of the wireframe outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
    /// Start landmark name.
    pub from: String,
    /// End landmark name.
    pub to: String,
    /// Start position.
    pub from_xy: (f64, f64),
    /// End position.
    pub to_xy: (f64, f64),
}

/// Content of a blueprint layer, tagged by layer type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer_type", content = "data", rename_all = "lowercase")]
pub enum LayerData {
    /// Raw landmark points.
    Landmark {
        /// Number of points.
        count: usize,
        /// The points themselves.
        points: Vec<Landmark>,
    },
    /// Proportional grid.
    Grid {
        /// Number of cells.
        total_cells: usize,
        /// Cells containing a landmark.
        occupied_cells: usize,
        /// All cells, row-major.
        cells: Vec<GridCell>,
    },
    /// Shading regions.
    Shading {
        /// Number of regions.
        region_count: usize,
        /// The regions.
        regions: Vec<ToneRegion>,
    },
    /// Wireframe outline.
    Outline {
        /// Number of edges drawn.
        edge_count: usize,
        /// Edges whose endpoints were both present.
        edges: Vec<WireEdge>,
    },
}

/// A named blueprint layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintLayer {
    /// Display name.
    pub layer_name: String,
    /// Layer content.
    #[serde(flatten)]
    pub data: LayerData,
}

/// Everything known about a figure's structure, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Complexity score in `[0, 100]`.
    pub complexity_score: f64,
    /// Proportion accuracy in `[0, 100]`.
    pub proportion_accuracy: f64,
    /// Learner level the grid was built for.
    pub difficulty_level: Difficulty,
    /// Input landmarks.
    pub landmarks: Vec<Landmark>,
    /// Input grid.
    pub grid: Vec<GridCell>,
    /// Input shading regions.
    pub shading_regions: Vec<ToneRegion>,
    /// Landmark, grid, shading, and outline layers, in that order.
    pub layers: Vec<BlueprintLayer>,
}

/// Wireframe edges whose endpoints are both present in `landmarks`.
#[must_use]
pub fn wireframe_edges(landmarks: &[Landmark]) -> Vec<WireEdge> {
    WIREFRAME
        .iter()
        .filter_map(|&(from, to)| {
            let a = find(landmarks, from)?;
            let b = find(landmarks, to)?;
            Some(WireEdge {
                from: from.to_string(),
                to: to.to_string(),
                from_xy: (a.x, a.y),
                to_xy: (b.x, b.y),
            })
        })
        .collect()
}

/// Assemble the four-layer blueprint. Inputs are copied, never modified.
#[must_use]
pub fn generate_blueprint(
    landmarks: &[Landmark],
    grid: &[GridCell],
    shading_regions: &[ToneRegion],
    complexity_score: f64,
    difficulty: Difficulty,
    model: &ProportionModel,
) -> Blueprint {
    let proportion_accuracy = score_proportions(landmarks, model);
    let edges = wireframe_edges(landmarks);

    let layers = vec![
        BlueprintLayer {
            layer_name: "Anatomical Landmarks".to_string(),
            data: LayerData::Landmark {
                count: landmarks.len(),
                points: landmarks.to_vec(),
            },
        },
        BlueprintLayer {
            layer_name: "Proportional Grid".to_string(),
            data: LayerData::Grid {
                total_cells: grid.len(),
                occupied_cells: grid.iter().filter(|c| c.contains_landmark).count(),
                cells: grid.to_vec(),
            },
        },
        BlueprintLayer {
            layer_name: "Shading Map".to_string(),
            data: LayerData::Shading {
                region_count: shading_regions.len(),
                regions: shading_regions.to_vec(),
            },
        },
        BlueprintLayer {
            layer_name: "Wireframe Outline".to_string(),
            data: LayerData::Outline {
                edge_count: edges.len(),
                edges,
            },
        },
    ];

    Blueprint {
        complexity_score,
        proportion_accuracy,
        difficulty_level: difficulty,
        landmarks: landmarks.to_vec(),
        grid: grid.to_vec(),
        shading_regions: shading_regions.to_vec(),
        layers,
    }
}
