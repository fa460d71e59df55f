//! Blueprint analysis of a single figure drawing or photo.

use serde::{Deserialize, Serialize};
use sketchstep_pipeline::complexity::{edge_variance, score_complexity};
use sketchstep_pipeline::grid::{generate_grid, grid_density};
use sketchstep_pipeline::preprocess::preprocess;
use sketchstep_pipeline::proportion::generate_blueprint;
use sketchstep_pipeline::shading::map_shading;
use sketchstep_pipeline::{Blueprint, LandmarkDetector};

use crate::config::GuideConfig;
use crate::error::SessionError;
use crate::feedback::{DrawingFeedback, FeedbackGenerator, FeedbackInputs, request_feedback};

/// A blueprint plus optional instructor feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintReport {
    /// Layered structural description of the figure.
    pub blueprint: Blueprint,
    /// Narrative feedback, when a generator was supplied and answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<DrawingFeedback>,
}

impl BlueprintReport {
    /// Figures passed to a feedback generator.
    #[must_use]
    pub fn feedback_inputs(&self) -> FeedbackInputs {
        FeedbackInputs {
            complexity_score: self.blueprint.complexity_score,
            proportion_accuracy: self.blueprint.proportion_accuracy,
            landmark_count: self.blueprint.landmarks.len(),
            shading_region_count: self.blueprint.shading_regions.len(),
        }
    }
}

/// Run the blueprint analysis on `image_bytes`.
///
/// Landmarks come from `detector`, run on the working-resolution image.
/// The grid follows the configured difficulty, shading regions come from
/// the grayscale image, and complexity combines the landmark count, grid
/// density, and edge-map variance. When `feedback` is given its answer
/// is attached; a failed answer leaves `feedback` empty.
///
/// # Errors
///
/// Returns [`SessionError::Pipeline`] if the configuration is invalid or
/// the image cannot be decoded.
pub fn analyze_drawing(
    image_bytes: &[u8],
    config: &GuideConfig,
    detector: &dyn LandmarkDetector,
    feedback: Option<&dyn FeedbackGenerator>,
) -> Result<BlueprintReport, SessionError> {
    config.validate()?;
    let pre = preprocess(image_bytes, &config.pipeline.preprocess)?;

    let landmarks = detector.detect(&pre.resized);
    let grid = generate_grid(&landmarks, config.difficulty);
    let shading_regions = map_shading(&pre.grayscale, &config.pipeline.shading);
    let complexity = score_complexity(
        landmarks.len(),
        grid_density(&grid),
        edge_variance(&pre.edges),
        &config.complexity,
    );

    let blueprint = generate_blueprint(
        &landmarks,
        &grid,
        &shading_regions,
        complexity,
        config.difficulty,
        &config.proportion,
    );
    tracing::info!(
        landmarks = landmarks.len(),
        regions = shading_regions.len(),
        complexity = blueprint.complexity_score,
        accuracy = blueprint.proportion_accuracy,
        "analyzed drawing"
    );

    let mut report = BlueprintReport {
        blueprint,
        feedback: None,
    };
    if let Some(generator) = feedback {
        report.feedback = request_feedback(generator, &report.feedback_inputs());
    }
    Ok(report)
}
