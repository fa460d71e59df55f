//! Session-wide configuration.

use serde::{Deserialize, Serialize};
use sketchstep_pipeline::complexity::ComplexityWeights;
use sketchstep_pipeline::{Difficulty, PipelineConfig, PipelineError, ProportionModel};
use sketchstep_render::CanvasOptions;

/// Everything one guide-generation or analysis run can be tuned with.
///
/// Deserializes from partial JSON: any omitted field keeps its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Analysis parameters (resize, edges, contours, tones, phases).
    pub pipeline: PipelineConfig,
    /// Paper preset and grid divisions for step images.
    pub canvas: CanvasOptions,
    /// Learner level for the proportional grid.
    pub difficulty: Difficulty,
    /// Reference segment lengths for proportion scoring.
    pub proportion: ProportionModel,
    /// Complexity score weighting.
    pub complexity: ComplexityWeights,
}

impl GuideConfig {
    /// Check ranges the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when the grid divisions
    /// lie outside `[4, 20]` or the working size is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let divisions = self.canvas.grid_divisions;
        if !(CanvasOptions::MIN_GRID_DIVISIONS..=CanvasOptions::MAX_GRID_DIVISIONS)
            .contains(&divisions)
        {
            return Err(PipelineError::InvalidConfig(format!(
                "grid_divisions must be between {} and {}, got {divisions}",
                CanvasOptions::MIN_GRID_DIVISIONS,
                CanvasOptions::MAX_GRID_DIVISIONS,
            )));
        }
        if self.pipeline.preprocess.working_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "working_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
