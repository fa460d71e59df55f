//! Serializable metadata for a generated guide.

use serde::{Deserialize, Serialize};
use sketchstep_pipeline::ToneSummary;
use sketchstep_render::PaperSize;

/// Metadata for one rendered step image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Zero-based step number.
    pub step_number: usize,
    /// Phase that produced the step.
    pub phase_name: String,
    /// Instruction shown to the learner.
    pub description: String,
    /// `<session_id>/<file name>`, relative to the output root.
    pub image_reference: String,
    /// Shapes introduced in this step.
    pub new_shape_count: usize,
    /// Shapes drawn so far, including this step's.
    pub cumulative_shape_count: usize,
    /// Whether this is the shading step.
    pub is_shading_step: bool,
}

/// Metadata for a whole generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Twelve lowercase hex characters.
    pub session_id: String,
    /// Number of entries in `steps`.
    pub total_steps: usize,
    /// Working-resolution width.
    pub image_width: u32,
    /// Working-resolution height.
    pub image_height: u32,
    /// Paper preset the steps were drawn on.
    pub paper_size: PaperSize,
    /// Grid cells per side on the step images.
    pub grid_divisions: u32,
    /// Percentage of the image per tone band.
    pub tone_distribution: ToneSummary,
    /// Per-step metadata, in step order.
    pub steps: Vec<StepRecord>,
}

/// File name of the image for step `step_number`.
#[must_use]
pub fn step_file_name(step_number: usize) -> String {
    format!("step_{step_number:02}.png")
}
