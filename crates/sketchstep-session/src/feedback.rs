//! Narrative feedback on an analyzed drawing.
//!
//! Any text generator can sit behind [`FeedbackGenerator`]. The answer is
//! expected to be a JSON object; anything else yields no feedback rather
//! than an error, since feedback never affects the analysis itself.

use serde::{Deserialize, Serialize};

/// Failure of a feedback generator.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// The generator could not produce an answer.
    #[error("feedback generator unavailable: {0}")]
    Unavailable(String),
}

/// Something that turns a prompt into text.
pub trait FeedbackGenerator {
    /// Answer `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError`] when no answer can be produced.
    fn generate(&self, prompt: &str) -> Result<String, FeedbackError>;
}

/// Analysis figures the feedback is based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInputs {
    /// Complexity score in `[0, 100]`.
    pub complexity_score: f64,
    /// Proportion accuracy in `[0, 100]`.
    pub proportion_accuracy: f64,
    /// Number of detected landmarks.
    pub landmark_count: usize,
    /// Number of shading regions.
    pub shading_region_count: usize,
}

/// Structured instructor feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingFeedback {
    /// One-paragraph summary.
    pub overall_assessment: String,
    /// What the drawing does well.
    pub strengths: Vec<String>,
    /// What to work on.
    pub areas_for_improvement: Vec<String>,
    /// Suggested practice.
    pub recommended_exercises: Vec<String>,
}

/// Instructor prompt for `inputs`.
#[must_use]
pub fn feedback_prompt(inputs: &FeedbackInputs) -> String {
    format!(
        "You are an expert art instructor and anatomy specialist.\n\
         Analyse the following drawing analysis results and provide constructive \
         feedback in JSON format with keys: \"overall_assessment\", \"strengths\", \
         \"areas_for_improvement\", \"recommended_exercises\".\n\n\
         Complexity Score : {:?}/100\n\
         Proportion Accuracy : {:?}%\n\
         Detected Landmarks : {}\n\
         Shading Regions : {}\n",
        inputs.complexity_score,
        inputs.proportion_accuracy,
        inputs.landmark_count,
        inputs.shading_region_count,
    )
}

/// Ask `generator` for feedback on `inputs`.
///
/// Returns `None` (and logs) if the generator fails or its answer is not
/// a feedback object.
pub fn request_feedback(
    generator: &dyn FeedbackGenerator,
    inputs: &FeedbackInputs,
) -> Option<DrawingFeedback> {
    let answer = match generator.generate(&feedback_prompt(inputs)) {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %e, "feedback generation failed");
            return None;
        }
    };
    match serde_json::from_str(&answer) {
        Ok(feedback) => Some(feedback),
        Err(e) => {
            tracing::error!(error = %e, "feedback answer is not valid JSON feedback");
            None
        }
    }
}

/// Fixed, generally useful feedback for when no generator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFeedback;

impl PlaceholderFeedback {
    fn feedback() -> DrawingFeedback {
        let lines =
            |items: &[&str]| -> Vec<String> { items.iter().map(ToString::to_string).collect() };
        DrawingFeedback {
            overall_assessment: "Your drawing shows solid foundational structure. \
                The landmark placement and proportions demonstrate an understanding \
                of basic anatomy."
                .to_string(),
            strengths: lines(&[
                "Consistent body proportions detected",
                "Good use of shading depth across the figure",
                "Clean outline structure suitable for blueprint conversion",
            ]),
            areas_for_improvement: lines(&[
                "Work on limb-to-torso ratio for more natural proportions",
                "Add more variation in shading transitions between zones",
                "Pay attention to joint angles at elbows and knees",
            ]),
            recommended_exercises: lines(&[
                "Practice 2-minute gesture drawings to loosen up form",
                "Study the Loomis 8-head proportion model",
                "Do value studies with 3 tones: light, mid, shadow",
            ]),
        }
    }
}

impl FeedbackGenerator for PlaceholderFeedback {
    fn generate(&self, _prompt: &str) -> Result<String, FeedbackError> {
        serde_json::to_string(&Self::feedback())
            .map_err(|e| FeedbackError::Unavailable(e.to_string()))
    }
}
