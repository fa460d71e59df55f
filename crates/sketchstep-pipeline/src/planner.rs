//! Groups ranked shapes into ordered drawing steps.
//!
//! Phases run in table order. Each phase scans the ranked shapes from the
//! top and claims unassigned shapes whose tier it accepts and whose
//! importance meets its threshold, stopping as soon as the batch is full.
//! A phase that claims nothing produces no step. Whatever no phase claimed
//! becomes one trailing "Additional Details" step.
//!
//! The final list always starts with an empty preparation step carrying
//! the start marker, and ends with an empty shading step when requested.
//! Step numbers run contiguously from 0.

use serde::{Deserialize, Serialize};

use crate::types::{AnalyzedShape, Point, Tier};

/// One pedagogical phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Display name (e.g. "Primary Outline").
    pub name: String,
    /// Instruction shown to the learner.
    pub description: String,
    /// Tiers this phase accepts.
    pub tiers: Vec<Tier>,
    /// Minimum importance score (inclusive).
    pub min_importance: f64,
    /// Largest batch this phase may emit.
    pub max_shapes: usize,
}

impl Phase {
    fn new(
        name: &str,
        description: &str,
        tiers: &[Tier],
        min_importance: f64,
        max_shapes: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tiers: tiers.to_vec(),
            min_importance,
            max_shapes,
        }
    }

    fn accepts(&self, shape: &AnalyzedShape) -> bool {
        self.tiers.contains(&shape.tier) && shape.importance >= self.min_importance
    }
}

/// Parameters for [`plan_steps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Phases, in drawing order.
    pub phases: Vec<Phase>,
    /// Append a trailing shading step.
    pub include_shading: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            phases: vec![
                Phase::new(
                    "Primary Outline",
                    "Draw the main outer shape, the overall silhouette",
                    &[Tier::Outer],
                    0.6,
                    3,
                ),
                Phase::new(
                    "Secondary Shapes",
                    "Add large internal structures and secondary outlines",
                    &[Tier::Outer, Tier::Inner],
                    0.4,
                    5,
                ),
                Phase::new(
                    "Internal Details",
                    "Draw inner features and medium-sized details",
                    &[Tier::Inner],
                    0.2,
                    8,
                ),
                Phase::new(
                    "Fine Details",
                    "Add fine lines and smaller shapes",
                    &[Tier::Inner, Tier::Detail],
                    0.1,
                    12,
                ),
                Phase::new(
                    "Texture & Finishing",
                    "Add textures, tiny details, and finishing touches",
                    &[Tier::Detail],
                    0.0,
                    999,
                ),
            ],
            include_shading: true,
        }
    }
}

/// Phase name of the synthetic first step.
pub const PREPARATION: &str = "Preparation";
/// Phase name of the catch-all step for unclaimed shapes.
pub const ADDITIONAL_DETAILS: &str = "Additional Details";
/// Phase name of the shading step.
pub const SHADING: &str = "Shading";

/// One planned step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingStep {
    /// Zero-based, contiguous.
    pub step_number: usize,
    /// Name of the phase that produced this step.
    pub phase_name: String,
    /// Instruction shown to the learner.
    pub description: String,
    /// Shapes introduced in this step, in ranked order.
    pub shapes: Vec<AnalyzedShape>,
    /// Terminal shading step (never carries shapes).
    pub is_shading_step: bool,
    /// Where the learner should start, on the preparation step only.
    pub marker: Option<Point>,
}

impl DrawingStep {
    fn batch(phase_name: &str, description: &str, shapes: Vec<AnalyzedShape>) -> Self {
        Self {
            step_number: 0,
            phase_name: phase_name.to_string(),
            description: description.to_string(),
            shapes,
            is_shading_step: false,
            marker: None,
        }
    }
}

/// Centroid of the top-ranked shape, or the canvas center.
#[must_use]
pub fn start_point(shapes: &[AnalyzedShape]) -> Point {
    shapes.first().map_or(Point::CENTER, |s| s.centroid)
}

/// Claim up to `phase.max_shapes` unassigned shapes for `phase`.
fn claim(phase: &Phase, shapes: &[AnalyzedShape], assigned: &mut [bool]) -> Vec<AnalyzedShape> {
    let mut batch = Vec::new();
    if phase.max_shapes == 0 {
        return batch;
    }
    for (shape, taken) in shapes.iter().zip(assigned.iter_mut()) {
        if *taken || !phase.accepts(shape) {
            continue;
        }
        *taken = true;
        batch.push(shape.clone());
        if batch.len() >= phase.max_shapes {
            break;
        }
    }
    batch
}

/// Group ranked shapes into the ordered list of drawing steps.
///
/// Every input shape lands in exactly one non-shading step, and the
/// result is never empty.
#[must_use]
pub fn plan_steps(shapes: &[AnalyzedShape], config: &PlannerConfig) -> Vec<DrawingStep> {
    let mut assigned = vec![false; shapes.len()];

    let mut steps = vec![DrawingStep {
        marker: Some(start_point(shapes)),
        ..DrawingStep::batch(
            PREPARATION,
            "Your blank grid: start drawing at the marked point",
            Vec::new(),
        )
    }];

    for phase in &config.phases {
        let batch = claim(phase, shapes, &mut assigned);
        if batch.is_empty() {
            continue;
        }
        tracing::debug!(phase = %phase.name, shapes = batch.len(), "planned phase");
        steps.push(DrawingStep::batch(&phase.name, &phase.description, batch));
    }

    let remaining: Vec<AnalyzedShape> = shapes
        .iter()
        .zip(&assigned)
        .filter(|(_, taken)| !**taken)
        .map(|(shape, _)| shape.clone())
        .collect();
    if !remaining.is_empty() {
        steps.push(DrawingStep::batch(
            ADDITIONAL_DETAILS,
            "Complete any remaining small details",
            remaining,
        ));
    }

    if config.include_shading {
        steps.push(DrawingStep {
            is_shading_step: true,
            ..DrawingStep::batch(
                SHADING,
                "Add shading, fill in shadow and mid-tone regions",
                Vec::new(),
            )
        });
    }

    for (number, step) in steps.iter_mut().enumerate() {
        step.step_number = number;
    }

    tracing::info!(shapes = shapes.len(), steps = steps.len(), "planned drawing steps");
    steps
}

/// Number of shapes across all non-shading steps.
#[must_use]
pub fn total_shape_count(steps: &[DrawingStep]) -> usize {
    steps
        .iter()
        .filter(|s| !s.is_shading_step)
        .map(|s| s.shapes.len())
        .sum()
}
