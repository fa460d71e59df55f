//! End-to-end guide generation: analysis, then one image per step.

use std::path::{Path, PathBuf};

use sketchstep_pipeline::planner::start_point;
use sketchstep_pipeline::types::RgbaImage;
use sketchstep_pipeline::{AnalyzedShape, StepPlan, plan_guide};
use sketchstep_render::{RenderError, Shading, StepScene, render_step, save_png};

use crate::config::GuideConfig;
use crate::error::SessionError;
use crate::records::{SessionRecord, StepRecord, step_file_name};

/// Length of a session identifier in hex characters.
pub const SESSION_ID_LEN: usize = 12;

/// A fresh random session identifier.
#[must_use]
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SESSION_ID_LEN)
        .collect()
}

/// Whether `session_id` names a single directory directly under the root.
///
/// Only ASCII letters, digits, `-` and `_` are accepted.
#[must_use]
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Generate a guide into a new session directory under `output_root`.
///
/// # Errors
///
/// See [`generate_session`].
pub fn generate_drawing_steps(
    image_bytes: &[u8],
    config: &GuideConfig,
    output_root: &Path,
) -> Result<SessionRecord, SessionError> {
    generate_session(image_bytes, config, output_root, &new_session_id())
}

/// Generate a guide into `<output_root>/<session_id>/`.
///
/// Step images are written in order as `step_NN.png`. Each step is drawn
/// over every shape introduced by the steps before it. Nothing is written
/// until analysis succeeds, and a failed write removes the session
/// directory so no partial session is left behind. The directory must not
/// exist beforehand; only a directory created by this call is removed.
///
/// # Errors
///
/// Returns [`SessionError::InvalidSessionId`] if `session_id` is not a
/// plain directory name, [`SessionError::Pipeline`] if the configuration
/// is invalid or the image cannot be decoded, [`SessionError::SessionExists`]
/// if the session directory is already present, [`SessionError::Io`] if it
/// cannot be created, or [`SessionError::Render`] if a step cannot be
/// rendered or saved.
pub fn generate_session(
    image_bytes: &[u8],
    config: &GuideConfig,
    output_root: &Path,
    session_id: &str,
) -> Result<SessionRecord, SessionError> {
    if !is_valid_session_id(session_id) {
        return Err(SessionError::InvalidSessionId(session_id.to_string()));
    }
    config.validate()?;
    let plan = plan_guide(image_bytes, &config.pipeline)?;

    write_session(&plan, config, output_root, session_id, &mut save_png)
}

/// Sink for finished step images.
type StepWriter<'a> = dyn FnMut(&RgbaImage, &Path) -> Result<(), RenderError> + 'a;

/// Create the session directory, render every step into it, and remove
/// it again if any step fails.
fn write_session(
    plan: &StepPlan,
    config: &GuideConfig,
    output_root: &Path,
    session_id: &str,
    save: &mut StepWriter<'_>,
) -> Result<SessionRecord, SessionError> {
    std::fs::create_dir_all(output_root).map_err(|e| SessionError::io(output_root, e))?;
    let session_dir = output_root.join(session_id);
    match std::fs::create_dir(&session_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(SessionError::SessionExists(session_id.to_string()));
        }
        Err(e) => return Err(SessionError::io(&session_dir, e)),
    }

    match render_session(plan, config, &session_dir, session_id, save) {
        Ok(steps) => {
            let dimensions = plan.preprocessed.dimensions;
            tracing::info!(
                session_id,
                steps = steps.len(),
                shapes = plan.shapes.len(),
                "generated drawing guide"
            );
            Ok(SessionRecord {
                session_id: session_id.to_string(),
                total_steps: steps.len(),
                image_width: dimensions.width,
                image_height: dimensions.height,
                paper_size: config.canvas.paper_size,
                grid_divisions: config.canvas.grid_divisions,
                tone_distribution: plan.tone_summary.clone(),
                steps,
            })
        }
        Err(err) => {
            tracing::error!(
                session_id,
                error = %err,
                "step rendering failed, discarding session"
            );
            discard(&session_dir);
            Err(err)
        }
    }
}

fn render_session(
    plan: &StepPlan,
    config: &GuideConfig,
    session_dir: &Path,
    session_id: &str,
    save: &mut StepWriter<'_>,
) -> Result<Vec<StepRecord>, SessionError> {
    let image_aspect = plan.preprocessed.dimensions.aspect();
    let start = start_point(&plan.shapes);
    let bands = &config.pipeline.tone.bands;
    let mut drawn: Vec<AnalyzedShape> = Vec::with_capacity(plan.shapes.len());
    let mut records = Vec::with_capacity(plan.steps.len());

    for step in &plan.steps {
        let file_name = step_file_name(step.step_number);
        let path: PathBuf = session_dir.join(&file_name);

        let scene = StepScene {
            step_number: step.step_number,
            phase_name: &step.phase_name,
            description: &step.description,
            previous_shapes: &drawn,
            new_shapes: &step.shapes,
            image_aspect,
            start_centroid: Some(start),
            shading: step
                .is_shading_step
                .then(|| Shading::for_bands(&plan.tone_mask, bands)),
        };
        let canvas = render_step(&scene, &config.canvas, None)?;
        save(&canvas, &path)?;

        drawn.extend(step.shapes.iter().cloned());
        records.push(StepRecord {
            step_number: step.step_number,
            phase_name: step.phase_name.clone(),
            description: step.description.clone(),
            image_reference: format!("{session_id}/{file_name}"),
            new_shape_count: step.shapes.len(),
            cumulative_shape_count: drawn.len(),
            is_shading_step: step.is_shading_step,
        });
    }

    Ok(records)
}

fn discard(session_dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(session_dir) {
        tracing::error!(
            path = %session_dir.display(),
            error = %e,
            "failed to remove partial session directory"
        );
    }
}
