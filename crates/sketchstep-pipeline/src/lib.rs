//! sketchstep-pipeline: Pure image-structure analysis (sans-IO).
//!
//! Turns a photograph into the data behind a step-by-step drawing guide:
//! decode -> resize -> grayscale -> blur -> edge detection ->
//! contour hierarchy -> importance ranking -> phase planning, plus tone
//! segmentation, shading regions, proportion scoring, and blueprint
//! assembly.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory byte
//! slices and rasters and returns structured data. Rendering lives in
//! `sketchstep-render`, and session directories in `sketchstep-session`.

pub mod blur;
pub mod complexity;
pub mod contour;
pub mod edge;
pub mod grid;
pub mod landmarks;
pub mod planner;
pub mod preprocess;
pub mod proportion;
pub mod shading;
pub mod tone;
pub mod types;

pub use grid::Difficulty;
pub use landmarks::{FixedLandmarks, Landmark, LandmarkDetector, ProportionalFallback};
pub use planner::{DrawingStep, PlannerConfig};
pub use proportion::{Blueprint, ProportionModel};
pub use tone::{ToneMask, ToneSummary};
pub use types::{
    AnalyzedShape, Dimensions, PipelineConfig, PipelineError, Point, Preprocessed, Tier,
};

/// Everything the renderer needs to draw a guide, computed in one pass.
#[derive(Debug, Clone)]
pub struct StepPlan {
    /// Working-resolution rasters.
    pub preprocessed: Preprocessed,
    /// Ranked shapes, most important first.
    pub shapes: Vec<AnalyzedShape>,
    /// Planned steps, numbered from 0.
    pub steps: Vec<DrawingStep>,
    /// Tone bands of the grayscale image, for the shading step.
    pub tone_mask: ToneMask,
    /// Percentage of the image in each tone band.
    pub tone_summary: ToneSummary,
}

/// Run the analysis half of guide generation.
///
/// # Pipeline steps
///
/// 1. Decode, resize to the working size, grayscale, blur, Canny
/// 2. Close gaps, extract the shape hierarchy, rank by importance
/// 3. Group shapes into phase steps
/// 4. Segment tone bands and summarize them
///
/// Zero extracted shapes is not an error: the plan still holds the
/// preparation step (and the shading step when enabled).
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image cannot be decoded.
pub fn plan_guide(image_bytes: &[u8], config: &PipelineConfig) -> Result<StepPlan, PipelineError> {
    let preprocessed = preprocess::preprocess(image_bytes, &config.preprocess)?;
    let shapes = contour::analyze(&preprocessed.edges, &config.contour);
    let steps = planner::plan_steps(&shapes, &config.planner);
    let tone_mask = tone::generate_tone_mask(&preprocessed.grayscale, &config.tone);
    let tone_summary = tone::tone_summary(&tone_mask, &config.tone.bands);

    Ok(StepPlan {
        preprocessed,
        shapes,
        steps,
        tone_mask,
        tone_summary,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn small_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.preprocess.working_size = 128;
        config
    }

    #[test]
    fn empty_bytes_fail() {
        assert!(matches!(
            plan_guide(&[], &small_config()),
            Err(PipelineError::EmptyInput)
        ));
    }

    #[test]
    fn blank_image_plans_preparation_and_shading() {
        let img = image::RgbaImage::from_pixel(64, 48, image::Rgba([255, 255, 255, 255]));
        let plan = plan_guide(&encode_png(&img), &small_config()).unwrap();
        assert!(plan.shapes.is_empty());
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps[1].is_shading_step);
        assert_eq!(plan.preprocessed.dimensions, Dimensions { width: 128, height: 96 });
        assert!((plan.tone_summary.percent_of("highlight").unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dark_square_is_planned_as_an_outline() {
        let img = image::RgbaImage::from_fn(64, 64, |x, y| {
            if (16..48).contains(&x) && (16..48).contains(&y) {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let plan = plan_guide(&encode_png(&img), &small_config()).unwrap();
        assert!(!plan.shapes.is_empty());
        assert_eq!(plan.shapes[0].tier, Tier::Outer);
        assert_eq!(plan.steps[1].phase_name, "Primary Outline");
        assert_eq!(planner::total_shape_count(&plan.steps), plan.shapes.len());
    }
}
