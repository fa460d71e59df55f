#![allow(clippy::unwrap_used)]

use image::{GenericImageView, Rgba, RgbaImage};
use sketchstep_pipeline::proportion::LayerData;
use sketchstep_pipeline::{Difficulty, FixedLandmarks, Landmark, ProportionalFallback};
use sketchstep_render::PaperSize;
use sketchstep_session::{
    GuideConfig, JsonFileStore, PlaceholderFeedback, RecordStore, SessionError, analyze_drawing,
    generate_drawing_steps, generate_session,
};

fn encode_png(img: &RgbaImage) -> Vec<u8> {
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

fn dark_square() -> Vec<u8> {
    let img = RgbaImage::from_fn(64, 64, |x, y| {
        if (16..48).contains(&x) && (16..48).contains(&y) {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    encode_png(&img)
}

fn blank() -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(64, 48, Rgba([255, 255, 255, 255])))
}

fn small_config() -> GuideConfig {
    let mut config = GuideConfig::default();
    config.pipeline.preprocess.working_size = 128;
    config.canvas.paper_size = PaperSize::Square;
    config
}

#[test]
fn dark_square_session_writes_every_step() {
    let root = tempfile::tempdir().unwrap();
    let record =
        generate_session(&dark_square(), &small_config(), root.path(), "sq0000000001").unwrap();

    assert_eq!(record.session_id, "sq0000000001");
    assert_eq!(record.total_steps, record.steps.len());
    assert!(record.total_steps >= 3);
    assert_eq!(record.steps[0].phase_name, "Preparation");
    assert_eq!(record.steps[1].phase_name, "Primary Outline");
    let last = record.steps.last().unwrap();
    assert_eq!(last.phase_name, "Shading");
    assert!(last.is_shading_step);

    for (i, step) in record.steps.iter().enumerate() {
        assert_eq!(step.step_number, i);
        let file = format!("step_{i:02}.png");
        assert_eq!(step.image_reference, format!("sq0000000001/{file}"));
        let path = root.path().join("sq0000000001").join(&file);
        let img = image::open(&path).unwrap();
        assert_eq!(img.dimensions(), PaperSize::Square.pixels());
    }
}

#[test]
fn cumulative_counts_accumulate() {
    let root = tempfile::tempdir().unwrap();
    let record =
        generate_session(&dark_square(), &small_config(), root.path(), "cumulative01").unwrap();

    let mut total = 0;
    for step in &record.steps {
        total += step.new_shape_count;
        assert_eq!(step.cumulative_shape_count, total);
    }
    assert_eq!(record.steps[0].new_shape_count, 0);
    assert!(record.steps[1].new_shape_count > 0);
    assert_eq!(record.steps.last().unwrap().new_shape_count, 0);
}

#[test]
fn blank_image_yields_preparation_and_shading() {
    let root = tempfile::tempdir().unwrap();
    let record = generate_session(&blank(), &small_config(), root.path(), "blank0000001").unwrap();

    assert_eq!(record.total_steps, 2);
    assert_eq!(record.steps[0].phase_name, "Preparation");
    assert!(record.steps[1].is_shading_step);
    assert_eq!((record.image_width, record.image_height), (128, 96));
    assert!(root.path().join("blank0000001/step_01.png").is_file());
}

#[test]
fn disabling_shading_drops_the_shading_step() {
    let root = tempfile::tempdir().unwrap();
    let mut config = small_config();
    config.pipeline.planner.include_shading = false;
    let record = generate_session(&blank(), &config, root.path(), "noshade00001").unwrap();
    assert_eq!(record.total_steps, 1);
    assert!(!record.steps[0].is_shading_step);
}

#[test]
fn generated_sessions_get_fresh_ids() {
    let root = tempfile::tempdir().unwrap();
    let a = generate_drawing_steps(&blank(), &small_config(), root.path()).unwrap();
    let b = generate_drawing_steps(&blank(), &small_config(), root.path()).unwrap();
    assert_ne!(a.session_id, b.session_id);
    assert!(root.path().join(&a.session_id).is_dir());
    assert!(root.path().join(&b.session_id).is_dir());
}

#[test]
fn empty_upload_is_a_pipeline_error() {
    let root = tempfile::tempdir().unwrap();
    let err = generate_session(&[], &small_config(), root.path(), "empty0000001").unwrap_err();
    assert!(matches!(err, SessionError::Pipeline(_)));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn reused_session_id_keeps_the_earlier_session() {
    let root = tempfile::tempdir().unwrap();
    let kept = generate_session(&dark_square(), &small_config(), root.path(), "reused01").unwrap();
    let step_path = root.path().join("reused01/step_00.png");
    let before = std::fs::read(&step_path).unwrap();

    let err = generate_session(&blank(), &small_config(), root.path(), "reused01").unwrap_err();
    assert!(matches!(err, SessionError::SessionExists(_)));
    assert_eq!(std::fs::read(&step_path).unwrap(), before);
    let files = std::fs::read_dir(root.path().join("reused01")).unwrap().count();
    assert_eq!(files, kept.total_steps);
}

#[test]
fn empty_session_id_never_touches_the_output_root() {
    let root = tempfile::tempdir().unwrap();
    let older = generate_session(&blank(), &small_config(), root.path(), "older0000001").unwrap();
    // A directory where the first step image would land if the root were used.
    std::fs::create_dir(root.path().join("step_00.png")).unwrap();

    let err = generate_session(&dark_square(), &small_config(), root.path(), "").unwrap_err();
    assert!(matches!(err, SessionError::InvalidSessionId(_)));
    assert!(root.path().join("older0000001/step_00.png").is_file());
    assert_eq!(older.total_steps, 2);
    assert!(root.path().join("step_00.png").is_dir());
}

#[test]
fn session_record_is_stored_beside_the_steps() {
    let root = tempfile::tempdir().unwrap();
    let record =
        generate_session(&dark_square(), &small_config(), root.path(), "stored000001").unwrap();

    let store = JsonFileStore::new(root.path());
    store.save("upload-42", &record).unwrap();
    let loaded = store.load("stored000001").unwrap().unwrap();
    assert_eq!(loaded.image_id, "upload-42");
    assert_eq!(loaded.session, record);
}

#[test]
fn analysis_with_fallback_landmarks() {
    let report =
        analyze_drawing(&dark_square(), &small_config(), &ProportionalFallback, None).unwrap();
    let bp = &report.blueprint;

    assert_eq!(bp.landmarks.len(), 23);
    assert_eq!(bp.layers.len(), 4);
    assert_eq!(bp.difficulty_level, Difficulty::Intermediate);
    assert_eq!(bp.grid.len(), 64);
    assert!((0.0..=100.0).contains(&bp.complexity_score));
    assert!((0.0..=100.0).contains(&bp.proportion_accuracy));
    assert!(matches!(bp.layers[3].data, LayerData::Outline { edge_count: 14, .. }));
    assert!(report.feedback.is_none());
}

#[test]
fn analysis_attaches_feedback() {
    let report = analyze_drawing(
        &dark_square(),
        &small_config(),
        &ProportionalFallback,
        Some(&PlaceholderFeedback),
    )
    .unwrap();
    let feedback = report.feedback.unwrap();
    assert_eq!(feedback.strengths.len(), 3);
}

#[test]
fn analysis_without_landmarks_is_neutral() {
    let mut config = small_config();
    config.difficulty = Difficulty::Beginner;
    let report = analyze_drawing(&blank(), &config, &FixedLandmarks(Vec::new()), None).unwrap();
    let bp = &report.blueprint;

    assert!(bp.landmarks.is_empty());
    assert_eq!(bp.grid.len(), 16);
    assert!(bp.grid.iter().all(|cell| !cell.contains_landmark));
    assert!((bp.proportion_accuracy - 50.0).abs() < f64::EPSILON);
}

#[test]
fn analysis_uses_supplied_landmarks() {
    let detector = FixedLandmarks(vec![
        Landmark::new("left_shoulder", 0.4, 0.3),
        Landmark::new("right_shoulder", 0.6, 0.3),
    ]);
    let report = analyze_drawing(&blank(), &small_config(), &detector, None).unwrap();
    assert_eq!(report.blueprint.landmarks.len(), 2);
    assert!(matches!(
        report.blueprint.layers[3].data,
        LayerData::Outline { edge_count: 1, .. }
    ));
}
