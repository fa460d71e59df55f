//! Named body landmarks and the detector capability that produces them.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::types::Point;

/// One named landmark in normalized image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Canonical landmark name (e.g. `left_shoulder`).
    pub name: String,
    /// Horizontal position in `[0, 1]`.
    pub x: f64,
    /// Vertical position in `[0, 1]`.
    pub y: f64,
    /// Relative depth, when the detector provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detector confidence that the point is visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    /// A 2-D landmark with no depth or visibility.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// Position as a [`Point`].
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Look up a landmark by name.
#[must_use]
pub fn find<'a>(landmarks: &'a [Landmark], name: &str) -> Option<&'a Landmark> {
    landmarks.iter().find(|l| l.name == name)
}

/// Something that can locate body landmarks in an image.
pub trait LandmarkDetector {
    /// Detect landmarks in `image`. An empty result is valid.
    fn detect(&self, image: &RgbaImage) -> Vec<Landmark>;
}

/// Fixed landmark placement following an eight-head standing figure.
///
/// Ignores the image entirely. Used when no real detector is available
/// and as the deterministic stub in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalFallback;

/// Canonical placement used by [`ProportionalFallback`].
pub const FALLBACK_LANDMARKS: [(&str, f64, f64); 23] = [
    ("nose", 0.50, 0.08),
    ("left_eye_inner", 0.47, 0.06),
    ("left_eye", 0.45, 0.06),
    ("left_eye_outer", 0.43, 0.06),
    ("right_eye_inner", 0.53, 0.06),
    ("right_eye", 0.55, 0.06),
    ("right_eye_outer", 0.57, 0.06),
    ("left_ear", 0.40, 0.07),
    ("right_ear", 0.60, 0.07),
    ("mouth_left", 0.47, 0.10),
    ("mouth_right", 0.53, 0.10),
    ("left_shoulder", 0.35, 0.20),
    ("right_shoulder", 0.65, 0.20),
    ("left_elbow", 0.28, 0.37),
    ("right_elbow", 0.72, 0.37),
    ("left_wrist", 0.25, 0.50),
    ("right_wrist", 0.75, 0.50),
    ("left_hip", 0.40, 0.52),
    ("right_hip", 0.60, 0.52),
    ("left_knee", 0.38, 0.72),
    ("right_knee", 0.62, 0.72),
    ("left_ankle", 0.37, 0.92),
    ("right_ankle", 0.63, 0.92),
];

impl LandmarkDetector for ProportionalFallback {
    fn detect(&self, image: &RgbaImage) -> Vec<Landmark> {
        tracing::warn!(
            width = image.width(),
            height = image.height(),
            "no landmark detector available, using proportional fallback"
        );
        FALLBACK_LANDMARKS
            .iter()
            .map(|&(name, x, y)| Landmark {
                name: name.to_string(),
                x,
                y,
                z: Some(0.0),
                visibility: Some(1.0),
            })
            .collect()
    }
}

/// A detector that always returns the landmarks it was built with.
///
/// Lets callers feed externally detected points (for example from a JSON
/// file) through the same capability as a live detector.
#[derive(Debug, Clone, Default)]
pub struct FixedLandmarks(pub Vec<Landmark>);

impl LandmarkDetector for FixedLandmarks {
    fn detect(&self, _image: &RgbaImage) -> Vec<Landmark> {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fallback_returns_all_canonical_names() {
        let landmarks = ProportionalFallback.detect(&RgbaImage::new(4, 4));
        assert_eq!(landmarks.len(), 23);
        assert!(find(&landmarks, "nose").is_some());
        assert!(find(&landmarks, "right_ankle").is_some());
        for l in &landmarks {
            assert!((0.0..=1.0).contains(&l.x) && (0.0..=1.0).contains(&l.y));
            assert_eq!(l.z, Some(0.0));
            assert_eq!(l.visibility, Some(1.0));
        }
    }

    #[test]
    fn fallback_is_left_right_symmetric() {
        let landmarks = ProportionalFallback.detect(&RgbaImage::new(1, 1));
        let left = find(&landmarks, "left_shoulder").unwrap();
        let right = find(&landmarks, "right_shoulder").unwrap();
        assert!((left.x + right.x - 1.0).abs() < 1e-12);
        assert!((left.y - right.y).abs() < f64::EPSILON);
    }

    #[test]
    fn fixed_detector_echoes_input() {
        let detector = FixedLandmarks(vec![Landmark::new("nose", 0.4, 0.1)]);
        let out = detector.detect(&RgbaImage::new(2, 2));
        assert_eq!(out, vec![Landmark::new("nose", 0.4, 0.1)]);
    }

    #[test]
    fn landmark_json_omits_missing_depth() {
        let json = serde_json::to_string(&Landmark::new("nose", 0.5, 0.25)).unwrap();
        assert_eq!(json, r#"{"name":"nose","x":0.5,"y":0.25}"#);
        let json = r#"{"name":"nose","x":0.5,"y":0.25}"#;
        let parsed: Landmark = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.z, None);
    }
}
