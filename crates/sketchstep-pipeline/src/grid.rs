//! Proportional grid laid over the landmark bounding box.

use serde::{Deserialize, Serialize};

use crate::landmarks::Landmark;
use crate::tone::round_to;

/// Padding added around the landmark bounding box, in normalized units.
const BOX_PADDING: f64 = 0.05;

/// Learner level. Controls how finely the proportional grid subdivides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 4x4 grid.
    Beginner,
    /// 8x8 grid.
    #[default]
    Intermediate,
    /// 16x16 grid.
    Advanced,
}

impl Difficulty {
    /// Cells per side for this level.
    #[must_use]
    pub const fn grid_size(self) -> u32 {
        match self {
            Self::Beginner => 4,
            Self::Intermediate => 8,
            Self::Advanced => 16,
        }
    }

    /// Lowercase name used in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// One cell of the proportional grid, in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Zero-based row, top to bottom.
    pub row: u32,
    /// Zero-based column, left to right.
    pub col: u32,
    /// Left edge.
    pub x_start: f64,
    /// Top edge.
    pub y_start: f64,
    /// Right edge.
    pub x_end: f64,
    /// Bottom edge.
    pub y_end: f64,
    /// Whether any landmark lies inside the cell (edges inclusive).
    pub contains_landmark: bool,
}

#[derive(Clone, Copy)]
struct Bounds {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

fn landmark_bounds(landmarks: &[Landmark]) -> Bounds {
    if landmarks.is_empty() {
        return Bounds {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 1.0,
            y_max: 1.0,
        };
    }
    let init = Bounds {
        x_min: f64::INFINITY,
        y_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_max: f64::NEG_INFINITY,
    };
    let b = landmarks.iter().fold(init, |b, l| Bounds {
        x_min: b.x_min.min(l.x),
        y_min: b.y_min.min(l.y),
        x_max: b.x_max.max(l.x),
        y_max: b.y_max.max(l.y),
    });
    Bounds {
        x_min: (b.x_min - BOX_PADDING).max(0.0),
        y_min: (b.y_min - BOX_PADDING).max(0.0),
        x_max: (b.x_max + BOX_PADDING).min(1.0),
        y_max: (b.y_max + BOX_PADDING).min(1.0),
    }
}

/// Build the row-major grid of cells for `difficulty` over the padded
/// landmark bounding box (the unit square when there are no landmarks).
#[must_use]
pub fn generate_grid(landmarks: &[Landmark], difficulty: Difficulty) -> Vec<GridCell> {
    let size = difficulty.grid_size();
    let bounds = landmark_bounds(landmarks);
    let cell_w = (bounds.x_max - bounds.x_min) / f64::from(size);
    let cell_h = (bounds.y_max - bounds.y_min) / f64::from(size);

    let mut cells = Vec::with_capacity((size * size) as usize);
    for row in 0..size {
        for col in 0..size {
            let x_start = f64::from(col).mul_add(cell_w, bounds.x_min);
            let y_start = f64::from(row).mul_add(cell_h, bounds.y_min);
            let x_end = x_start + cell_w;
            let y_end = y_start + cell_h;
            let contains_landmark = landmarks.iter().any(|l| {
                (x_start..=x_end).contains(&l.x) && (y_start..=y_end).contains(&l.y)
            });
            cells.push(GridCell {
                row,
                col,
                x_start: round_to(x_start, 6),
                y_start: round_to(y_start, 6),
                x_end: round_to(x_end, 6),
                y_end: round_to(y_end, 6),
                contains_landmark,
            });
        }
    }
    cells
}

/// Percentage of cells holding at least one landmark, rounded to 2 decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn grid_density(cells: &[GridCell]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    let occupied = cells.iter().filter(|c| c.contains_landmark).count();
    round_to(occupied as f64 / cells.len() as f64 * 100.0, 2)
}
