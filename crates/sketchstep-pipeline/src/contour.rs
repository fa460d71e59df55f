//! Hierarchical shape extraction and importance ranking.
//!
//! The edge map is dilated to close small gaps, then traced with
//! Suzuki-Abe border following ([`imageproc::contours::find_contours`]),
//! which yields every border together with the index of its immediate
//! parent. That flat list is the arena: depth is found by walking parent
//! indices to the root, and shapes only ever refer to each other by index.
//!
//! Each surviving shape gets a composite importance score
//!
//! ```text
//! importance = 0.50 * depth_weight + 0.35 * area_weight + 0.15 * structure_weight
//! depth_weight     = max(0, 5 - depth) / 5
//! area_weight      = min(area * 10, 1)
//! structure_weight = min(perimeter * 2, 1)
//! ```
//!
//! and the result is sorted by descending importance. The sort is stable,
//! so shapes with equal scores keep their extraction order.

use geo::line_measures::Distance;
use geo::{Area, Centroid, Euclidean, LineString, Polygon};
use image::GrayImage;
use imageproc::contours::Contour;
use serde::{Deserialize, Serialize};

use crate::types::{AnalyzedShape, Dimensions, Point, Tier};

/// Weight of the depth term in [`importance_score`].
pub const DEPTH_WEIGHT: f64 = 0.50;
/// Weight of the area term in [`importance_score`].
pub const AREA_WEIGHT: f64 = 0.35;
/// Weight of the perimeter term in [`importance_score`].
pub const STRUCTURE_WEIGHT: f64 = 0.15;

/// Depth at which the depth term reaches zero.
const DEPTH_SATURATION: usize = 5;

/// Parameters for [`analyze`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Shapes enclosing less than this fraction of the image area are
    /// discarded as noise.
    pub min_area_fraction: f64,
}

impl ContourConfig {
    /// Default noise floor: 0.05% of the image area.
    pub const DEFAULT_MIN_AREA_FRACTION: f64 = 0.0005;
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            min_area_fraction: Self::DEFAULT_MIN_AREA_FRACTION,
        }
    }
}

/// Composite ranking score for a shape.
///
/// `area` is a fraction of the image area and `perimeter` a fraction of
/// the longer image side. The result is in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn importance_score(depth: usize, area: f64, perimeter: f64) -> f64 {
    let depth_term = DEPTH_SATURATION.saturating_sub(depth) as f64 / DEPTH_SATURATION as f64;
    let area_term = (area * 10.0).clamp(0.0, 1.0);
    let structure_term = (perimeter * 2.0).clamp(0.0, 1.0);
    STRUCTURE_WEIGHT.mul_add(
        structure_term,
        DEPTH_WEIGHT.mul_add(depth_term, AREA_WEIGHT * area_term),
    )
}

/// Number of ancestors of `index` in a parent-index arena.
///
/// The walk is bounded by the arena length so a malformed hierarchy
/// cannot loop forever.
#[must_use]
pub fn hierarchy_depth(parents: &[Option<usize>], index: usize) -> usize {
    let mut depth = 0;
    let mut current = parents.get(index).copied().flatten();
    while let Some(parent) = current {
        depth += 1;
        if depth >= parents.len() {
            break;
        }
        current = parents.get(parent).copied().flatten();
    }
    depth
}

/// Extract, measure, score, and rank every closed shape in `edges`.
///
/// Returns an empty vector (not an error) for a blank edge map.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(edges: &GrayImage, config: &ContourConfig) -> Vec<AnalyzedShape> {
    let dimensions = Dimensions {
        width: edges.width(),
        height: edges.height(),
    };
    if dimensions.area() == 0 {
        return Vec::new();
    }

    let closed = crate::edge::close_gaps(edges);
    let contours: Vec<Contour<u32>> = imageproc::contours::find_contours(&closed);
    let parents: Vec<Option<usize>> = contours.iter().map(|c| c.parent).collect();

    let image_area = dimensions.area() as f64;
    let min_area_px = image_area * config.min_area_fraction;

    let mut shapes: Vec<AnalyzedShape> = contours
        .iter()
        .enumerate()
        .filter_map(|(index, contour)| {
            let outline = pixel_outline(contour);
            let area_px = outline.unsigned_area();
            if area_px < min_area_px {
                return None;
            }
            Some(measure_shape(
                index,
                contour,
                &outline,
                area_px,
                &parents,
                dimensions,
            ))
        })
        .collect();

    // Stable: equal scores keep extraction order.
    shapes.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    tracing::info!(
        traced = contours.len(),
        kept = shapes.len(),
        "extracted shape hierarchy"
    );
    shapes
}

/// Close a traced border into a pixel-space polygon.
fn pixel_outline(contour: &Contour<u32>) -> Polygon<f64> {
    let ring: LineString<f64> = contour
        .points
        .iter()
        .map(|p| (f64::from(p.x), f64::from(p.y)))
        .collect::<Vec<_>>()
        .into();
    Polygon::new(ring, Vec::new())
}

#[allow(clippy::cast_precision_loss)]
fn measure_shape(
    index: usize,
    contour: &Contour<u32>,
    outline: &Polygon<f64>,
    area_px: f64,
    parents: &[Option<usize>],
    dimensions: Dimensions,
) -> AnalyzedShape {
    let width = f64::from(dimensions.width);
    let height = f64::from(dimensions.height);

    let perimeter_px: f64 = outline
        .exterior()
        .lines()
        .map(|line| Euclidean.distance(&line.start_point(), &line.end_point()))
        .sum();

    let centroid_px = pixel_centroid(contour, outline, area_px);
    let depth = hierarchy_depth(parents, index);
    let area = area_px / dimensions.area() as f64;
    let perimeter = perimeter_px / dimensions.longer_dim();

    let points = contour
        .points
        .iter()
        .map(|p| Point::new(f64::from(p.x) / width, f64::from(p.y) / height).clamp_unit())
        .collect();

    AnalyzedShape {
        extraction_index: index,
        points,
        area,
        perimeter,
        depth,
        parent: contour.parent,
        centroid: Point::new(centroid_px.x / width, centroid_px.y / height).clamp_unit(),
        tier: Tier::from_depth(depth),
        importance: importance_score(depth, area, perimeter),
    }
}

/// Area-weighted centroid, or the mean of the border points when the
/// outline encloses no area.
#[allow(clippy::cast_precision_loss)]
fn pixel_centroid(contour: &Contour<u32>, outline: &Polygon<f64>, area_px: f64) -> Point {
    if area_px > 0.0
        && let Some(c) = outline.centroid()
    {
        return Point::new(c.x(), c.y());
    }
    let n = contour.points.len().max(1) as f64;
    let (sx, sy) = contour.points.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + f64::from(p.x), sy + f64::from(p.y))
    });
    Point::new(sx / n, sy / n)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fill_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
    }

    fn outline_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for x in x0..=x1 {
            img.put_pixel(x, y0, image::Luma([255]));
            img.put_pixel(x, y1, image::Luma([255]));
        }
        for y in y0..=y1 {
            img.put_pixel(x0, y, image::Luma([255]));
            img.put_pixel(x1, y, image::Luma([255]));
        }
    }

    #[test]
    fn blank_edge_map_yields_no_shapes() {
        let edges = GrayImage::new(64, 64);
        assert!(analyze(&edges, &ContourConfig::default()).is_empty());
    }

    #[test]
    fn zero_sized_edge_map_yields_no_shapes() {
        let edges = GrayImage::new(0, 0);
        assert!(analyze(&edges, &ContourConfig::default()).is_empty());
    }

    #[test]
    fn single_filled_shape_is_one_outer_shape() {
        let mut edges = GrayImage::new(100, 100);
        fill_rect(&mut edges, 20, 20, 80, 80);
        let shapes = analyze(&edges, &ContourConfig::default());
        assert_eq!(shapes.len(), 1);
        let shape = &shapes[0];
        assert_eq!(shape.depth, 0);
        assert_eq!(shape.tier, Tier::Outer);
        assert_eq!(shape.parent, None);
        assert!(shape.area > 0.3 && shape.area < 0.4, "area {}", shape.area);
        assert!((shape.centroid.x - 0.495).abs() < 0.02);
        assert!((shape.centroid.y - 0.495).abs() < 0.02);
        assert!((shape.importance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn points_are_normalized() {
        let mut edges = GrayImage::new(120, 60);
        fill_rect(&mut edges, 0, 0, 120, 60);
        let shapes = analyze(&edges, &ContourConfig::default());
        assert!(!shapes.is_empty());
        for shape in &shapes {
            for p in &shape.points {
                assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
            }
        }
    }

    #[test]
    fn nested_outline_produces_deeper_shapes() {
        let mut edges = GrayImage::new(200, 200);
        outline_rect(&mut edges, 10, 10, 190, 190);
        outline_rect(&mut edges, 60, 60, 140, 140);
        let shapes = analyze(&edges, &ContourConfig::default());

        let outer = shapes.iter().find(|s| s.depth == 0).unwrap();
        assert_eq!(outer.tier, Tier::Outer);
        assert!(shapes.iter().any(|s| s.depth >= 1));
        for shape in &shapes {
            assert_eq!(shape.tier, Tier::from_depth(shape.depth));
            if let Some(parent) = shape.parent {
                assert!(parent < shape.extraction_index);
            }
        }
        // Deeper shapes rank below the silhouette.
        assert_eq!(shapes[0].depth, 0);
    }

    #[test]
    fn tiny_shapes_are_filtered_as_noise() {
        let mut edges = GrayImage::new(200, 200);
        fill_rect(&mut edges, 50, 50, 150, 150);
        // 2x2 speck: far below 0.05% of 40_000 px once traced.
        fill_rect(&mut edges, 5, 5, 7, 7);
        let shapes = analyze(&edges, &ContourConfig::default());
        assert_eq!(shapes.len(), 1);
    }

    #[test]
    fn zero_floor_keeps_small_shapes() {
        let mut edges = GrayImage::new(200, 200);
        fill_rect(&mut edges, 50, 50, 150, 150);
        fill_rect(&mut edges, 5, 5, 9, 9);
        let config = ContourConfig {
            min_area_fraction: 0.0,
        };
        assert_eq!(analyze(&edges, &config).len(), 2);
    }

    #[test]
    fn equal_scores_keep_extraction_order() {
        // Two identical squares far apart score identically.
        let mut edges = GrayImage::new(300, 100);
        fill_rect(&mut edges, 10, 10, 60, 60);
        fill_rect(&mut edges, 200, 10, 250, 60);
        let shapes = analyze(&edges, &ContourConfig::default());
        assert_eq!(shapes.len(), 2);
        assert!((shapes[0].importance - shapes[1].importance).abs() < f64::EPSILON);
        assert!(shapes[0].extraction_index < shapes[1].extraction_index);
    }

    #[test]
    fn ranking_is_descending() {
        let mut edges = GrayImage::new(300, 300);
        outline_rect(&mut edges, 10, 10, 290, 290);
        fill_rect(&mut edges, 100, 100, 140, 140);
        fill_rect(&mut edges, 200, 200, 210, 210);
        let shapes = analyze(&edges, &ContourConfig::default());
        for pair in shapes.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn importance_weights() {
        assert!((importance_score(0, 1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((importance_score(5, 0.0, 0.0)).abs() < 1e-12);
        assert!((importance_score(9, 0.0, 0.0)).abs() < 1e-12);
        // depth 1 -> 0.8 * 0.5, area 0.05 -> 0.5 * 0.35, perimeter 0.25 -> 0.5 * 0.15
        let expected = 0.4 + 0.175 + 0.075;
        assert!((importance_score(1, 0.05, 0.25) - expected).abs() < 1e-12);
    }

    #[test]
    fn depth_walks_parent_links() {
        let parents = [None, Some(0), Some(1), Some(2), None];
        assert_eq!(hierarchy_depth(&parents, 0), 0);
        assert_eq!(hierarchy_depth(&parents, 3), 3);
        assert_eq!(hierarchy_depth(&parents, 4), 0);
    }

    #[test]
    fn depth_walk_terminates_on_cycle() {
        let parents = [Some(1), Some(0)];
        assert!(hierarchy_depth(&parents, 0) <= parents.len());
    }
}
