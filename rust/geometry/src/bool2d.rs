// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D boolean operations on planar regions.
//!
//! Built on the i_overlay crate. Used to subtract opening footprints from
//! regions before extrusion and to validate user-supplied region
//! divisions, both of which are cheaper and more reliable in 2D than as
//! solid CSG afterwards.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Epsilon for floating point comparisons in 2D operations
pub const EPSILON_2D: f64 = 1e-9;

/// Minimum area threshold - contours smaller than this are degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// A planar region: counter-clockwise outer contour, clockwise holes.
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Region {
    /// Build a region, normalizing windings.
    pub fn new(outer: Vec<Point2<f64>>, holes: Vec<Vec<Point2<f64>>>) -> Self {
        Self {
            outer: ensure_ccw(&outer),
            holes: holes.iter().map(|h| ensure_cw(h)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !is_valid_contour(&self.outer)
    }

    /// Material area: outer minus holes.
    pub fn area(&self) -> f64 {
        let outer = compute_signed_area(&self.outer).abs();
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| compute_signed_area(h).abs())
            .sum();
        outer - holes
    }
}

/// Subtract opening footprints from a region.
///
/// Openings fully inside become holes; openings cutting the boundary
/// reshape it; an opening swallowing the region empties it. The region
/// may split, so a list of regions is returned (empty when nothing
/// remains).
pub fn subtract_openings(region: &Region, openings: &[Vec<Point2<f64>>]) -> Vec<Region> {
    if region.is_empty() {
        return Vec::new();
    }
    let valid: Vec<&Vec<Point2<f64>>> = openings
        .iter()
        .filter(|c| is_valid_contour(c))
        .collect();
    if valid.is_empty() {
        return vec![region.clone()];
    }

    let subject = region_to_paths(region);
    let clip: Vec<Vec<[f64; 2]>> = valid.iter().map(|c| contour_to_path(c)).collect();

    let shapes = subject.overlay(&clip, OverlayRule::Difference, FillRule::EvenOdd);
    shapes_to_regions(&shapes)
}

/// Intersect a region with a window contour, keeping whatever falls
/// inside the window.
pub fn intersect_region(region: &Region, window: &[Point2<f64>]) -> Vec<Region> {
    if region.is_empty() || !is_valid_contour(window) {
        return Vec::new();
    }
    let subject = region_to_paths(region);
    let clip = vec![contour_to_path(&ensure_ccw(window))];
    let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd);
    shapes_to_regions(&shapes)
}

/// Check that `parts` cover `region` within `tol` (in area units): the
/// division is valid iff the difference `region − ∪parts` carries no
/// area. Part material outside the region or overlapping other parts is
/// clipped away by downstream construction and does not invalidate the
/// division.
pub fn validate_divide(region: &Region, parts: &[Region], tol: f64) -> bool {
    if region.is_empty() {
        return false;
    }
    let subject = region_to_paths(region);
    let clip: Vec<Vec<[f64; 2]>> = parts
        .iter()
        .flat_map(region_to_paths)
        .collect();

    // NonZero so overlapping parts union instead of cancelling.
    let leftover = subject.overlay(&clip, OverlayRule::Difference, FillRule::NonZero);
    let uncovered: f64 = shapes_to_regions(&leftover).iter().map(Region::area).sum();
    uncovered <= tol
}

/// Union contours into non-overlapping outlines.
pub fn union_contours(contours: &[Vec<Point2<f64>>]) -> Vec<Vec<Point2<f64>>> {
    let valid: Vec<&Vec<Point2<f64>>> =
        contours.iter().filter(|c| is_valid_contour(c)).collect();
    match valid.len() {
        0 => return Vec::new(),
        1 => return vec![valid[0].clone()],
        _ => {}
    }

    let subject: Vec<Vec<[f64; 2]>> = vec![contour_to_path(valid[0])];
    let clip: Vec<Vec<[f64; 2]>> = valid[1..].iter().map(|c| contour_to_path(c)).collect();

    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::EvenOdd);

    let mut all_contours = Vec::new();
    for shape in result {
        for contour in shape {
            let points: Vec<Point2<f64>> = contour
                .into_iter()
                .map(|p| Point2::new(p[0], p[1]))
                .collect();
            if points.len() >= 3 {
                all_contours.push(points);
            }
        }
    }
    all_contours
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }
    compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Simplify a contour by removing collinear points
pub fn simplify_contour(contour: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut result = Vec::with_capacity(contour.len());
    let n = contour.len();

    for i in 0..n {
        let prev = &contour[(i + n - 1) % n];
        let curr = &contour[i];
        let next = &contour[(i + 1) % n];

        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);

        if cross.abs() > epsilon {
            result.push(*curr);
        }
    }

    if result.len() < 3 {
        return contour.to_vec();
    }

    result
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Check if two bounding boxes overlap
pub fn bounds_overlap(
    a_min: &Point2<f64>,
    a_max: &Point2<f64>,
    b_min: &Point2<f64>,
    b_max: &Point2<f64>,
) -> bool {
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a region to i_overlay path format
fn region_to_paths(region: &Region) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + region.holes.len());
    paths.push(contour_to_path(&ensure_ccw(&region.outer)));
    for hole in &region.holes {
        paths.push(contour_to_path(&ensure_cw(hole)));
    }
    paths
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

/// Convert i_overlay result shapes back into regions.
///
/// i_overlay returns `Vec<Vec<Vec<[f64; 2]>>>`: shapes, each a list of
/// contours with the outer first and holes after.
fn shapes_to_regions(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Region> {
    let mut regions = Vec::with_capacity(shapes.len());
    for shape in shapes {
        if shape.is_empty() {
            continue;
        }
        let outer: Vec<Point2<f64>> = shape[0].iter().map(|p| Point2::new(p[0], p[1])).collect();
        if !is_valid_contour(&outer) {
            continue;
        }
        let holes = shape
            .iter()
            .skip(1)
            .map(|c| c.iter().map(|p| Point2::new(p[0], p[1])).collect())
            .filter(|h: &Vec<Point2<f64>>| is_valid_contour(h))
            .collect();
        regions.push(Region::new(outer, holes));
    }
    regions
}
