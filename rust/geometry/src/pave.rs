// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile paving of planar regions.
//!
//! A [`Pattern`] is a lattice (two cell vectors) carrying one or more
//! anchored tile outlines per cell. [`pave`] instances the pattern over a
//! region's bounding box and clips every tile against the region through
//! the BSP region clipper, so concave outlines and holes are handled by
//! the same code path as solid booleans. Tiles overlapping a hole come
//! back with the hole subtracted; tiles split by the boundary come back
//! as several blocks.

use crate::bool2d::{
    bounds_overlap, compute_signed_area, contour_bounds, ensure_ccw, is_valid_contour, Region,
};
use crate::csg::{region_clipper, Polygon};
use crate::error::{Error, Result};
use nalgebra::{Matrix2, Point2, Point3, Vector2};

/// Fragments below this area are clipping noise.
const AREA_EPSILON: f64 = 1e-9;

/// One tile outline anchored inside a pattern cell.
#[derive(Debug, Clone)]
pub struct TileAnchor {
    /// Placement offset from the cell origin.
    pub offset: Vector2<f64>,
    /// Rotation around the tile origin, radians.
    pub rotation: f64,
    /// Tile outline around its own origin, counter-clockwise.
    pub outline: Vec<Point2<f64>>,
}

/// A periodic tile pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Lattice vector repeating the cell in u.
    pub cell_u: Vector2<f64>,
    /// Lattice vector repeating the cell in v.
    pub cell_v: Vector2<f64>,
    /// Width of the seam between tiles; each tile is inset by half.
    pub seam: f64,
    pub anchors: Vec<TileAnchor>,
}

impl Pattern {
    fn rect(w: f64, h: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    /// Plain grid of `w` by `h` tiles.
    pub fn grid(w: f64, h: f64, seam: f64) -> Self {
        Self {
            cell_u: Vector2::new(w, 0.0),
            cell_v: Vector2::new(0.0, h),
            seam,
            anchors: vec![TileAnchor {
                offset: Vector2::zeros(),
                rotation: 0.0,
                outline: Self::rect(w, h),
            }],
        }
    }

    /// Running bond: every other course shifted by half a tile.
    pub fn running_bond(w: f64, h: f64, seam: f64) -> Self {
        Self {
            cell_u: Vector2::new(w, 0.0),
            cell_v: Vector2::new(0.0, 2.0 * h),
            seam,
            anchors: vec![
                TileAnchor {
                    offset: Vector2::zeros(),
                    rotation: 0.0,
                    outline: Self::rect(w, h),
                },
                TileAnchor {
                    offset: Vector2::new(w / 2.0, h),
                    rotation: 0.0,
                    outline: Self::rect(w, h),
                },
            ],
        }
    }
}

/// One placed tile (or tile fragment) after clipping.
#[derive(Debug, Clone)]
pub struct BlockOutline {
    /// Clipped outline, counter-clockwise.
    pub path: Vec<Point2<f64>>,
    /// Index of the anchor this block was instanced from.
    pub anchor: usize,
    /// World rotation of the tile, radians.
    pub rotation: f64,
    pub centroid: Point2<f64>,
    /// True when the tile survived clipping intact.
    pub is_unbroken: bool,
}

fn rotate(p: &Point2<f64>, angle: f64) -> Point2<f64> {
    let (s, c) = angle.sin_cos();
    Point2::new(c * p.x - s * p.y, s * p.x + c * p.y)
}

/// Inset a convex counter-clockwise outline by `d`.
///
/// Each edge is moved inward along its normal and consecutive offset
/// lines are intersected. Returns an empty outline when the inset
/// consumes the tile.
fn inset_outline(outline: &[Point2<f64>], d: f64) -> Vec<Point2<f64>> {
    if d <= 0.0 {
        return outline.to_vec();
    }
    let n = outline.len();
    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        // Offset lines of the edges meeting at vertex i.
        let prev = outline[(i + n - 1) % n];
        let curr = outline[i];
        let next = outline[(i + 1) % n];

        let d0 = (curr - prev).normalize();
        let d1 = (next - curr).normalize();
        let n0 = Vector2::new(-d0.y, d0.x);
        let n1 = Vector2::new(-d1.y, d1.x);

        let p0 = prev + n0 * d;
        let p1 = curr + n1 * d;

        // Intersect p0 + t*d0 with p1 + s*d1.
        let det = d0.x * d1.y - d0.y * d1.x;
        if det.abs() < 1e-12 {
            // Collinear edges: just shift the vertex.
            result.push(curr + n0 * d);
            continue;
        }
        let diff = p1 - p0;
        let t = (diff.x * d1.y - diff.y * d1.x) / det;
        result.push(p0 + d0 * t);
    }
    // An inset past the tile midline turns edges back on themselves while
    // the inverted outline can keep positive area. Reject when any edge
    // no longer runs the way its source edge did.
    for i in 0..n {
        let j = (i + 1) % n;
        let old_dir = outline[j] - outline[i];
        let new_dir = result[j] - result[i];
        if new_dir.dot(&old_dir) <= 0.0 {
            return Vec::new();
        }
    }
    if compute_signed_area(&result) <= AREA_EPSILON {
        return Vec::new();
    }
    result
}

fn fragment_centroid(path: &[Point2<f64>]) -> Point2<f64> {
    let sum = path
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / path.len() as f64)
}

/// Pave a region with a pattern.
///
/// Every lattice cell whose tiles can touch the region's bounding box is
/// instanced; tiles are inset by half the seam, embedded at `z = 0` and
/// clipped against the region. Returned blocks jointly cover the region
/// exactly (for a zero seam): clipping splits tiles but never loses or
/// duplicates area.
pub fn pave(pattern: &Pattern, region: &Region) -> Result<Vec<BlockOutline>> {
    let det = pattern.cell_u.x * pattern.cell_v.y - pattern.cell_u.y * pattern.cell_v.x;
    if det.abs() < 1e-12 {
        return Err(Error::InvalidPattern(
            "cell vectors are collinear".to_string(),
        ));
    }
    if pattern.anchors.is_empty() {
        return Err(Error::InvalidPattern("pattern has no anchors".to_string()));
    }
    if region.is_empty() {
        return Ok(Vec::new());
    }

    // Inset and rotate each anchor outline once; instances only translate.
    let mut prepared: Vec<(usize, Vec<Point2<f64>>)> = Vec::new();
    for (idx, anchor) in pattern.anchors.iter().enumerate() {
        if !is_valid_contour(&anchor.outline) {
            return Err(Error::InvalidPattern(format!(
                "anchor {idx} outline is degenerate"
            )));
        }
        let inset = inset_outline(&ensure_ccw(&anchor.outline), pattern.seam / 2.0);
        if inset.is_empty() {
            log::debug!("seam consumes anchor {idx}, skipping");
            continue;
        }
        let rotated: Vec<Point2<f64>> = inset
            .iter()
            .map(|p| rotate(p, anchor.rotation) + anchor.offset)
            .collect();
        prepared.push((idx, rotated));
    }

    let (region_min, region_max) =
        contour_bounds(&region.outer).ok_or_else(|| Error::InvalidRegion("empty".into()))?;

    // Lattice index range covering the bounding box, padded so tiles
    // reaching in from outside are not missed.
    let lattice = Matrix2::from_columns(&[pattern.cell_u, pattern.cell_v]);
    let inv = lattice
        .try_inverse()
        .ok_or_else(|| Error::InvalidPattern("cell vectors are collinear".to_string()))?;
    let corners = [
        region_min,
        Point2::new(region_max.x, region_min.y),
        region_max,
        Point2::new(region_min.x, region_max.y),
    ];
    let mut i_min = i64::MAX;
    let mut i_max = i64::MIN;
    let mut j_min = i64::MAX;
    let mut j_max = i64::MIN;
    for c in &corners {
        let lc = inv * c.coords;
        i_min = i_min.min(lc.x.floor() as i64);
        i_max = i_max.max(lc.x.ceil() as i64);
        j_min = j_min.min(lc.y.floor() as i64);
        j_max = j_max.max(lc.y.ceil() as i64);
    }
    const PAD: i64 = 2;

    let tree = region_clipper(&region.outer, &region.holes);
    let mut blocks = Vec::new();

    for i in (i_min - PAD)..=(i_max + PAD) {
        for j in (j_min - PAD)..=(j_max + PAD) {
            let shift = pattern.cell_u * i as f64 + pattern.cell_v * j as f64;
            for (anchor_idx, outline) in &prepared {
                let placed: Vec<Point2<f64>> =
                    outline.iter().map(|p| p + shift).collect();

                let Some((tile_min, tile_max)) = contour_bounds(&placed) else {
                    continue;
                };
                if !bounds_overlap(&tile_min, &tile_max, &region_min, &region_max) {
                    continue;
                }

                let tile_area = compute_signed_area(&placed);
                let Some(poly) = Polygon::new(
                    placed
                        .iter()
                        .map(|p| Point3::new(p.x, p.y, 0.0))
                        .collect(),
                ) else {
                    continue;
                };

                let fragments = tree.clip_polygons(vec![poly]);
                let kept: Vec<&Polygon> = fragments
                    .iter()
                    .filter(|f| f.area() > AREA_EPSILON)
                    .collect();
                // Area, not fragment count: the tree may split an interior
                // tile along a wall-plane extension without removing
                // anything from it.
                let kept_area: f64 = kept.iter().map(|f| f.area()).sum();
                let unbroken = (kept_area - tile_area).abs() <= 1e-6 * tile_area.max(1.0);

                for fragment in kept {
                    let path: Vec<Point2<f64>> = fragment
                        .vertices
                        .iter()
                        .map(|v| Point2::new(v.x, v.y))
                        .collect();
                    let centroid = fragment_centroid(&path);
                    blocks.push(BlockOutline {
                        path: ensure_ccw(&path),
                        anchor: *anchor_idx,
                        rotation: pattern.anchors[*anchor_idx].rotation,
                        centroid,
                        is_unbroken: unbroken,
                    });
                }
            }
        }
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn region_rect(x0: f64, y0: f64, w: f64, h: f64) -> Region {
        Region::new(
            vec![
                Point2::new(x0, y0),
                Point2::new(x0 + w, y0),
                Point2::new(x0 + w, y0 + h),
                Point2::new(x0, y0 + h),
            ],
            vec![],
        )
    }

    fn total_area(blocks: &[BlockOutline]) -> f64 {
        blocks
            .iter()
            .map(|b| compute_signed_area(&b.path).abs())
            .sum()
    }

    #[test]
    fn test_grid_covers_region_exactly() {
        // Offset so the grid does not align with the region boundary.
        let region = region_rect(0.1, 0.2, 4.0, 3.0);
        let blocks = pave(&Pattern::grid(1.0, 1.0, 0.0), &region).unwrap();
        assert!(!blocks.is_empty());
        assert_relative_eq!(total_area(&blocks), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_boundary_tiles_marked_broken() {
        let region = region_rect(0.5, 0.5, 3.0, 3.0);
        let blocks = pave(&Pattern::grid(1.0, 1.0, 0.0), &region).unwrap();

        let unbroken: Vec<_> = blocks.iter().filter(|b| b.is_unbroken).collect();
        let broken: Vec<_> = blocks.iter().filter(|b| !b.is_unbroken).collect();
        // Interior 2x2 tiles are whole; the rim is cut.
        assert_eq!(unbroken.len(), 4);
        assert!(!broken.is_empty());
        for b in unbroken {
            assert_relative_eq!(
                compute_signed_area(&b.path).abs(),
                1.0,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_concave_region_keeps_interior_tiles_unbroken() {
        // L-shaped region: the clipper's wall planes extend past the
        // notch corner and may split interior tiles that lose no area.
        let region = Region::new(
            vec![
                Point2::new(0.5, 0.5),
                Point2::new(4.5, 0.5),
                Point2::new(4.5, 2.5),
                Point2::new(2.5, 2.5),
                Point2::new(2.5, 4.5),
                Point2::new(0.5, 4.5),
            ],
            vec![],
        );
        let blocks = pave(&Pattern::grid(1.0, 1.0, 0.0), &region).unwrap();
        assert_relative_eq!(total_area(&blocks), 12.0, epsilon = 1e-6);

        // The [2,3]x[1,2] tile sits fully inside the region but crosses
        // the extension of the x = 2.5 wall.
        let interior: Vec<_> = blocks
            .iter()
            .filter(|b| {
                b.centroid.x > 2.0 && b.centroid.x < 3.0 && b.centroid.y > 1.0 && b.centroid.y < 2.0
            })
            .collect();
        assert!(!interior.is_empty());
        assert!(interior.iter().all(|b| b.is_unbroken));
        let interior_area: f64 = interior
            .iter()
            .map(|b| compute_signed_area(&b.path).abs())
            .sum();
        assert_relative_eq!(interior_area, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hole_is_subtracted_from_tiles() {
        let mut region = region_rect(0.0, 0.0, 4.0, 4.0);
        region = Region::new(
            region.outer,
            vec![vec![
                Point2::new(1.5, 1.5),
                Point2::new(2.5, 1.5),
                Point2::new(2.5, 2.5),
                Point2::new(1.5, 2.5),
            ]],
        );
        let blocks = pave(&Pattern::grid(4.0, 4.0, 0.0), &region).unwrap();
        assert_relative_eq!(total_area(&blocks), 15.0, epsilon = 1e-6);
        assert!(blocks.iter().all(|b| !b.is_unbroken));
    }

    #[test]
    fn test_seam_shrinks_tiles() {
        let region = region_rect(0.0, 0.0, 10.0, 10.0);
        let blocks = pave(&Pattern::grid(1.0, 1.0, 0.2), &region).unwrap();
        // Every surviving tile is at most the inset size.
        for b in &blocks {
            assert!(compute_signed_area(&b.path).abs() <= 0.81 + 1e-9);
        }
        assert!(total_area(&blocks) < 100.0);
    }

    #[test]
    fn test_running_bond_alternates_anchors() {
        let region = region_rect(0.0, 0.0, 8.0, 8.0);
        let blocks = pave(&Pattern::running_bond(2.0, 1.0, 0.0), &region).unwrap();
        assert!(blocks.iter().any(|b| b.anchor == 0));
        assert!(blocks.iter().any(|b| b.anchor == 1));
        assert_relative_eq!(total_area(&blocks), 64.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_pattern_is_rejected() {
        let region = region_rect(0.0, 0.0, 4.0, 4.0);
        let mut pattern = Pattern::grid(1.0, 1.0, 0.0);
        pattern.cell_v = pattern.cell_u;
        assert!(matches!(
            pave(&pattern, &region).unwrap_err(),
            Error::InvalidPattern(_)
        ));

        let mut no_anchor = Pattern::grid(1.0, 1.0, 0.0);
        no_anchor.anchors.clear();
        assert!(matches!(
            pave(&no_anchor, &region).unwrap_err(),
            Error::InvalidPattern(_)
        ));
    }

    #[test]
    fn test_empty_region_paves_to_nothing() {
        let region = Region::default();
        let blocks = pave(&Pattern::grid(1.0, 1.0, 0.0), &region).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_inset_outline() {
        let square = Pattern::rect(2.0, 2.0);
        let inset = inset_outline(&square, 0.5);
        assert_eq!(inset.len(), 4);
        assert_relative_eq!(compute_signed_area(&inset), 1.0, epsilon = 1e-9);
        // Inset larger than the tile consumes it, even though the
        // inverted square would still have positive signed area.
        assert!(inset_outline(&square, 1.5).is_empty());
        // A thin rectangle inverts across its short axis first.
        assert!(inset_outline(&Pattern::rect(4.0, 1.0), 0.75).is_empty());
    }

    #[test]
    fn test_oversized_seam_paves_to_nothing() {
        let region = region_rect(0.0, 0.0, 4.0, 4.0);
        let blocks = pave(&Pattern::grid(1.0, 1.0, 2.5), &region).unwrap();
        assert!(blocks.is_empty());
    }
}
