// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile extrusion into prismatic bodies.
//!
//! A planar profile (points with optional arc sides) is swept along a
//! direction between two offsets. The result keeps one [`Segment`] per
//! profile side under a stable face key, so material assignments and
//! selections survive regeneration:
//!
//! - `"originalface"` is the profile-side cap,
//! - `"extrudedface"` is the swept cap,
//! - `"sideface{i}"` is the wall grown from profile side `i`.

use crate::{Mesh, Point2, Point3, Vector3};
use deco_cad_topology::{CircleArc, ProfilePoint, WireKey, POINT_TOLERANCE};

/// Face key of the cap on the profile plane.
pub const ORIGINAL_FACE: &str = "originalface";
/// Face key of the cap at the swept end.
pub const EXTRUDED_FACE: &str = "extrudedface";
/// Face key prefix of side walls.
pub const SIDE_FACE: &str = "sideface";

/// Fewest chords an arc side is discretized into.
pub const MIN_ARC_SEGMENTS: usize = 48;
/// Most chords an arc side is discretized into.
pub const MAX_ARC_SEGMENTS: usize = 72;

/// Chord count for an arc: proportional to its angular sweep, clamped so
/// even short arcs render smoothly.
fn arc_segment_count(arc: &CircleArc) -> usize {
    ((arc.sweep() * 11.46).ceil() as usize).clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS)
}

/// One side wall of an extrusion.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Stable face key, `"sideface{i}"` for profile side `i`.
    pub key: String,
    /// Closed boundary ring: bottom chain, then top chain reversed.
    pub path: Vec<Point3<f64>>,
    /// The ring unrolled into the plane: u runs along the side, v along
    /// the sweep. Used for texture mapping.
    pub flat_path: Vec<Point2<f64>>,
}

/// A prismatic body produced by [`extrude`].
#[derive(Debug, Clone, Default)]
pub struct Extrusion {
    /// Sweep direction (unit length) for a non-empty result.
    pub direction: Vector3<f64>,
    /// Swept ring followed by profile ring: `2 * M` points for an
    /// `M`-point discretized profile.
    pub path: Vec<Point3<f64>>,
    /// Discretized profile ring in the sketch plane (`M` points).
    pub flat_path: Vec<Point2<f64>>,
    /// One wall per profile side, in side order.
    pub segments: Vec<Segment>,
}

impl Extrusion {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// All face keys of this body, caps first.
    pub fn face_keys(&self) -> Vec<&str> {
        let mut keys = vec![ORIGINAL_FACE, EXTRUDED_FACE];
        keys.extend(self.segments.iter().map(|s| s.key.as_str()));
        keys
    }

    /// Find a side wall by face key.
    pub fn segment(&self, key: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.key == key)
    }
}

/// Drop consecutive coincident points (including a repeated closing
/// point), which otherwise produce zero-length sides.
fn dedup_profile(profile: &[ProfilePoint]) -> Vec<ProfilePoint> {
    let mut out: Vec<ProfilePoint> = Vec::with_capacity(profile.len());
    for p in profile {
        if out
            .last()
            .map_or(true, |q| (p.point() - q.point()).norm() > POINT_TOLERANCE)
        {
            out.push(*p);
        }
    }
    if out.len() > 1 {
        let closes = (out[0].point() - out.last().unwrap().point()).norm() <= POINT_TOLERANCE;
        if closes {
            out.pop();
        }
    }
    out
}

/// Sweep a closed profile along `direction` from offset `z0` to `z1`.
///
/// The profile cap sits at `origin + direction * z0`, the extruded cap at
/// `direction * z1`. Degenerate input (under 3 distinct points, zero
/// direction or zero sweep) yields an empty body.
pub fn extrude(
    profile: &[ProfilePoint],
    direction: Vector3<f64>,
    z0: f64,
    z1: f64,
) -> Extrusion {
    let profile = dedup_profile(profile);
    let Some(dir) = direction.try_normalize(1e-10) else {
        log::warn!("extrude: zero direction");
        return Extrusion::default();
    };
    if profile.len() < 3 || (z1 - z0).abs() <= POINT_TOLERANCE {
        log::warn!(
            "extrude: degenerate profile ({} points, sweep {})",
            profile.len(),
            z1 - z0
        );
        return Extrusion::default();
    }

    let lift = |p: &Point2<f64>, z: f64| Point3::new(p.x, p.y, 0.0) + dir * z;

    // Discretize each side into a point chain; arcs get interior samples.
    let n = profile.len();
    let mut side_chains: Vec<Vec<Point2<f64>>> = Vec::with_capacity(n);
    for i in 0..n {
        let from = profile[i].point();
        let to = profile[(i + 1) % n].point();
        let chain = match profile[i].arc {
            Some(meta) => {
                let arc = CircleArc::new(
                    from,
                    to,
                    Point2::new(meta.center[0], meta.center[1]),
                    !meta.clockwise,
                );
                arc.sample(arc_segment_count(&arc))
            }
            None => vec![from, to],
        };
        side_chains.push(chain);
    }

    // Profile ring: each chain minus its end point (= next chain's start).
    let mut flat_path = Vec::new();
    for chain in &side_chains {
        flat_path.extend_from_slice(&chain[..chain.len() - 1]);
    }

    let top_ring: Vec<Point3<f64>> = flat_path.iter().map(|p| lift(p, z1)).collect();
    let bottom_ring: Vec<Point3<f64>> = flat_path.iter().map(|p| lift(p, z0)).collect();
    let mut path = top_ring;
    path.extend_from_slice(&bottom_ring);

    let segments = side_chains
        .iter()
        .enumerate()
        .map(|(i, chain)| {
            let bottom: Vec<Point3<f64>> = chain.iter().map(|p| lift(p, z0)).collect();
            let top: Vec<Point3<f64>> = chain.iter().map(|p| lift(p, z1)).collect();

            // Unroll the chain: u is arc length along the side.
            let mut us = Vec::with_capacity(chain.len());
            let mut u = 0.0;
            us.push(0.0);
            for w in chain.windows(2) {
                u += (w[1] - w[0]).norm();
                us.push(u);
            }
            let mut flat: Vec<Point2<f64>> =
                us.iter().map(|&u| Point2::new(u, z0)).collect();
            flat.extend(us.iter().rev().map(|&u| Point2::new(u, z1)));

            let mut ring = bottom;
            ring.extend(top.into_iter().rev());
            Segment {
                key: format!("{SIDE_FACE}{i}"),
                path: ring,
                flat_path: flat,
            }
        })
        .collect();

    Extrusion {
        direction: dir,
        path,
        flat_path,
        segments,
    }
}

/// Extrude the loop of a topology wire.
pub fn extrude_wire(
    model: &deco_cad_topology::TopologyModel,
    wire: WireKey,
    direction: Vector3<f64>,
    z0: f64,
    z1: f64,
) -> crate::Result<Extrusion> {
    let lp = model.wire_loop(wire)?;
    Ok(extrude(&lp.to_profile(), direction, z0, z1))
}

/// Triangulate an extrusion into a render mesh.
///
/// Caps are triangulated from the profile ring; walls are emitted as
/// quads per chord with face normals. Degenerate chords are skipped.
pub fn extrusion_to_mesh(ex: &Extrusion) -> Mesh {
    if ex.is_empty() {
        return Mesh::new();
    }
    let m = ex.flat_path.len();
    // Outward normal of the swept cap points from the profile ring to it.
    let Some(up) = (ex.path[0] - ex.path[m]).try_normalize(1e-10) else {
        return Mesh::new();
    };
    let mut mesh = Mesh::with_capacity(m * 6, m * 12);

    // Caps. The swept ring is path[..m], the profile ring path[m..].
    let cap_indices = crate::triangulation::triangulate_polygon(&ex.flat_path);
    let base_top = mesh.vertex_count() as u32;
    for v in &ex.path[..m] {
        mesh.add_vertex(*v, up);
    }
    for tri in cap_indices.chunks_exact(3) {
        mesh.add_triangle(
            base_top + tri[0] as u32,
            base_top + tri[1] as u32,
            base_top + tri[2] as u32,
        );
    }
    let base_bottom = mesh.vertex_count() as u32;
    for v in &ex.path[m..] {
        mesh.add_vertex(*v, -up);
    }
    for tri in cap_indices.chunks_exact(3) {
        // Reversed winding so the cap faces outward.
        mesh.add_triangle(
            base_bottom + tri[0] as u32,
            base_bottom + tri[2] as u32,
            base_bottom + tri[1] as u32,
        );
    }

    // Walls: quad per ring chord.
    for i in 0..m {
        let j = (i + 1) % m;
        let top_i = ex.path[i];
        let top_j = ex.path[j];
        let bot_i = ex.path[m + i];
        let bot_j = ex.path[m + j];

        let edge = bot_j - bot_i;
        let Some(normal) = edge.cross(&up).try_normalize(1e-10) else {
            continue;
        };
        let base = mesh.vertex_count() as u32;
        mesh.add_vertex(bot_i, normal);
        mesh.add_vertex(bot_j, normal);
        mesh.add_vertex(top_j, normal);
        mesh.add_vertex(top_i, normal);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<ProfilePoint> {
        vec![
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(1.0, 0.0),
            ProfilePoint::new(1.0, 1.0),
            ProfilePoint::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_square_extrusion_counts() {
        let ex = extrude(&unit_square(), Vector3::new(0.0, 0.0, -1.0), 0.0, 1.0);
        assert!(!ex.is_empty());
        assert_eq!(ex.flat_path.len(), 4);
        assert_eq!(ex.path.len(), 8);
        assert_eq!(ex.segments.len(), 4);
        for seg in &ex.segments {
            assert_eq!(seg.path.len(), 4);
            assert_eq!(seg.flat_path.len(), 4);
        }
        // Swept ring sits at direction * z1 = z = -1.
        for v in &ex.path[..4] {
            assert_relative_eq!(v.z, -1.0);
        }
        for v in &ex.path[4..] {
            assert_relative_eq!(v.z, 0.0);
        }
    }

    #[test]
    fn test_face_keys_stable_across_direction_sign() {
        let down = extrude(&unit_square(), Vector3::new(0.0, 0.0, -1.0), 0.0, 1.0);
        let up = extrude(&unit_square(), Vector3::new(0.0, 0.0, 1.0), 0.0, 1.0);
        assert_eq!(down.face_keys(), up.face_keys());
        assert_eq!(
            down.face_keys()[..2],
            [ORIGINAL_FACE, EXTRUDED_FACE]
        );
        assert!(down.segment("sideface2").is_some());
        assert!(down.segment("sideface9").is_none());
    }

    #[test]
    fn test_degenerate_profiles_yield_empty_body() {
        let line = vec![ProfilePoint::new(0.0, 0.0), ProfilePoint::new(1.0, 0.0)];
        assert!(extrude(&line, Vector3::z(), 0.0, 1.0).is_empty());

        // Repeated points collapse below 3 distinct corners.
        let collapsed = vec![
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(1.0, 0.0),
        ];
        assert!(extrude(&collapsed, Vector3::z(), 0.0, 1.0).is_empty());

        // Zero sweep and zero direction.
        assert!(extrude(&unit_square(), Vector3::z(), 0.5, 0.5).is_empty());
        assert!(extrude(&unit_square(), Vector3::zeros(), 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_closing_duplicate_is_dropped() {
        let mut profile = unit_square();
        profile.push(ProfilePoint::new(0.0, 0.0));
        let ex = extrude(&profile, Vector3::z(), 0.0, 1.0);
        assert_eq!(ex.segments.len(), 4);
    }

    #[test]
    fn test_arc_side_discretization_clamped() {
        // Rounded side: half circle over the top of a slab.
        let profile = vec![
            ProfilePoint::new(-1.0, 0.0),
            ProfilePoint::new(1.0, 0.0),
            ProfilePoint::with_arc(1.0, 1.0, [0.0, 1.0], false),
        ];
        let ex = extrude(&profile, Vector3::z(), 0.0, 0.5);
        assert_eq!(ex.segments.len(), 3);

        let arc_seg = &ex.segments[2];
        let chords = arc_seg.path.len() / 2 - 1;
        assert!(
            (MIN_ARC_SEGMENTS..=MAX_ARC_SEGMENTS).contains(&chords),
            "got {chords} chords"
        );
        // Straight sides stay quads.
        assert_eq!(ex.segments[0].path.len(), 4);
        // The ring absorbs the arc samples: one point per straight side
        // plus the arc's chords, shared endpoints dropped.
        assert_eq!(ex.flat_path.len(), 2 + chords);
    }

    #[test]
    fn test_segment_flat_path_unrolls_length() {
        let ex = extrude(&unit_square(), Vector3::z(), 0.0, 2.0);
        let seg = &ex.segments[0];
        // Bottom edge runs from u=0 to u=1 at v=0, back at v=2.
        assert_relative_eq!(seg.flat_path[0].x, 0.0);
        assert_relative_eq!(seg.flat_path[1].x, 1.0);
        assert_relative_eq!(seg.flat_path[1].y, 0.0);
        assert_relative_eq!(seg.flat_path[2].y, 2.0);
    }

    #[test]
    fn test_extrusion_mesh_counts() {
        let ex = extrude(&unit_square(), Vector3::z(), 0.0, 1.0);
        let mesh = extrusion_to_mesh(&ex);
        // 2 triangles per cap + 2 per wall quad.
        assert_eq!(mesh.triangle_count(), 2 + 2 + 4 * 2);
        let (min, max) = mesh.bounds();
        assert_eq!(min.z, 0.0);
        assert_eq!(max.z, 1.0);
    }

    #[test]
    fn test_extrude_wire_round_trip() {
        use deco_cad_topology::{Curve, TopologyModel};
        let mut model = TopologyModel::new();
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let coedges: Vec<_> = (0..4)
            .map(|i| {
                let e = model
                    .add_edge(format!("e{i}"), Curve::line(pts[i], pts[(i + 1) % 4]))
                    .unwrap();
                model.forward_coedge(e).unwrap()
            })
            .collect();
        let wire = model.add_wire(&coedges).unwrap();
        let ex = extrude_wire(&model, wire, Vector3::z(), 0.0, 3.0).unwrap();
        assert_eq!(ex.segments.len(), 4);
        assert_eq!(ex.path.len(), 8);
    }
}
