// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests: sketch topology through extrusion, booleans and
//! paving.

use deco_cad_geometry::{
    extrude_wire, pave, polygons_to_mesh, prism, subtract_openings, Csg, Pattern, Point2, Region,
    Vector3,
};
use deco_cad_topology::{decode_topo_name, Curve, TopologyModel, WireKey};

/// Small deterministic LCG so the fuzz cases are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

fn square_wire(model: &mut TopologyModel, prefix: &str, size: f64) -> WireKey {
    let pts = [
        Point2::new(0.0, 0.0),
        Point2::new(size, 0.0),
        Point2::new(size, size),
        Point2::new(0.0, size),
    ];
    let coedges: Vec<_> = (0..4)
        .map(|i| {
            let e = model
                .add_edge(format!("{prefix}-{i}"), Curve::line(pts[i], pts[(i + 1) % 4]))
                .unwrap();
            model.forward_coedge(e).unwrap()
        })
        .collect();
    model.add_wire(&coedges).unwrap()
}

#[test]
fn sketch_to_extrusion_pipeline() {
    let mut model = TopologyModel::new();
    let wire = square_wire(&mut model, "panel", 1.0);

    // Tag an edge the way a dressing operation would and check the name
    // survives the round trip.
    let edge = model.edge_by_id("panel-2").unwrap();
    model.add_tag(edge, "trim").unwrap();
    let name = model.topo_name(edge).unwrap();
    let (id, tags) = decode_topo_name(&name).unwrap();
    assert_eq!(id, "panel-2");
    assert_eq!(tags, vec!["trim"]);

    let ex = extrude_wire(&model, wire, Vector3::new(0.0, 0.0, -1.0), 0.0, 1.0).unwrap();
    assert_eq!(ex.path.len(), 8);
    assert_eq!(ex.flat_path.len(), 4);
    assert_eq!(ex.segments.len(), 4);
    for (i, seg) in ex.segments.iter().enumerate() {
        assert_eq!(seg.key, format!("sideface{i}"));
        assert_eq!(seg.path.len(), 4);
    }

    // Same body extruded the other way keeps the same face keys.
    let flipped = extrude_wire(&model, wire, Vector3::new(0.0, 0.0, 1.0), 0.0, 1.0).unwrap();
    assert_eq!(ex.face_keys(), flipped.face_keys());
}

#[test]
fn extrusion_feeds_solid_booleans() {
    let mut model = TopologyModel::new();
    let wire = square_wire(&mut model, "slab", 4.0);
    let ex = extrude_wire(&model, wire, Vector3::z(), 0.0, 1.0).unwrap();

    let slab = Csg::from_polygons(prism(&ex.flat_path, 0.0, 1.0));
    let notch = Csg::from_polygons(prism(
        &[
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(1.0, 2.0),
        ],
        -0.5,
        1.5,
    ));
    let carved = slab.subtract(&notch);
    assert!(!carved.is_empty());

    let mesh = polygons_to_mesh(&carved.polygons);
    assert!(mesh.triangle_count() > 12);
    let (min, max) = mesh.bounds();
    assert!(min.z >= -1e-6 && max.z <= 1.0 + 1e-6);

    // No result vertex inside the notch volume.
    for p in &carved.polygons {
        for v in &p.vertices {
            let inside = v.x > 1.0 + 1e-6
                && v.x < 2.0 - 1e-6
                && v.y > 1.0 + 1e-6
                && v.y < 2.0 - 1e-6;
            assert!(!inside, "vertex {v:?} in carved volume");
        }
    }
}

#[test]
fn subtract_disjoint_fuzz_stays_in_minuend() {
    let mut rng = Lcg(0x5eed);
    for case in 0..24 {
        let size_a = rng.range(0.5, 3.0);
        let a = Csg::from_polygons(prism(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(size_a, 0.0),
                Point2::new(size_a, size_a),
                Point2::new(0.0, size_a),
            ],
            0.0,
            size_a,
        ));

        // Subtrahend strictly to the right of a, never touching.
        let x0 = size_a + rng.range(0.1, 2.0);
        let size_b = rng.range(0.5, 2.0);
        let y0 = rng.range(-2.0, 2.0);
        let b = Csg::from_polygons(prism(
            &[
                Point2::new(x0, y0),
                Point2::new(x0 + size_b, y0),
                Point2::new(x0 + size_b, y0 + size_b),
                Point2::new(x0, y0 + size_b),
            ],
            rng.range(-1.0, 0.0),
            rng.range(0.5, 2.0),
        ));

        let d = a.subtract(&b);
        assert!(!d.is_empty(), "case {case}: result empty");
        for p in &d.polygons {
            for v in &p.vertices {
                assert!(
                    v.x >= -1e-6 && v.x <= size_a + 1e-6,
                    "case {case}: x {} outside minuend",
                    v.x
                );
                assert!(v.y >= -1e-6 && v.y <= size_a + 1e-6, "case {case}");
                assert!(v.z >= -1e-6 && v.z <= size_a + 1e-6, "case {case}");
            }
        }
    }
}

#[test]
fn openings_then_paving_conserves_area() {
    // A 6x4 floor with a 1x1 column opening cut out, paved with a grid.
    let floor = Region::new(
        vec![
            Point2::new(0.25, 0.25),
            Point2::new(6.25, 0.25),
            Point2::new(6.25, 4.25),
            Point2::new(0.25, 4.25),
        ],
        vec![],
    );
    let column = vec![
        Point2::new(2.0, 2.0),
        Point2::new(3.0, 2.0),
        Point2::new(3.0, 3.0),
        Point2::new(2.0, 3.0),
    ];

    let remaining = subtract_openings(&floor, &[column]);
    assert_eq!(remaining.len(), 1);
    let region = &remaining[0];
    assert!((region.area() - 23.0).abs() < 1e-6);

    let blocks = pave(&Pattern::grid(1.0, 1.0, 0.0), region).unwrap();
    let paved: f64 = blocks
        .iter()
        .map(|b| deco_cad_geometry::bool2d::compute_signed_area(&b.path).abs())
        .sum();
    assert!(
        (paved - region.area()).abs() < 1e-6,
        "paved {paved} != region {}",
        region.area()
    );

    // Blocks near the opening were clipped.
    assert!(blocks.iter().any(|b| !b.is_unbroken));
}

#[test]
fn arc_profile_extrudes_and_meshes() {
    // Slab with a rounded crown: three straight sides, one half circle.
    let mut model = TopologyModel::new();
    let base = model
        .add_edge(
            "base",
            Curve::line(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)),
        )
        .unwrap();
    let right = model
        .add_edge(
            "right",
            Curve::line(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)),
        )
        .unwrap();
    let crown = model
        .add_edge(
            "crown",
            Curve::arc(
                Point2::new(1.0, 1.0),
                Point2::new(-1.0, 1.0),
                Point2::new(0.0, 1.0),
                true,
            ),
        )
        .unwrap();
    let left = model
        .add_edge(
            "left",
            Curve::line(Point2::new(-1.0, 1.0), Point2::new(-1.0, 0.0)),
        )
        .unwrap();
    let coedges = [
        model.forward_coedge(base).unwrap(),
        model.forward_coedge(right).unwrap(),
        model.forward_coedge(crown).unwrap(),
        model.forward_coedge(left).unwrap(),
    ];
    let wire = model.add_wire(&coedges).unwrap();

    let ex = extrude_wire(&model, wire, Vector3::z(), 0.0, 0.4).unwrap();
    assert_eq!(ex.segments.len(), 4);
    // The half circle discretizes within the clamp window.
    let chords = ex.segments[2].path.len() / 2 - 1;
    assert!((48..=72).contains(&chords), "got {chords}");
    assert_eq!(ex.path.len(), 2 * ex.flat_path.len());

    let mesh = deco_cad_geometry::extrusion_to_mesh(&ex);
    assert!(!mesh.is_empty());
    let (min, max) = mesh.bounds();
    // Arc apex at y = 2, base at y = 0.
    assert!((max.y - 2.0).abs() < 1e-3 && min.y.abs() < 1e-6);
}
