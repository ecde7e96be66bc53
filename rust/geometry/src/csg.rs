// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BSP-tree CSG for solid booleans, based on the csg.js algorithm by
//! Evan Wallace.
//!
//! Solids are boundary polygon soups. A [`BspNode`] partitions space by
//! the planes of its polygons; clipping one solid's polygons against the
//! other's tree removes the parts inside, and inverting a tree swaps
//! inside and outside. Union, subtraction and intersection are all
//! compositions of `clip_to` and `invert`.
//!
//! The same machinery doubles as a region clipper for the paving engine:
//! the vertical boundary walls of a planar region form a prism whose
//! inverted tree retains exactly the polygon fragments inside the region.

use crate::triangulation::triangulate_polygon;
use nalgebra::{Point2, Point3, Vector3};

/// Planarity tolerance for point classification.
pub const PLANE_EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// An oriented plane, `normal · p == w`.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    /// Plane through three points in counter-clockwise order.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(PLANE_EPSILON)?;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Signed distance of a point; positive is in front.
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }

    /// Split `polygon` by this plane into the four output buckets.
    ///
    /// Coplanar polygons go to `coplanar_front` or `coplanar_back` by
    /// facing; spanning polygons are cut, with intersection vertices
    /// interpolated on the crossing edges.
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = 0u8;
        let mut types = smallvec::SmallVec::<[u8; 8]>::new();

        for v in &polygon.vertices {
            let t = self.distance(v);
            let ty = if t < -PLANE_EPSILON {
                BACK
            } else if t > PLANE_EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            types.push(ty);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut f: Vec<Point3<f64>> = Vec::with_capacity(n + 1);
                let mut b: Vec<Point3<f64>> = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                // Fragments stay on the parent plane; recomputing it from
                // sliver vertices would be unstable.
                if f.len() >= 3 {
                    front.push(Polygon::with_plane(f, polygon.plane));
                }
                if b.len() >= 3 {
                    back.push(Polygon::with_plane(b, polygon.plane));
                }
            }
        }
    }
}

/// A convex boundary polygon with its supporting plane.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
}

impl Polygon {
    /// Build a polygon, deriving its plane from the first non-degenerate
    /// vertex triple. Returns `None` for degenerate input.
    pub fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let a = vertices[0];
        let plane = (1..vertices.len() - 1)
            .find_map(|i| Plane::from_points(&a, &vertices[i], &vertices[i + 1]))?;
        Some(Self { vertices, plane })
    }

    /// Build a polygon on a known plane (used for split fragments).
    pub fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    /// Reverse winding and flip the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Polygon area (fan decomposition from the first vertex).
    pub fn area(&self) -> f64 {
        let a = self.vertices[0];
        self.vertices
            .windows(2)
            .skip(1)
            .map(|w| (w[0] - a).cross(&(w[1] - a)).norm())
            .sum::<f64>()
            * 0.5
    }

    /// Vertex centroid.
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }
}

/// A node in a BSP tree built from boundary polygons.
#[derive(Debug, Clone, Default)]
pub struct BspNode {
    plane: Option<Plane>,
    polygons: Vec<Polygon>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
}

impl BspNode {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Insert polygons, partitioning by the first polygon's plane at each
    /// node. Coplanar polygons are stored on the node itself.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        if self.plane.is_none() {
            self.plane = Some(polygons[0].plane);
        }
        let plane = self.plane.unwrap();

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let mut coplanar_back = Vec::new();
            plane.split_polygon(
                polygon,
                &mut self.polygons,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
            self.polygons.append(&mut coplanar_back);
        }
        if !front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back);
        }
    }

    /// Swap solid and empty space: flip every polygon and plane, swap
    /// subtrees.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
        }

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            // No back subtree: that half-space is solid interior.
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Remove all polygons in this tree that are inside `other`'s solid.
    pub fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Collect every polygon in the tree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }
}

/// A solid represented by its boundary polygons.
#[derive(Debug, Clone, Default)]
pub struct Csg {
    pub polygons: Vec<Polygon>,
}

impl Csg {
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Build a solid from raw polygon point rings, dropping degenerate
    /// rings.
    pub fn from_polygon_points(rings: &[Vec<Point3<f64>>]) -> Self {
        Self {
            polygons: rings
                .iter()
                .filter_map(|r| Polygon::new(r.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Flip every polygon, turning the solid inside out.
    pub fn inverse(&self) -> Csg {
        let mut polygons = self.polygons.clone();
        for p in &mut polygons {
            p.flip();
        }
        Csg { polygons }
    }

    pub fn union(&self, other: &Csg) -> Csg {
        let mut a = BspNode::new(self.polygons.clone());
        let mut b = BspNode::new(other.polygons.clone());
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.all_polygons());
        Csg::from_polygons(a.all_polygons())
    }

    /// `self - other`, realized as `invert(union(invert(self), other))`.
    pub fn subtract(&self, other: &Csg) -> Csg {
        let mut a = BspNode::new(self.polygons.clone());
        let mut b = BspNode::new(other.polygons.clone());
        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.all_polygons());
        a.invert();
        Csg::from_polygons(a.all_polygons())
    }

    pub fn intersect(&self, other: &Csg) -> Csg {
        let mut a = BspNode::new(self.polygons.clone());
        let mut b = BspNode::new(other.polygons.clone());
        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(b.all_polygons());
        a.invert();
        Csg::from_polygons(a.all_polygons())
    }
}

/// Boundary polygons of a prism: `ring` (counter-clockwise) swept from
/// `z0` to `z1`. Caps are triangulated so every polygon is convex.
pub fn prism(ring: &[Point2<f64>], z0: f64, z1: f64) -> Vec<Polygon> {
    let n = ring.len();
    if n < 3 || (z1 - z0).abs() < PLANE_EPSILON {
        return Vec::new();
    }
    let (lo, hi) = if z0 < z1 { (z0, z1) } else { (z1, z0) };
    let at = |p: &Point2<f64>, z: f64| Point3::new(p.x, p.y, z);

    let mut polygons = Vec::with_capacity(n + 2 * (n - 2));
    for i in 0..n {
        let j = (i + 1) % n;
        polygons.extend(Polygon::new(vec![
            at(&ring[i], lo),
            at(&ring[j], lo),
            at(&ring[j], hi),
            at(&ring[i], hi),
        ]));
    }
    for tri in triangulate_polygon(ring).chunks_exact(3) {
        // Bottom cap faces down, top cap faces up.
        polygons.extend(Polygon::new(vec![
            at(&ring[tri[0]], lo),
            at(&ring[tri[2]], lo),
            at(&ring[tri[1]], lo),
        ]));
        polygons.extend(Polygon::new(vec![
            at(&ring[tri[0]], hi),
            at(&ring[tri[1]], hi),
            at(&ring[tri[2]], hi),
        ]));
    }
    polygons
}

/// Build a clipper tree for a planar region from its boundary walls.
///
/// `outer` must be counter-clockwise and `holes` clockwise; the walls of
/// the resulting prism then face out of the region material. The returned
/// tree is inverted, so [`BspNode::clip_polygons`] keeps exactly the
/// fragments inside the region.
pub fn region_clipper(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> BspNode {
    const HALF_HEIGHT: f64 = 1.0;
    let mut walls = Vec::new();
    let mut add_ring = |ring: &[Point2<f64>]| {
        let n = ring.len();
        for i in 0..n {
            let j = (i + 1) % n;
            walls.extend(Polygon::new(vec![
                Point3::new(ring[i].x, ring[i].y, -HALF_HEIGHT),
                Point3::new(ring[j].x, ring[j].y, -HALF_HEIGHT),
                Point3::new(ring[j].x, ring[j].y, HALF_HEIGHT),
                Point3::new(ring[i].x, ring[i].y, HALF_HEIGHT),
            ]));
        }
    };
    add_ring(outer);
    for hole in holes {
        add_ring(hole);
    }
    let mut tree = BspNode::new(walls);
    tree.invert();
    tree
}

/// Triangulate boundary polygons into a render mesh, one fan per polygon.
pub fn polygons_to_mesh(polygons: &[Polygon]) -> crate::Mesh {
    let vertex_count: usize = polygons.iter().map(|p| p.vertices.len()).sum();
    let mut mesh = crate::Mesh::with_capacity(vertex_count, vertex_count * 3);
    for polygon in polygons {
        let base = mesh.vertex_count() as u32;
        for v in &polygon.vertices {
            mesh.add_vertex(*v, polygon.plane.normal);
        }
        for i in 1..polygon.vertices.len() as u32 - 1 {
            mesh.add_triangle(base, base + i, base + i + 1);
        }
    }
    mesh
}
