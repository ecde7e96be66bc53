//! Deco-CAD Geometry
//!
//! Extrusion, CSG and paving kernel for parametric interiors, built on
//! earcutr triangulation and nalgebra math.

pub mod bool2d;
pub mod csg;
pub mod error;
pub mod extrude;
pub mod front;
pub mod mesh;
pub mod pave;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bool2d::{subtract_openings, validate_divide, Region};
pub use csg::{polygons_to_mesh, prism, region_clipper, BspNode, Csg, Plane, Polygon};
pub use error::{Error, Result};
pub use extrude::{extrude, extrude_wire, extrusion_to_mesh, Extrusion, Segment};
pub use front::{AdvancingFront, FrontNode, NodeId};
pub use mesh::Mesh;
pub use pave::{pave, BlockOutline, Pattern, TileAnchor};
pub use triangulation::{mesh_region, triangulate_polygon, triangulate_polygon_with_holes};
