// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Deco-CAD Topology
//!
//! Edge/coedge/wire topology model for parametric sketch profiles.
//!
//! This crate provides an arena-based topology structure where entities
//! (edges, coedges, wires, faces) are stored in slot maps. Every edge owns
//! a forward and a backward coedge; wires chain coedges into closed
//! boundaries; faces pair an outer wire with hole wires and carry material
//! bindings.
//!
//! Edges have persistent string ids and tag sets from which a stable
//! *topology name* is derived. Names survive model rebuilds, so downstream
//! state (materials, selections) can reattach to regenerated geometry.

pub mod curve;
pub mod error;
pub mod keys;
pub mod model;
pub mod point;

pub use curve::{CircleArc, Curve, Line, Loop, POINT_TOLERANCE};
pub use error::{Error, Result};
pub use keys::{CoedgeKey, EdgeKey, FaceKey, WireKey};
pub use model::{decode_topo_name, CoedgeData, EdgeData, FaceData, TopologyModel, WireData};
pub use point::{ArcMeta, ProfilePoint};
