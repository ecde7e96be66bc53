// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based sketch topology model.
//!
//! Entities live in `SlotMap` arenas and reference each other through
//! typed keys. Every edge owns exactly two coedges (forward and reversed);
//! wires chain coedges into closed boundaries; faces pair an outer wire
//! with hole wires and carry material bindings keyed by slot name.
//!
//! Edges carry a persistent string id and a tag set. The derived
//! *topology name* (`"{id}_{tags}"`) survives rebuilds of the model, which
//! is what lets material assignments reattach to regenerated geometry.

use crate::curve::{Curve, Loop, POINT_TOLERANCE};
use crate::error::{Error, Result};
use crate::keys::{CoedgeKey, EdgeKey, FaceKey, WireKey};
use nalgebra::Point2;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use std::collections::BTreeSet;

/// Placeholder used in topology names when an edge has no tags.
const NO_TAGS: &str = "null";

/// Prefix marking auxiliary edges whose names must never resolve.
const BACKGROUND_PREFIX: &str = "background";

/// An edge: a curve with a persistent id and a set of tags.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub id: String,
    pub curve: Curve,
    /// Sorted so derived names are deterministic.
    pub tags: BTreeSet<String>,
    pub forward: CoedgeKey,
    pub backward: CoedgeKey,
}

/// One directed use of an edge.
#[derive(Debug, Clone, Copy)]
pub struct CoedgeData {
    pub edge: EdgeKey,
    pub reversed: bool,
    pub wire: Option<WireKey>,
}

/// A closed chain of coedges.
#[derive(Debug, Clone, Default)]
pub struct WireData {
    pub coedges: Vec<CoedgeKey>,
}

/// A region bounded by an outer wire and zero or more hole wires.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer: WireKey,
    pub holes: Vec<WireKey>,
    /// Material ids keyed by slot name ("top", "side", ...).
    pub materials: FxHashMap<String, String>,
}

/// The sketch topology arena.
#[derive(Debug, Default)]
pub struct TopologyModel {
    edges: SlotMap<EdgeKey, EdgeData>,
    coedges: SlotMap<CoedgeKey, CoedgeData>,
    wires: SlotMap<WireKey, WireData>,
    faces: SlotMap<FaceKey, FaceData>,
    /// Persistent-id index for name resolution.
    edge_ids: FxHashMap<String, EdgeKey>,
}

impl TopologyModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- edges ----------------------------------------------------------

    /// Add an edge, creating its forward and backward coedges.
    ///
    /// The persistent id must be unique within the model; a duplicate
    /// would break name resolution for the surviving edge.
    pub fn add_edge(&mut self, id: impl Into<String>, curve: Curve) -> Result<EdgeKey> {
        let id = id.into();
        if self.edge_ids.contains_key(&id) {
            return Err(Error::DuplicateEdgeId(id));
        }
        let forward = self.coedges.insert(CoedgeData {
            edge: EdgeKey::default(),
            reversed: false,
            wire: None,
        });
        let backward = self.coedges.insert(CoedgeData {
            edge: EdgeKey::default(),
            reversed: true,
            wire: None,
        });
        let edge = self.edges.insert(EdgeData {
            id: id.clone(),
            curve,
            tags: BTreeSet::new(),
            forward,
            backward,
        });
        self.coedges[forward].edge = edge;
        self.coedges[backward].edge = edge;
        self.edge_ids.insert(id, edge);
        Ok(edge)
    }

    /// Remove an edge and both coedges. Fails while either coedge is
    /// still referenced by a wire.
    pub fn remove_edge(&mut self, key: EdgeKey) -> Result<()> {
        let data = self.edges.get(key).ok_or(Error::EdgeNotFound(key))?;
        for ck in [data.forward, data.backward] {
            if self.coedges[ck].wire.is_some() {
                return Err(Error::CoedgeInUse);
            }
        }
        let data = self.edges.remove(key).ok_or(Error::EdgeNotFound(key))?;
        self.coedges.remove(data.forward);
        self.coedges.remove(data.backward);
        self.edge_ids.remove(&data.id);
        Ok(())
    }

    pub fn edge(&self, key: EdgeKey) -> Result<&EdgeData> {
        self.edges.get(key).ok_or(Error::EdgeNotFound(key))
    }

    pub fn edge_mut(&mut self, key: EdgeKey) -> Result<&mut EdgeData> {
        self.edges.get_mut(key).ok_or(Error::EdgeNotFound(key))
    }

    /// Look up an edge by its persistent id.
    pub fn edge_by_id(&self, id: &str) -> Option<EdgeKey> {
        self.edge_ids.get(id).copied()
    }

    /// Attach a tag. Tags may not contain the name separators `_` and
    /// `:`, which would corrupt derived topology names.
    pub fn add_tag(&mut self, key: EdgeKey, tag: impl Into<String>) -> Result<()> {
        let tag = tag.into();
        if tag.contains('_') || tag.contains(':') {
            return Err(Error::InvalidTag(tag));
        }
        self.edge_mut(key)?.tags.insert(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, key: EdgeKey, tag: &str) -> Result<bool> {
        Ok(self.edge_mut(key)?.tags.remove(tag))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.keys()
    }

    // ---- coedges --------------------------------------------------------

    pub fn coedge(&self, key: CoedgeKey) -> Result<&CoedgeData> {
        self.coedges.get(key).ok_or(Error::CoedgeNotFound(key))
    }

    pub fn forward_coedge(&self, edge: EdgeKey) -> Result<CoedgeKey> {
        Ok(self.edge(edge)?.forward)
    }

    pub fn backward_coedge(&self, edge: EdgeKey) -> Result<CoedgeKey> {
        Ok(self.edge(edge)?.backward)
    }

    /// The other coedge of the same edge.
    pub fn partner(&self, key: CoedgeKey) -> Result<CoedgeKey> {
        let co = self.coedge(key)?;
        let edge = self.edge(co.edge)?;
        Ok(if key == edge.forward {
            edge.backward
        } else {
            edge.forward
        })
    }

    /// The edge curve oriented the way this coedge traverses it.
    pub fn coedge_curve(&self, key: CoedgeKey) -> Result<Curve> {
        let co = self.coedge(key)?;
        let curve = self.edge(co.edge)?.curve;
        Ok(if co.reversed { curve.reversed() } else { curve })
    }

    pub fn coedge_start(&self, key: CoedgeKey) -> Result<Point2<f64>> {
        Ok(self.coedge_curve(key)?.start())
    }

    pub fn coedge_end(&self, key: CoedgeKey) -> Result<Point2<f64>> {
        Ok(self.coedge_curve(key)?.end())
    }

    // ---- naming ---------------------------------------------------------

    /// Derived topology name: `"{id}_{tag:tag:...}"` over the edge's
    /// non-"background" tags, or `"{id}_null"` when none remain. Tags
    /// are sorted, so the name is stable across rebuilds as long as id
    /// and tag set survive. The reserved "background" tag never shows
    /// up in names, keeping background edges out of name resolution.
    pub fn topo_name(&self, key: EdgeKey) -> Result<String> {
        let edge = self.edge(key)?;
        let tags: Vec<&str> = edge
            .tags
            .iter()
            .map(String::as_str)
            .filter(|t| *t != BACKGROUND_PREFIX)
            .collect();
        if tags.is_empty() {
            Ok(format!("{}_{}", edge.id, NO_TAGS))
        } else {
            Ok(format!("{}_{}", edge.id, tags.join(":")))
        }
    }

    /// Derived coedge name: the edge name plus an orientation suffix.
    pub fn coedge_name(&self, key: CoedgeKey) -> Result<String> {
        let co = self.coedge(key)?;
        let base = self.topo_name(co.edge)?;
        Ok(format!("{}|{}", base, if co.reversed { "rev" } else { "fwd" }))
    }

    /// Resolve a topology name back to a live edge, if any.
    pub fn resolve_topo_name(&self, name: &str) -> Option<EdgeKey> {
        let (id, _) = decode_topo_name(name)?;
        self.edge_by_id(id)
    }

    // ---- wires ----------------------------------------------------------

    /// Chain coedges into a closed wire.
    ///
    /// Each coedge must be unused and end where the next one starts
    /// (cyclically) within [`POINT_TOLERANCE`].
    pub fn add_wire(&mut self, coedges: &[CoedgeKey]) -> Result<WireKey> {
        if coedges.is_empty() {
            return Err(Error::EmptyWire);
        }
        for (i, &ck) in coedges.iter().enumerate() {
            if self.coedge(ck)?.wire.is_some() {
                return Err(Error::CoedgeInUse);
            }
            let next = coedges[(i + 1) % coedges.len()];
            let end = self.coedge_end(ck)?;
            let start = self.coedge_start(next)?;
            if (start - end).norm() > POINT_TOLERANCE {
                return Err(Error::DisconnectedWire(i, (i + 1) % coedges.len()));
            }
        }
        let wire = self.wires.insert(WireData {
            coedges: coedges.to_vec(),
        });
        for &ck in coedges {
            self.coedges[ck].wire = Some(wire);
        }
        Ok(wire)
    }

    pub fn wire(&self, key: WireKey) -> Result<&WireData> {
        self.wires.get(key).ok_or(Error::WireNotFound(key))
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Convert a wire to its mathematical loop: each coedge contributes
    /// the edge curve in traversal orientation.
    pub fn wire_loop(&self, key: WireKey) -> Result<Loop> {
        let wire = self.wire(key)?;
        let mut curves = Vec::with_capacity(wire.coedges.len());
        for &ck in &wire.coedges {
            curves.push(self.coedge_curve(ck)?);
        }
        Ok(Loop::new(curves))
    }

    /// Oriented wire curves minus suppressed edges.
    ///
    /// Used when rebuilding a sketch: edges consumed by a later operation
    /// are excluded so the builder only sees the surviving boundary.
    pub fn wire_builder_curves(
        &self,
        key: WireKey,
        exclude: &FxHashSet<EdgeKey>,
    ) -> Result<Vec<Curve>> {
        let wire = self.wire(key)?;
        let mut curves = Vec::with_capacity(wire.coedges.len());
        for &ck in &wire.coedges {
            let co = self.coedge(ck)?;
            if exclude.contains(&co.edge) {
                continue;
            }
            curves.push(self.coedge_curve(ck)?);
        }
        Ok(curves)
    }

    // ---- faces ----------------------------------------------------------

    pub fn add_face(&mut self, outer: WireKey, holes: Vec<WireKey>) -> Result<FaceKey> {
        self.wire(outer)?;
        for &h in &holes {
            self.wire(h)?;
        }
        Ok(self.faces.insert(FaceData {
            outer,
            holes,
            materials: FxHashMap::default(),
        }))
    }

    pub fn face(&self, key: FaceKey) -> Result<&FaceData> {
        self.faces.get(key).ok_or(Error::FaceNotFound(key))
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Bind a material id to a face slot ("top", "side", ...).
    pub fn set_face_material(
        &mut self,
        key: FaceKey,
        slot: impl Into<String>,
        material: impl Into<String>,
    ) -> Result<()> {
        let face = self.faces.get_mut(key).ok_or(Error::FaceNotFound(key))?;
        face.materials.insert(slot.into(), material.into());
        Ok(())
    }

    pub fn face_material(&self, key: FaceKey, slot: &str) -> Result<Option<&str>> {
        Ok(self.face(key)?.materials.get(slot).map(String::as_str))
    }
}

/// Decode a topology name into `(id, tags)`.
///
/// Returns `None` for names of background edges, which by convention
/// never resolve to user-visible topology, and for names without the
/// `_` separator. A `"null"` tag block decodes to an empty tag list.
/// Tags must not contain `_`; the id may.
pub fn decode_topo_name(name: &str) -> Option<(&str, Vec<&str>)> {
    if name.starts_with(BACKGROUND_PREFIX) {
        return None;
    }
    let (id, tag_block) = name.rsplit_once('_')?;
    if id.is_empty() {
        return None;
    }
    let tags = if tag_block == NO_TAGS {
        Vec::new()
    } else {
        tag_block.split(':').collect()
    };
    Some((id, tags))
}
