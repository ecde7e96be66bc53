// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advancing front for sweep-line meshing.
//!
//! The front is the upper boundary of the already-meshed area: a doubly
//! linked list of nodes ordered by x, bracketed by head and tail sentinels
//! placed outside the point range. Lookups start from the last visited
//! node, so the scans a sweep line performs are O(1) amortized; only the
//! sentinels make worst-case queries safe without bounds checks.
//!
//! Nodes live in a plain `Vec` arena; links are indices. Removed nodes are
//! unlinked but not reused, which is fine for the front's lifetime of a
//! single meshing pass.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Index of a node in the front arena.
pub type NodeId = usize;

/// A node on the advancing front.
#[derive(Debug, Clone)]
pub struct FrontNode {
    pub point: Point2<f64>,
    /// Triangle most recently attached below this node, if any.
    pub triangle: Option<usize>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// The x-sorted advancing front.
#[derive(Debug)]
pub struct AdvancingFront {
    nodes: Vec<FrontNode>,
    head: NodeId,
    tail: NodeId,
    /// Last node returned by a locate call; the next search starts here.
    search: NodeId,
}

impl AdvancingFront {
    /// Create a front spanning `[x_min, x_max]`, with sentinels placed
    /// one range-width (at least 1) outside either end.
    pub fn new(x_min: f64, x_max: f64, y: f64) -> Self {
        let margin = (x_max - x_min).abs().max(1.0);
        let head_node = FrontNode {
            point: Point2::new(x_min - margin, y),
            triangle: None,
            prev: None,
            next: Some(1),
        };
        let tail_node = FrontNode {
            point: Point2::new(x_max + margin, y),
            triangle: None,
            prev: Some(0),
            next: None,
        };
        Self {
            nodes: vec![head_node, tail_node],
            head: 0,
            tail: 1,
            search: 0,
        }
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn tail(&self) -> NodeId {
        self.tail
    }

    pub fn node(&self, id: NodeId) -> &FrontNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FrontNode {
        &mut self.nodes[id]
    }

    pub fn point(&self, id: NodeId) -> Point2<f64> {
        self.nodes[id].point
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next
    }

    /// Number of nodes between the sentinels.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.head].next == Some(self.tail)
    }

    /// Iterate interior nodes in x order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.nodes[self.head].next;
        std::iter::from_fn(move || {
            let id = cur?;
            if id == self.tail {
                return None;
            }
            cur = self.nodes[id].next;
            Some(id)
        })
    }

    /// Insert a point after `after`, returning the new node.
    ///
    /// The caller keeps the front x-sorted; this is checked in debug
    /// builds only.
    pub fn insert_after(&mut self, after: NodeId, point: Point2<f64>) -> NodeId {
        let next = self.nodes[after].next;
        debug_assert!(self.nodes[after].point.x <= point.x);
        debug_assert!(next.map_or(true, |n| point.x <= self.nodes[n].point.x));

        let id = self.nodes.len();
        self.nodes.push(FrontNode {
            point,
            triangle: None,
            prev: Some(after),
            next,
        });
        self.nodes[after].next = Some(id);
        if let Some(n) = next {
            self.nodes[n].prev = Some(id);
        }
        self.search = id;
        id
    }

    /// Locate the insertion spot for `point` and link a node there.
    pub fn insert(&mut self, point: Point2<f64>) -> NodeId {
        let after = self.locate_node(point.x);
        self.insert_after(after, point)
    }

    /// Unlink a node. Sentinels cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        debug_assert!(id != self.head && id != self.tail);
        let (prev, next) = (self.nodes[id].prev, self.nodes[id].next);
        if let Some(p) = prev {
            self.nodes[p].next = next;
        }
        if let Some(n) = next {
            self.nodes[n].prev = prev;
        }
        self.nodes[id].prev = None;
        self.nodes[id].next = None;
        if self.search == id {
            self.search = prev.unwrap_or(self.head);
        }
    }

    /// Greatest node whose x is `<= x`, starting from the cached search
    /// position. Queries outside the sentinel range clamp to head/tail.
    pub fn locate_node(&mut self, x: f64) -> NodeId {
        let mut cur = self.search;

        if x < self.nodes[cur].point.x {
            while let Some(prev) = self.nodes[cur].prev {
                cur = prev;
                if x >= self.nodes[cur].point.x {
                    break;
                }
            }
        } else {
            while let Some(next) = self.nodes[cur].next {
                if x < self.nodes[next].point.x {
                    break;
                }
                cur = next;
            }
        }

        self.search = cur;
        cur
    }

    /// Find the front node holding exactly this point.
    ///
    /// Matches by x first, then walks the equal-x run comparing y.
    pub fn locate_point(&mut self, point: &Point2<f64>) -> Result<NodeId> {
        const XTOL: f64 = 1e-12;
        let mut cur = self.locate_node(point.x);

        // Back up over nodes sharing the query x.
        while let Some(prev) = self.nodes[cur].prev {
            if (self.nodes[prev].point.x - point.x).abs() > XTOL {
                break;
            }
            cur = prev;
        }

        loop {
            if self.nodes[cur].point == *point {
                self.search = cur;
                return Ok(cur);
            }
            match self.nodes[cur].next {
                Some(next) if (self.nodes[next].point.x - point.x).abs() <= XTOL => cur = next,
                _ => return Err(Error::PointNotOnFront(point.x, point.y)),
            }
        }
    }
}
