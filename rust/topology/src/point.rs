// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile points: planar sketch vertices with optional arc metadata.
//!
//! A profile is an ordered list of [`ProfilePoint`]s. A point that begins
//! an arc side carries [`ArcMeta`] describing the segment from this point
//! to the next one in the profile.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Arc metadata attached to the point that starts an arc side.
///
/// `clockwise` is the winding of the arc as seen in the sketch plane
/// (Y up). The arc runs from the carrying point to the next profile
/// point around `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcMeta {
    /// Arc center in sketch coordinates.
    pub center: [f64; 2],
    /// Winding direction of the arc.
    pub clockwise: bool,
}

/// A planar sketch vertex, optionally starting an arc side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub x: f64,
    pub y: f64,
    /// Present when the side leaving this point is an arc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<ArcMeta>,
}

impl ProfilePoint {
    /// Create a straight-side point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, arc: None }
    }

    /// Create a point that starts an arc side around `center`.
    pub fn with_arc(x: f64, y: f64, center: [f64; 2], clockwise: bool) -> Self {
        Self {
            x,
            y,
            arc: Some(ArcMeta { center, clockwise }),
        }
    }

    /// Position as a nalgebra point.
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Arc center, if this point starts an arc side.
    pub fn center(&self) -> Option<Point2<f64>> {
        self.arc.map(|a| Point2::new(a.center[0], a.center[1]))
    }

    /// Arc radius, if this point starts an arc side.
    pub fn radius(&self) -> Option<f64> {
        self.center().map(|c| (c - self.point()).norm())
    }
}

impl From<Point2<f64>> for ProfilePoint {
    fn from(p: Point2<f64>) -> Self {
        Self::new(p.x, p.y)
    }
}
