// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar curve primitives: line segments, circular arcs, and closed loops.
//!
//! Curves are the geometric carriers behind topology edges. A [`Loop`] is
//! the purely mathematical form of a closed wire: an ordered chain of
//! curves where each curve ends where the next one starts.

use crate::point::ProfilePoint;
use nalgebra::Point2;
use std::f64::consts::{PI, TAU};

/// Positions closer than this are treated as coincident.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// A straight segment between two sketch points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
}

impl Line {
    pub fn new(from: Point2<f64>, to: Point2<f64>) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f64 {
        (self.to - self.from).norm()
    }

    pub fn midpoint(&self) -> Point2<f64> {
        nalgebra::center(&self.from, &self.to)
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from)
    }

    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.from + (self.to - self.from) * t
    }

    /// Split at an interior point, producing the two halves in order.
    pub fn split_at(&self, p: Point2<f64>) -> (Line, Line) {
        (Line::new(self.from, p), Line::new(p, self.to))
    }
}

/// A circular arc from `from` to `to` around `center`.
///
/// `ccw` selects which of the two candidate arcs is meant; together with
/// the endpoint order it fully determines the swept angle, so minor and
/// reflex arcs never get confused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleArc {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
    pub center: Point2<f64>,
    pub ccw: bool,
}

impl CircleArc {
    pub fn new(from: Point2<f64>, to: Point2<f64>, center: Point2<f64>, ccw: bool) -> Self {
        Self {
            from,
            to,
            center,
            ccw,
        }
    }

    pub fn radius(&self) -> f64 {
        (self.from - self.center).norm()
    }

    /// Angle of the start point around the center.
    pub fn start_angle(&self) -> f64 {
        let d = self.from - self.center;
        d.y.atan2(d.x)
    }

    /// Angle of the end point around the center.
    pub fn end_angle(&self) -> f64 {
        let d = self.to - self.center;
        d.y.atan2(d.x)
    }

    /// Swept angle in `(0, 2π]`, measured in the arc's own direction.
    pub fn sweep(&self) -> f64 {
        let delta = if self.ccw {
            self.end_angle() - self.start_angle()
        } else {
            self.start_angle() - self.end_angle()
        };
        let s = delta.rem_euclid(TAU);
        if s < POINT_TOLERANCE {
            TAU
        } else {
            s
        }
    }

    pub fn length(&self) -> f64 {
        self.radius() * self.sweep()
    }

    /// Whether this arc covers more than half the circle.
    pub fn is_reflex(&self) -> bool {
        self.sweep() > PI
    }

    /// Height of the arc above its chord.
    ///
    /// For a minor arc this is `r - d`, for a reflex arc `r + d`, where
    /// `d` is the distance from the center to the chord midpoint.
    pub fn sagitta(&self) -> f64 {
        let r = self.radius();
        let chord_mid = nalgebra::center(&self.from, &self.to);
        let d = (chord_mid - self.center).norm();
        if self.is_reflex() {
            r + d
        } else {
            r - d
        }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from, self.center, !self.ccw)
    }

    /// Point at parameter `t` in `[0, 1]` along the arc.
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        let angle = if self.ccw {
            self.start_angle() + self.sweep() * t
        } else {
            self.start_angle() - self.sweep() * t
        };
        let r = self.radius();
        Point2::new(
            self.center.x + r * angle.cos(),
            self.center.y + r * angle.sin(),
        )
    }

    /// Sample `n` segments, returning `n + 1` points including both ends.
    pub fn sample(&self, n: usize) -> Vec<Point2<f64>> {
        let n = n.max(1);
        (0..=n).map(|k| self.point_at(k as f64 / n as f64)).collect()
    }

    /// Split at an interior point on the arc, preserving direction.
    pub fn split_at(&self, p: Point2<f64>) -> (CircleArc, CircleArc) {
        (
            CircleArc::new(self.from, p, self.center, self.ccw),
            CircleArc::new(p, self.to, self.center, self.ccw),
        )
    }
}

/// A planar curve: either a line segment or a circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line(Line),
    Arc(CircleArc),
}

impl Curve {
    pub fn line(from: Point2<f64>, to: Point2<f64>) -> Self {
        Curve::Line(Line::new(from, to))
    }

    pub fn arc(from: Point2<f64>, to: Point2<f64>, center: Point2<f64>, ccw: bool) -> Self {
        Curve::Arc(CircleArc::new(from, to, center, ccw))
    }

    pub fn start(&self) -> Point2<f64> {
        match self {
            Curve::Line(l) => l.from,
            Curve::Arc(a) => a.from,
        }
    }

    pub fn end(&self) -> Point2<f64> {
        match self {
            Curve::Line(l) => l.to,
            Curve::Arc(a) => a.to,
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Curve::Line(l) => l.length(),
            Curve::Arc(a) => a.length(),
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Curve::Line(l) => Curve::Line(l.reversed()),
            Curve::Arc(a) => Curve::Arc(a.reversed()),
        }
    }

    pub fn point_at(&self, t: f64) -> Point2<f64> {
        match self {
            Curve::Line(l) => l.point_at(t),
            Curve::Arc(a) => a.point_at(t),
        }
    }

    pub fn split_at(&self, p: Point2<f64>) -> (Curve, Curve) {
        match self {
            Curve::Line(l) => {
                let (a, b) = l.split_at(p);
                (Curve::Line(a), Curve::Line(b))
            }
            Curve::Arc(arc) => {
                let (a, b) = arc.split_at(p);
                (Curve::Arc(a), Curve::Arc(b))
            }
        }
    }
}

/// A closed chain of curves, each ending where the next starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    pub curves: Vec<Curve>,
}

impl Loop {
    pub fn new(curves: Vec<Curve>) -> Self {
        Self { curves }
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Whether every curve meets the next within `tol`, cyclically.
    pub fn is_closed(&self, tol: f64) -> bool {
        if self.curves.is_empty() {
            return false;
        }
        self.curves.iter().enumerate().all(|(i, c)| {
            let next = &self.curves[(i + 1) % self.curves.len()];
            (next.start() - c.end()).norm() <= tol
        })
    }

    pub fn total_length(&self) -> f64 {
        self.curves.iter().map(|c| c.length()).sum()
    }

    /// Flatten into profile points, one per curve start.
    ///
    /// Arc starts carry arc metadata so the loop can be rebuilt; the
    /// discretization of arcs into chords is left to the consumer.
    pub fn to_profile(&self) -> Vec<ProfilePoint> {
        self.curves
            .iter()
            .map(|c| match c {
                Curve::Line(l) => ProfilePoint::new(l.from.x, l.from.y),
                Curve::Arc(a) => ProfilePoint::with_arc(
                    a.from.x,
                    a.from.y,
                    [a.center.x, a.center.y],
                    !a.ccw,
                ),
            })
            .collect()
    }

    /// Rebuild a loop from profile points produced by [`Loop::to_profile`].
    pub fn from_profile(points: &[ProfilePoint]) -> Self {
        let curves = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let next = &points[(i + 1) % points.len()];
                match p.arc {
                    Some(meta) => Curve::arc(
                        p.point(),
                        next.point(),
                        Point2::new(meta.center[0], meta.center[1]),
                        !meta.clockwise,
                    ),
                    None => Curve::line(p.point(), next.point()),
                }
            })
            .collect();
        Self { curves }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarter_arc() -> CircleArc {
        // Unit quarter circle from (1, 0) to (0, 1), counterclockwise.
        CircleArc::new(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
            true,
        )
    }

    #[test]
    fn test_line_length_and_midpoint() {
        let l = Line::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_relative_eq!(l.length(), 5.0);
        assert_relative_eq!(l.midpoint().x, 1.5);
        assert_relative_eq!(l.midpoint().y, 2.0);
    }

    #[test]
    fn test_quarter_arc_sweep_and_length() {
        let a = quarter_arc();
        assert_relative_eq!(a.sweep(), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(a.length(), PI / 2.0, epsilon = 1e-12);
        assert!(!a.is_reflex());
    }

    #[test]
    fn test_reversed_arc_keeps_sweep() {
        let a = quarter_arc();
        let r = a.reversed();
        assert!(!r.ccw);
        assert_relative_eq!(r.sweep(), a.sweep(), epsilon = 1e-12);
        assert_relative_eq!(r.point_at(0.0).x, a.point_at(1.0).x, epsilon = 1e-12);
    }

    #[test]
    fn test_reflex_arc_selected_by_direction() {
        // Same endpoints as the quarter arc but traversed clockwise: the
        // long way around, three quarters of the circle.
        let a = CircleArc::new(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
            false,
        );
        assert_relative_eq!(a.sweep(), 1.5 * PI, epsilon = 1e-12);
        assert!(a.is_reflex());
    }

    #[test]
    fn test_sagitta_minor_vs_reflex() {
        let minor = quarter_arc();
        let half_chord = (2.0f64).sqrt() / 2.0;
        let d = (1.0 - half_chord * half_chord).sqrt();
        assert_relative_eq!(minor.sagitta(), 1.0 - d, epsilon = 1e-12);

        let reflex = CircleArc::new(minor.from, minor.to, minor.center, false);
        assert_relative_eq!(reflex.sagitta(), 1.0 + d, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_sample_endpoints() {
        let a = quarter_arc();
        let pts = a.sample(8);
        assert_eq!(pts.len(), 9);
        assert_relative_eq!(pts[0].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(pts[8].y, 1.0, epsilon = 1e-12);
        for p in &pts {
            assert_relative_eq!((p - a.center).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_split_arc_preserves_direction_and_sweep() {
        let a = quarter_arc();
        let mid = a.point_at(0.5);
        let (first, second) = a.split_at(mid);
        assert!(first.ccw && second.ccw);
        assert_relative_eq!(first.sweep() + second.sweep(), a.sweep(), epsilon = 1e-9);
    }

    #[test]
    fn test_loop_closure() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        let closed = Loop::new(vec![Curve::line(a, b), Curve::line(b, c), Curve::line(c, a)]);
        assert!(closed.is_closed(POINT_TOLERANCE));

        let open = Loop::new(vec![Curve::line(a, b), Curve::line(b, c)]);
        assert!(!open.is_closed(POINT_TOLERANCE));
        assert!(!Loop::default().is_closed(POINT_TOLERANCE));
    }

    #[test]
    fn test_profile_round_trip_with_arc() {
        let lp = Loop::new(vec![
            Curve::line(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)),
            Curve::arc(
                Point2::new(1.0, 0.0),
                Point2::new(-1.0, 0.0),
                Point2::new(0.0, 0.0),
                true,
            ),
        ]);
        let profile = lp.to_profile();
        assert_eq!(profile.len(), 2);
        assert!(profile[0].arc.is_none());
        assert!(profile[1].arc.is_some());
        assert!(!profile[1].arc.unwrap().clockwise);

        let back = Loop::from_profile(&profile);
        assert_eq!(back, lp);
    }
}
