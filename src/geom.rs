//! Axis-aligned rectangle geometry
//!
//! Everything the broad phase needs from plane geometry lives here:
//! - `Rect`: the one collision shape (position + size, no rotation)
//! - Minkowski difference, reducing rect-vs-rect sweeps to point-vs-rect
//! - generalized Liang-Barsky segment clipping with side normals

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DELTA;

/// An axis-aligned rectangle: top-left corner plus extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Result of clipping a parametric segment against a rect.
///
/// Normals are only meaningful for the sides the segment actually crossed;
/// a fraction left at its initial value keeps a zero normal.
#[derive(Debug, Clone, Copy)]
pub struct SegmentClip {
    /// Entry fraction along the segment.
    pub t_in: f32,
    /// Exit fraction along the segment.
    pub t_out: f32,
    /// Outward normal of the side crossed at `t_in`.
    pub normal_in: Vec2,
    /// Outward normal of the side crossed at `t_out`.
    pub normal_out: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner as a vector.
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Same extents, relocated to `pos`.
    #[inline]
    pub fn at(&self, pos: Vec2) -> Rect {
        Rect::new(pos.x, pos.y, self.w, self.h)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict containment: a point exactly on the boundary is NOT inside.
    ///
    /// The `DELTA` margin keeps bodies that rest flush against each other
    /// from registering as overlapping.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x - self.x > DELTA
            && p.y - self.y > DELTA
            && self.right() - p.x > DELTA
            && self.bottom() - p.y > DELTA
    }

    /// The corner of this rect nearest to `p`, per axis.
    ///
    /// Ties go to the right/bottom edge.
    pub fn nearest_corner(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            nearest(p.x, self.x, self.right()),
            nearest(p.y, self.y, self.bottom()),
        )
    }

    /// Minkowski difference `other - self`, treating `self` as the mover.
    ///
    /// The result contains the origin exactly when the two rects overlap,
    /// and sweeping `self` toward a goal becomes casting a ray from the
    /// origin through the difference rect.
    pub fn minkowski_diff(&self, other: &Rect) -> Rect {
        Rect::new(
            other.x - self.x - self.w,
            other.y - self.y - self.h,
            self.w + other.w,
            self.h + other.h,
        )
    }

    /// Squared distance between the two rect centers. Used as the
    /// deterministic tie-break when two collisions share a time of impact.
    pub fn center_distance_sq(&self, other: &Rect) -> f32 {
        self.center().distance_squared(other.center())
    }

    /// Generalized Liang-Barsky clip of the segment `p1 -> p2` against this
    /// rect, narrowing the incoming `[t_in, t_out]` range.
    ///
    /// Returns `None` when the segment (extended to the given range) misses
    /// the rect, including the degenerate axis-parallel case where the
    /// segment runs along or outside a side. Normals are only guaranteed
    /// accurate when called with the full `(-inf, inf)` range.
    pub fn clip_segment(
        &self,
        p1: Vec2,
        p2: Vec2,
        mut t_in: f32,
        mut t_out: f32,
    ) -> Option<SegmentClip> {
        let d = p2 - p1;
        let mut normal_in = Vec2::ZERO;
        let mut normal_out = Vec2::ZERO;

        let sides = [
            (Vec2::new(-1.0, 0.0), -d.x, p1.x - self.x),
            (Vec2::new(1.0, 0.0), d.x, self.right() - p1.x),
            (Vec2::new(0.0, -1.0), -d.y, p1.y - self.y),
            (Vec2::new(0.0, 1.0), d.y, self.bottom() - p1.y),
        ];

        for (normal, p, q) in sides {
            if p == 0.0 {
                // parallel to this side; outside (or flush against) it means no hit
                if q <= 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t_out {
                        return None;
                    }
                    if r > t_in {
                        t_in = r;
                        normal_in = normal;
                    }
                } else {
                    if r < t_in {
                        return None;
                    }
                    if r < t_out {
                        t_out = r;
                        normal_out = normal;
                    }
                }
            }
        }

        Some(SegmentClip {
            t_in,
            t_out,
            normal_in,
            normal_out,
        })
    }
}

#[inline]
fn nearest(x: f32, a: f32, b: f32) -> f32 {
    if (a - x).abs() < (b - x).abs() { a } else { b }
}

/// Axis sign with a true zero: `0.0` maps to `0.0`, not `1.0` as
/// `f32::signum` would have it.
#[inline]
pub(crate) fn axis_sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
