//! Per-pair swept collision test
//!
//! The heart of the broad phase: given a mover, an obstacle and a goal
//! position, decide if and when the two first touch during the linear
//! sweep, and the axis-aligned normal of the contact.
//!
//! The test works on the Minkowski difference of the two rects, which
//! turns the rect-vs-rect sweep into casting a ray from the origin through
//! a single rect. Three regimes fall out:
//! - already overlapping, not moving: resolve by minimum displacement
//! - already overlapping, moving: clip the motion ray backwards to find
//!   the shortest way out along the path
//! - separated: Liang-Barsky entry fraction along the displacement

use std::cmp::Ordering;

use glam::Vec2;

use crate::body::BodyKey;
use crate::consts::DELTA;
use crate::geom::{Rect, axis_sign};

/// One detected contact during a single `move` resolution.
#[derive(Debug, Clone)]
pub struct Collision {
    /// The obstacle hit.
    pub other: BodyKey,
    /// Name of the response policy the mover resolves this contact with.
    pub response: String,
    /// Time of impact in `[0, 1]` along the displacement, or a negative
    /// overlap area when the bodies were already overlapping at rest.
    /// Negative values sort before every in-flight contact; they are a
    /// tie-break magnitude, not a time.
    pub fraction: f32,
    /// Squared center distance between mover and obstacle; secondary sort
    /// key for simultaneous contacts.
    pub distance: f32,
    /// The displacement the mover attempted.
    pub movement: Vec2,
    /// Axis-aligned contact normal: one of (±1,0), (0,±1) or (0,0).
    pub normal: Vec2,
    /// Position the mover must occupy to just touch the obstacle.
    pub touch: Vec2,
}

/// Raw result of `sweep_collide`, before response lookup.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub fraction: f32,
    pub normal: Vec2,
    pub touch: Vec2,
    /// Whether the rects were already overlapping before the move.
    pub overlaps: bool,
}

/// Sweep `mover` from its position toward `goal` and test against `other`.
///
/// Returns `None` when the sweep never touches `other`. The touch point is
/// nudged `DELTA` along the normal so the next frame does not start
/// re-penetrated by rounding error.
pub fn sweep_collide(mover: &Rect, other: &Rect, goal: Vec2) -> Option<Hit> {
    let d = goal - mover.pos();
    let diff = mover.minkowski_diff(other);

    if diff.contains_point(Vec2::ZERO) {
        let corner = diff.nearest_corner(Vec2::ZERO);
        // negative area of the overlap region, used purely for ordering
        let fraction = -mover.w.min(corner.x.abs()) * mover.h.min(corner.y.abs());

        if d == Vec2::ZERO {
            // overlapping at rest: push out along the shorter axis
            let mut push = corner;
            if push.x.abs() < push.y.abs() {
                push.y = 0.0;
            } else {
                push.x = 0.0;
            }
            let normal = Vec2::new(axis_sign(push.x), axis_sign(push.y));
            return Some(Hit {
                fraction,
                normal,
                touch: mover.pos() + push + normal * DELTA,
                overlaps: true,
            });
        }

        // overlapping and moving: back out along the motion ray
        let clip = diff.clip_segment(Vec2::ZERO, d, f32::NEG_INFINITY, 1.0)?;
        return Some(Hit {
            fraction,
            normal: clip.normal_in,
            touch: mover.pos() + d * clip.t_in + clip.normal_in * DELTA,
            overlaps: true,
        });
    }

    // separated: first crossing of the displacement ray into the difference
    let clip = diff.clip_segment(Vec2::ZERO, d, f32::NEG_INFINITY, f32::INFINITY)?;
    if clip.t_in < 1.0 && clip.t_in > -DELTA && clip.t_out > 0.0 {
        return Some(Hit {
            fraction: clip.t_in,
            normal: clip.normal_in,
            touch: mover.pos() + d * clip.t_in + clip.normal_in * DELTA,
            overlaps: false,
        });
    }

    None
}

/// Stable ordering: earliest fraction first (resting overlaps are negative
/// and so come before any in-flight hit), nearest center second. Stability
/// makes fully symmetric configurations resolve in discovery order.
pub(crate) fn sort_collisions(collisions: &mut [Collision]) {
    collisions.sort_by(|a, b| {
        match a.fraction.partial_cmp(&b.fraction) {
            Some(Ordering::Equal) | None => {
                a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
            }
            Some(order) => order,
        }
    });
}
