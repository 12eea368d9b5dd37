//! Collision response policies
//!
//! A response policy decides what happens to a mover's goal once a contact
//! is found: stop, pass through, slide along the surface, or bounce off
//! it. Policies are looked up by name through the world's registry, so
//! callers can register their own beyond the four built-ins.
//!
//! Policies are side-effect free: they never touch the world or the body.
//! Each returns a `Resolution` carrying the proposed goal, the origin rect
//! the re-projection was computed from, and the re-projected collision
//! list. Only the top-level `move_body` commits anything.

use glam::Vec2;

use crate::body::BodyKey;
use crate::collision::Collision;
use crate::geom::Rect;
use crate::world::World;

/// Outcome of applying one response to one contact.
#[derive(Debug)]
pub struct Resolution {
    /// The (possibly altered) goal the resolution continues toward.
    pub goal: Vec2,
    /// The rect further collisions were projected from.
    pub origin: Rect,
    /// Collisions still ahead of the mover after this response.
    pub collisions: Vec<Collision>,
}

/// A named rule governing how a mover's trajectory changes on contact.
pub trait ResponsePolicy: Send + Sync {
    fn apply(
        &self,
        world: &World,
        collision: &Collision,
        mover: BodyKey,
        origin: Rect,
        goal: Vec2,
    ) -> Resolution;
}

/// Stop exactly at the touch point and end resolution there.
pub struct Touch;

impl ResponsePolicy for Touch {
    fn apply(
        &self,
        _world: &World,
        collision: &Collision,
        _mover: BodyKey,
        origin: Rect,
        _goal: Vec2,
    ) -> Resolution {
        Resolution {
            goal: collision.touch,
            origin,
            collisions: Vec::new(),
        }
    }
}

/// Ignore the obstacle: keep the goal, but re-project so contacts with
/// other bodies further along are still found and reported.
pub struct Cross;

impl ResponsePolicy for Cross {
    fn apply(
        &self,
        world: &World,
        _collision: &Collision,
        mover: BodyKey,
        origin: Rect,
        goal: Vec2,
    ) -> Resolution {
        let collisions = world.project(mover, origin, goal);
        Resolution {
            goal,
            origin,
            collisions,
        }
    }
}

/// Stop on the blocked axis, keep the goal on the free axis.
pub struct Slide;

impl ResponsePolicy for Slide {
    fn apply(
        &self,
        world: &World,
        collision: &Collision,
        mover: BodyKey,
        origin: Rect,
        goal: Vec2,
    ) -> Resolution {
        let mut slid = collision.touch;
        if collision.movement != Vec2::ZERO {
            if collision.normal.x == 0.0 {
                slid.x = goal.x;
            } else {
                slid.y = goal.y;
            }
        }
        let origin = origin.at(collision.touch);
        let collisions = world.project(mover, origin, slid);
        Resolution {
            goal: slid,
            origin,
            collisions,
        }
    }
}

/// Reflect the remaining displacement across the contact normal.
pub struct Bounce;

impl ResponsePolicy for Bounce {
    fn apply(
        &self,
        world: &World,
        collision: &Collision,
        mover: BodyKey,
        origin: Rect,
        goal: Vec2,
    ) -> Resolution {
        let touch = collision.touch;
        let mut bounced = touch;
        if collision.movement != Vec2::ZERO {
            let mut rest = goal - touch;
            if collision.normal.x == 0.0 {
                rest.y = -rest.y;
            } else {
                rest.x = -rest.x;
            }
            bounced = touch + rest;
        }
        let origin = origin.at(touch);
        let collisions = world.project(mover, origin, bounced);
        Resolution {
            goal: bounced,
            origin,
            collisions,
        }
    }
}
