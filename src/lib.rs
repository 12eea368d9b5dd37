//! sweepgrid - swept-AABB broad-phase collision on a uniform spatial grid
//!
//! Tracks axis-aligned rectangular bodies in a lazily populated grid of
//! fixed-size cells, sweeps movers against every potentially overlapping
//! neighbor, and resolves contacts through pluggable response policies
//! (touch/cross/slide/bounce). Rect, point and segment queries cover
//! line-of-sight and trigger-volume logic.
//!
//! Core modules:
//! - `geom`: rectangles, Minkowski difference, Liang-Barsky clipping
//! - `collision`: per-pair swept test and contact ordering
//! - `response`: response policies and the `ResponsePolicy` trait
//! - `world`: the facade owning grid, bodies and the response registry
//! - `config`: construction-time tuning
//!
//! The world is single-threaded and synchronous: every call runs to
//! completion, and callers own its lifetime. Wrap it in a mutex if it must
//! cross threads.
//!
//! ```
//! use glam::Vec2;
//! use sweepgrid::World;
//!
//! let mut world = World::new(64.0);
//! let _wall = world.add_static("wall", 15.0, -100.0, 5.0, 200.0);
//! let player = world.add("player", 0.0, 0.0, 10.0, 10.0);
//!
//! // slides along the wall: x pinned at the wall face, y keeps going
//! let moved = world.move_body(player, Vec2::new(20.0, 20.0)).unwrap();
//! assert!(moved.position.x <= 5.0);
//! assert!((moved.position.y - 20.0).abs() < 1e-4);
//! assert_eq!(moved.collisions.len(), 1);
//! ```

mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod geom;
mod grid;
pub mod response;
pub mod world;

pub use body::BodyKey;
pub use collision::Collision;
pub use config::WorldConfig;
pub use error::WorldError;
pub use geom::Rect;
pub use response::{Resolution, ResponsePolicy};
pub use world::{Movement, World};

/// Engine constants.
pub mod consts {
    /// Floating-point margin of error: strict-containment slack and the
    /// size of the touch-point nudge along the contact normal.
    pub const DELTA: f32 = 1e-10;
    /// Grid cell side length used by [`crate::WorldConfig::default`].
    pub const DEFAULT_CELL_SIZE: f32 = 64.0;
    /// Response applied when a body's response map has no entry.
    pub const DEFAULT_RESPONSE: &str = "slide";
    /// Default cap on responses applied during a single move.
    pub const DEFAULT_MAX_RESOLVE_STEPS: u32 = 64;
}
