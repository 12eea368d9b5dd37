//! The collision world facade
//!
//! Owns the spatial grid, the body arena and the named response registry,
//! and exposes the whole external surface: add/remove bodies, resolve
//! moves, and run rect/point/segment queries.
//!
//! The resolver is a read-only state machine: `check` projects the sweep,
//! responds to the earliest contact, re-projects, and repeats until the
//! queue drains. Nothing is written back until `move_body` commits the
//! final position, so an aborted resolution can never leave a body half
//! moved.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use glam::Vec2;

use crate::body::{Body, BodyArena, BodyKey};
use crate::collision::{Collision, sort_collisions, sweep_collide};
use crate::config::WorldConfig;
use crate::error::WorldError;
use crate::geom::Rect;
use crate::grid::Grid;
use crate::response::{Bounce, Cross, ResponsePolicy, Slide, Touch};

/// Result of resolving one move: the final position and every contact
/// encountered along the way, in resolution order.
#[derive(Debug, Clone)]
pub struct Movement {
    pub position: Vec2,
    pub collisions: Vec<Collision>,
}

pub struct World {
    config: WorldConfig,
    grid: Grid,
    bodies: BodyArena,
    responses: HashMap<String, Arc<dyn ResponsePolicy>>,
}

impl World {
    /// World with the given cell size and default settings.
    pub fn new(cell_size: f32) -> Self {
        Self::with_config(WorldConfig {
            cell_size,
            ..WorldConfig::default()
        })
    }

    pub fn with_config(config: WorldConfig) -> Self {
        log::debug!(
            "collision world created: cell size {}, default response {:?}",
            config.cell_size,
            config.default_response
        );
        let mut world = Self {
            grid: Grid::new(config.cell_size),
            bodies: BodyArena::new(),
            responses: HashMap::new(),
            config,
        };
        world.add_response("touch", Arc::new(Touch));
        world.add_response("cross", Arc::new(Cross));
        world.add_response("slide", Arc::new(Slide));
        world.add_response("bounce", Arc::new(Bounce));
        world
    }

    /// Registers (or overrides) a named response policy.
    pub fn add_response(&mut self, name: &str, policy: Arc<dyn ResponsePolicy>) {
        self.responses.insert(name.to_string(), policy);
    }

    /// Creates a dynamic body and places it on the grid.
    pub fn add(&mut self, tag: &str, x: f32, y: f32, w: f32, h: f32) -> BodyKey {
        self.insert(Body::new(tag, Rect::new(x, y, w, h), false))
    }

    /// Creates a static body: placed once, never re-homed afterwards.
    pub fn add_static(&mut self, tag: &str, x: f32, y: f32, w: f32, h: f32) -> BodyKey {
        self.insert(Body::new(tag, Rect::new(x, y, w, h), true))
    }

    fn insert(&mut self, body: Body) -> BodyKey {
        let rect = body.rect;
        let key = self.bodies.insert(body);
        let cells = self.grid.update(key, &[], &rect);
        if let Some(body) = self.bodies.get_mut(key) {
            body.cells = cells;
        }
        key
    }

    /// Detaches the body from every cell it occupies. The handle goes
    /// stale; re-adding mints a fresh one.
    pub fn remove(&mut self, key: BodyKey) -> Result<(), WorldError> {
        let body = self
            .bodies
            .remove(key)
            .ok_or(WorldError::UnknownBody(key))?;
        for &coord in &body.cells {
            self.grid.leave(coord, key);
        }
        Ok(())
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains(key)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    pub fn rect_of(&self, key: BodyKey) -> Result<Rect, WorldError> {
        self.bodies
            .get(key)
            .map(|b| b.rect)
            .ok_or(WorldError::UnknownBody(key))
    }

    pub fn tag_of(&self, key: BodyKey) -> Result<&str, WorldError> {
        self.bodies
            .get(key)
            .map(|b| b.tag.as_str())
            .ok_or(WorldError::UnknownBody(key))
    }

    /// Sets the response used against bodies tagged `other_tag`. Takes
    /// effect on the next check; in-flight resolutions are unaffected.
    pub fn set_response(
        &mut self,
        key: BodyKey,
        other_tag: &str,
        response: &str,
    ) -> Result<(), WorldError> {
        let body = self
            .bodies
            .get_mut(key)
            .ok_or(WorldError::UnknownBody(key))?;
        body.responses
            .insert(other_tag.to_string(), response.to_string());
        Ok(())
    }

    /// Replaces the body's whole response map.
    pub fn set_responses(
        &mut self,
        key: BodyKey,
        responses: HashMap<String, String>,
    ) -> Result<(), WorldError> {
        let body = self
            .bodies
            .get_mut(key)
            .ok_or(WorldError::UnknownBody(key))?;
        body.responses = responses;
        Ok(())
    }

    /// Resolves a move and commits the final position. The sole entry
    /// point for moving a dynamic body.
    pub fn move_body(&mut self, key: BodyKey, goal: Vec2) -> Result<Movement, WorldError> {
        let movement = self.check(key, goal)?;
        let rect = self.rect_of(key)?.at(movement.position);
        self.commit_rect(key, rect)?;
        Ok(movement)
    }

    /// Same resolution as [`World::move_body`], committing nothing.
    pub fn check(&self, key: BodyKey, goal: Vec2) -> Result<Movement, WorldError> {
        let body = self.bodies.get(key).ok_or(WorldError::UnknownBody(key))?;
        let mut origin = body.rect;
        let mut goal = goal;
        let mut resolved = Vec::new();
        let mut visited: HashSet<BodyKey> = HashSet::new();
        visited.insert(key);

        let mut queue: VecDeque<Collision> = self.project(key, origin, goal).into();
        let mut steps = 0u32;

        while let Some(collision) = queue.pop_front() {
            // each obstacle is responded to at most once per move
            if !visited.insert(collision.other) {
                continue;
            }
            steps += 1;
            if steps > self.config.max_resolve_steps {
                log::error!(
                    "resolution for {key:?} exceeded {} steps; aborting with best-effort position",
                    self.config.max_resolve_steps
                );
                break;
            }
            let policy = self
                .responses
                .get(&collision.response)
                .cloned()
                .ok_or_else(|| WorldError::UnknownResponse(collision.response.clone()))?;
            let next = policy.apply(self, &collision, key, origin, goal);
            goal = next.goal;
            origin = next.origin;
            queue = next.collisions.into();
            resolved.push(collision);
        }

        Ok(Movement {
            position: goal,
            collisions: resolved,
        })
    }

    /// Teleport/resize without collision resolution. Grid membership is
    /// refreshed; static bodies are rejected.
    pub fn update(&mut self, key: BodyKey, rect: Rect) -> Result<(), WorldError> {
        self.commit_rect(key, rect)
    }

    /// Swept collisions of a body (projected from `origin`) moving toward
    /// `goal`, earliest first. Candidates come from every cell the sweep's
    /// bounding rect touches, so fast movers cannot tunnel past thin
    /// obstacles between cells.
    pub fn project(&self, mover: BodyKey, origin: Rect, goal: Vec2) -> Vec<Collision> {
        let Some(body) = self.bodies.get(mover) else {
            return Vec::new();
        };

        let l = goal.x.min(origin.x);
        let t = goal.y.min(origin.y);
        let r = (goal.x + origin.w).max(origin.right());
        let b = (goal.y + origin.h).max(origin.bottom());
        let sweep = Rect::new(l, t, r - l, b - t);

        let mut collisions = Vec::new();
        for other in self.bodies_in_cells(&self.grid.cells_in_rect(&sweep), &[]) {
            if other == mover {
                continue;
            }
            let Some(other_body) = self.bodies.get(other) else {
                continue;
            };
            if let Some(hit) = sweep_collide(&origin, &other_body.rect, goal) {
                collisions.push(Collision {
                    other,
                    response: body
                        .response_for(&other_body.tag, &self.config.default_response)
                        .to_string(),
                    fraction: hit.fraction,
                    distance: origin.center_distance_sq(&other_body.rect),
                    movement: goal - origin.pos(),
                    normal: hit.normal,
                    touch: hit.touch,
                });
            }
        }

        sort_collisions(&mut collisions);
        collisions
    }

    /// Distinct bodies overlapping the rect, in discovery order, optionally
    /// restricted to a tag allow-list (empty = all tags).
    pub fn query_rect(&self, rect: Rect, tags: &[&str]) -> Vec<BodyKey> {
        self.bodies_in_cells(&self.grid.cells_in_rect(&rect), tags)
    }

    /// Bodies whose rect strictly contains the point. Exact edge touches
    /// do not count. Only the cell containing the point is searched; since
    /// every body is registered in all cells it overlaps, that is enough.
    pub fn query_point(&self, p: Vec2, tags: &[&str]) -> Vec<BodyKey> {
        let coord = self.grid.cell_coords_at(p.x, p.y);
        let Some(keys) = self.grid.bodies_at(coord) else {
            return Vec::new();
        };
        keys.iter()
            .copied()
            .filter(|&key| {
                self.bodies
                    .get(key)
                    .is_some_and(|b| b.has_tag(tags) && b.rect.contains_point(p))
            })
            .collect()
    }

    /// Bodies whose rect intersects the open parametric range `(0, 1)` of
    /// the segment, nearest first. Touching exactly at an endpoint does
    /// not count.
    pub fn query_segment(&self, p1: Vec2, p2: Vec2, tags: &[&str]) -> Vec<BodyKey> {
        let cells = self.grid.cells_touched_by_segment(p1, p2);
        let mut hits: Vec<(f32, BodyKey)> = Vec::new();
        for key in self.bodies_in_cells(&cells, tags) {
            let Some(body) = self.bodies.get(key) else {
                continue;
            };
            if let Some(clip) = body.rect.clip_segment(p1, p2, 0.0, 1.0) {
                let inside = (0.0 < clip.t_in && clip.t_in < 1.0)
                    || (0.0 < clip.t_out && clip.t_out < 1.0);
                if inside {
                    hits.push((clip.t_in, key));
                }
            }
        }
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(_, key)| key).collect()
    }

    /// Number of grid cells ever occupied. Diagnostics only.
    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    fn commit_rect(&mut self, key: BodyKey, rect: Rect) -> Result<(), WorldError> {
        let body = self.bodies.get(key).ok_or(WorldError::UnknownBody(key))?;
        if body.is_static {
            return Err(WorldError::StaticBody(key));
        }
        if body.rect == rect {
            return Ok(());
        }
        let old_cells = body.cells.clone();
        let cells = self.grid.update(key, &old_cells, &rect);
        if let Some(body) = self.bodies.get_mut(key) {
            body.rect = rect;
            body.cells = cells;
        }
        Ok(())
    }

    /// Distinct live bodies in the given cells, discovery order.
    fn bodies_in_cells(&self, cells: &[(i32, i32)], tags: &[&str]) -> Vec<BodyKey> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &coord in cells {
            let Some(keys) = self.grid.bodies_at(coord) else {
                continue;
            };
            for &key in keys {
                if seen.insert(key)
                    && self.bodies.get(key).is_some_and(|b| b.has_tag(tags))
                {
                    out.push(key);
                }
            }
        }
        out
    }
}
