//! Uniform spatial hash
//!
//! Maps continuous-space rectangles onto a lazily populated grid of
//! fixed-size square cells. Cells are created the first time a body enters
//! them and retained afterwards; iterating an empty cell is O(1) so pruning
//! is not worth the bookkeeping.
//!
//! The segment traversal is based on "A Fast Voxel Traversal Algorithm for
//! Ray Tracing" by Amanatides and Woo, modified to include both cells when
//! the ray passes exactly through a grid corner, and with an early exit
//! plus a forced final emit so floating-point drift can never loop forever.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::body::BodyKey;
use crate::geom::Rect;

/// One bucket of the hash, covering a `cell_size` square of world space.
#[derive(Debug, Default)]
pub(crate) struct Cell {
    bodies: Vec<BodyKey>,
}

impl Cell {
    /// Leave-then-enter: a body can never be double-counted in one cell.
    fn enter(&mut self, key: BodyKey) {
        self.leave(key);
        self.bodies.push(key);
    }

    fn leave(&mut self, key: BodyKey) {
        if let Some(i) = self.bodies.iter().position(|&k| k == key) {
            self.bodies.remove(i);
        }
    }
}

#[derive(Debug)]
pub(crate) struct Grid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Cell>,
}

impl Grid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Number of cells ever touched. Exposed for diagnostics and tests.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell coordinates containing the point.
    #[inline]
    pub fn cell_coords_at(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Cell-space span of a rect: `(cl, ct, cw, ch)` with the far edge
    /// computed via `ceil` so the upper bound is exclusive.
    pub fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let (cl, ct) = self.cell_coords_at(rect.x, rect.y);
        let cr = (rect.right() / self.cell_size).ceil() as i32;
        let cb = (rect.bottom() / self.cell_size).ceil() as i32;
        (cl, ct, cr - cl, cb - ct)
    }

    /// Coordinates of the existing cells intersecting the rect, row-major.
    pub fn cells_in_rect(&self, rect: &Rect) -> Vec<(i32, i32)> {
        let (cl, ct, cw, ch) = self.cell_span(rect);
        let mut out = Vec::new();
        for cy in ct..ct + ch {
            for cx in cl..cl + cw {
                if self.cells.contains_key(&(cx, cy)) {
                    out.push((cx, cy));
                }
            }
        }
        out
    }

    /// Bodies registered in the cell, if it exists.
    pub fn bodies_at(&self, coord: (i32, i32)) -> Option<&[BodyKey]> {
        self.cells.get(&coord).map(|c| c.bodies.as_slice())
    }

    /// Re-home a body: leave every cell in `old`, enter every cell the new
    /// rect spans (creating them as needed). Returns the new membership.
    pub fn update(&mut self, key: BodyKey, old: &[(i32, i32)], rect: &Rect) -> Vec<(i32, i32)> {
        for &coord in old {
            self.leave(coord, key);
        }
        let (cl, ct, cw, ch) = self.cell_span(rect);
        let mut membership = Vec::with_capacity((cw.max(0) * ch.max(0)) as usize);
        for cy in ct..ct + ch {
            for cx in cl..cl + cw {
                self.cells.entry((cx, cy)).or_default().enter(key);
                membership.push((cx, cy));
            }
        }
        membership
    }

    pub fn leave(&mut self, coord: (i32, i32), key: BodyKey) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.leave(key);
        }
    }

    /// Coordinates of the existing cells a supercover line between the two
    /// points passes through, in traversal order.
    pub fn cells_touched_by_segment(&self, p1: Vec2, p2: Vec2) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.trace_ray(p1, p2, |cx, cy| {
            if visited.insert((cx, cy)) && self.cells.contains_key(&(cx, cy)) {
                out.push((cx, cy));
            }
        });
        out
    }

    /// Initial step state for one axis of the traversal: step direction,
    /// fraction advance per cell, and fraction of the first boundary.
    fn ray_step(&self, t1: f32, t2: f32) -> (i32, f32, f32) {
        let v = t2 - t1;
        if v > 0.0 {
            let delta = self.cell_size / v;
            (1, delta, delta * (1.0 - frac(t1 / self.cell_size)))
        } else if v < 0.0 {
            let delta = self.cell_size / v;
            (-1, -delta, -delta * frac(t1 / self.cell_size))
        } else {
            (0, f32::INFINITY, f32::INFINITY)
        }
    }

    /// Walk the grid cells under the segment, calling `f` for each.
    ///
    /// Coordinates may repeat; callers dedupe. The loop stops once within
    /// one cell (Manhattan distance) of the destination and then force-emits
    /// the destination: a naive "loop until equal" condition can spin
    /// forever when the accumulated fractions land short of the last
    /// boundary.
    pub fn trace_ray(&self, p1: Vec2, p2: Vec2, mut f: impl FnMut(i32, i32)) {
        let (cx1, cy1) = self.cell_coords_at(p1.x, p1.y);
        let (cx2, cy2) = self.cell_coords_at(p2.x, p2.y);
        let (step_x, dx, mut tx) = self.ray_step(p1.x, p2.x);
        let (step_y, dy, mut ty) = self.ray_step(p1.y, p2.y);
        let (mut cx, mut cy) = (cx1, cy1);

        f(cx, cy);

        while (cx - cx2).abs() + (cy - cy2).abs() > 1 {
            if tx < ty {
                tx += dx;
                cx += step_x;
            } else {
                // exactly on a corner: include the cell on the other side too
                if tx == ty {
                    f(cx + step_x, cy);
                }
                ty += dy;
                cy += step_y;
            }
            f(cx, cy);
        }

        if cx != cx2 || cy != cy2 {
            f(cx2, cy2);
        }
    }
}

#[inline]
fn frac(x: f32) -> f32 {
    x - x.floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyArena};

    fn key(arena: &mut BodyArena) -> BodyKey {
        arena.insert(Body::new("test", Rect::new(0.0, 0.0, 1.0, 1.0), false))
    }

    #[test]
    fn test_cell_coords_floor() {
        let grid = Grid::new(64.0);
        assert_eq!(grid.cell_coords_at(0.0, 0.0), (0, 0));
        assert_eq!(grid.cell_coords_at(63.9, 10.0), (0, 0));
        assert_eq!(grid.cell_coords_at(64.0, 10.0), (1, 0));
        assert_eq!(grid.cell_coords_at(-0.1, -64.0), (-1, -1));
        assert_eq!(grid.cell_coords_at(-64.1, 0.0), (-2, 0));
    }

    #[test]
    fn test_cell_span_exclusive_far_edge() {
        let grid = Grid::new(64.0);
        // rect ending exactly on a boundary does not spill into the next cell
        let (cl, ct, cw, ch) = grid.cell_span(&Rect::new(0.0, 0.0, 64.0, 64.0));
        assert_eq!((cl, ct, cw, ch), (0, 0, 1, 1));
        // one past the boundary does
        let (_, _, cw, ch) = grid.cell_span(&Rect::new(0.0, 0.0, 64.1, 64.0));
        assert_eq!((cw, ch), (2, 1));
        // straddling the origin
        let (cl, ct, cw, ch) = grid.cell_span(&Rect::new(-10.0, -10.0, 20.0, 20.0));
        assert_eq!((cl, ct, cw, ch), (-1, -1, 2, 2));
    }

    #[test]
    fn test_update_is_leave_then_enter() {
        let mut grid = Grid::new(64.0);
        let mut arena = BodyArena::new();
        let k = key(&mut arena);

        let cells = grid.update(k, &[], &Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(cells, vec![(0, 0)]);
        assert_eq!(grid.bodies_at((0, 0)).unwrap(), &[k]);

        // entering again from the same membership never double-counts
        let cells = grid.update(k, &cells, &Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(grid.bodies_at((0, 0)).unwrap(), &[k]);

        // moving across a boundary leaves the old cell behind
        let cells = grid.update(k, &cells, &Rect::new(100.0, 0.0, 10.0, 10.0));
        assert_eq!(cells, vec![(1, 0)]);
        assert!(grid.bodies_at((0, 0)).unwrap().is_empty());
        assert_eq!(grid.bodies_at((1, 0)).unwrap(), &[k]);
    }

    #[test]
    fn test_cells_in_rect_returns_existing_only() {
        let mut grid = Grid::new(64.0);
        let mut arena = BodyArena::new();
        let k = key(&mut arena);
        grid.update(k, &[], &Rect::new(0.0, 0.0, 10.0, 10.0));

        // the query spans four cells but only (0,0) has ever been touched
        let cells = grid.cells_in_rect(&Rect::new(0.0, 0.0, 128.0, 128.0));
        assert_eq!(cells, vec![(0, 0)]);
    }

    #[test]
    fn test_trace_ray_horizontal() {
        let grid = Grid::new(10.0);
        let mut seen = Vec::new();
        grid.trace_ray(Vec2::new(5.0, 5.0), Vec2::new(45.0, 5.0), |cx, cy| {
            seen.push((cx, cy));
        });
        assert_eq!(seen, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_trace_ray_corner_includes_both_cells() {
        let grid = Grid::new(10.0);
        let mut seen = Vec::new();
        // passes exactly through the corners at (10,10) and (20,20)
        grid.trace_ray(Vec2::new(5.0, 5.0), Vec2::new(25.0, 25.0), |cx, cy| {
            if !seen.contains(&(cx, cy)) {
                seen.push((cx, cy));
            }
        });
        assert!(seen.contains(&(0, 0)));
        assert!(seen.contains(&(1, 1)));
        assert!(seen.contains(&(2, 2)));
        // the extra cell emitted at each corner
        assert!(seen.contains(&(1, 0)));
        assert!(seen.contains(&(2, 1)));
    }

    #[test]
    fn test_trace_ray_reaches_destination_cell() {
        let grid = Grid::new(10.0);
        let mut seen = Vec::new();
        grid.trace_ray(Vec2::new(2.0, 3.0), Vec2::new(97.0, 41.0), |cx, cy| {
            if !seen.contains(&(cx, cy)) {
                seen.push((cx, cy));
            }
        });
        assert_eq!(seen.first(), Some(&(0, 0)));
        assert!(seen.contains(&(9, 4)));
        // supercover: consecutive cells are always edge or corner neighbors
        for pair in seen.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
        }
    }

    #[test]
    fn test_trace_ray_zero_length() {
        let grid = Grid::new(10.0);
        let mut seen = Vec::new();
        grid.trace_ray(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), |cx, cy| {
            seen.push((cx, cy));
        });
        assert_eq!(seen, vec![(0, 0)]);
    }

    #[test]
    fn test_cells_touched_by_segment_filters_missing() {
        let mut grid = Grid::new(10.0);
        let mut arena = BodyArena::new();
        let k = key(&mut arena);
        grid.update(k, &[], &Rect::new(25.0, 5.0, 2.0, 2.0)); // cell (2,0)

        let cells = grid.cells_touched_by_segment(Vec2::new(5.0, 6.0), Vec2::new(45.0, 6.0));
        assert_eq!(cells, vec![(2, 0)]);
    }
}
