//! Swept movement against tile grids.

use bevy::prelude::*;

use super::collision::CollisionState;

/// Resolves a body's motion against level geometry.
pub trait Mover {
    /// Move a body occupying `bounds` by `motion`.
    ///
    /// Clears `state`, then sets a flag for every side that made contact.
    /// Returns the motion actually applied.
    fn move_body(&self, motion: Vec2, bounds: Rect, state: &mut CollisionState) -> Vec2;
}

/// A grid of solid or empty cells placed in level space.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidGrid {
    /// Level-space top-left corner of cell (0, 0)
    pub origin: Vec2,
    pub cell_size: Vec2,
    pub width: u32,
    pub height: u32,
    /// Row-major
    pub solid: Vec<bool>,
}

impl SolidGrid {
    pub fn new(origin: Vec2, cell_size: Vec2, width: u32, height: u32, solid: Vec<bool>) -> Self {
        Self {
            origin,
            cell_size,
            width,
            height,
            solid,
        }
    }

    /// Cells outside the grid are empty.
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return false;
        }
        self.solid
            .get(row as usize * self.width as usize + col as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Level-space rectangle of a cell.
    pub fn cell_rect(&self, col: i32, row: i32) -> Rect {
        let min = self.origin + Vec2::new(col as f32, row as f32) * self.cell_size;
        Rect::from_corners(min, min + self.cell_size)
    }

    /// Iterate the level-space rectangles of every solid cell.
    pub fn solid_cells(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.height as i32).flat_map(move |row| {
            (0..self.width as i32)
                .filter(move |col| self.is_solid(*col, row))
                .map(move |col| self.cell_rect(col, row))
        })
    }

    /// Cell range `[first, last]` covered by the span `[min, max)` on one axis.
    fn span(min: f32, max: f32, origin: f32, size: f32) -> (i32, i32) {
        let first = ((min - origin) / size).floor() as i32;
        let last = ((max - origin) / size).ceil() as i32 - 1;
        (first, last.max(first))
    }

    /// Sweep the leading edge along X. Returns the clamped delta and whether
    /// a solid cell stopped it.
    fn sweep_x(&self, bounds: Rect, dx: f32) -> (f32, bool) {
        if dx == 0.0 {
            return (0.0, false);
        }
        let (row_first, row_last) =
            Self::span(bounds.min.y, bounds.max.y, self.origin.y, self.cell_size.y);
        let solid_column = |col: i32| (row_first..=row_last).any(|row| self.is_solid(col, row));

        if dx > 0.0 {
            let leading = (bounds.max.x - self.origin.x) / self.cell_size.x;
            let target = (bounds.max.x + dx - self.origin.x) / self.cell_size.x;
            let first = leading.ceil() as i32;
            let last = target.ceil() as i32 - 1;
            for col in first..=last {
                if solid_column(col) {
                    let edge = self.origin.x + col as f32 * self.cell_size.x;
                    return ((edge - bounds.max.x).max(0.0), true);
                }
            }
        } else {
            let leading = (bounds.min.x - self.origin.x) / self.cell_size.x;
            let target = (bounds.min.x + dx - self.origin.x) / self.cell_size.x;
            let first = leading.floor() as i32 - 1;
            let last = target.floor() as i32;
            for col in (last..=first).rev() {
                if solid_column(col) {
                    let edge = self.origin.x + (col + 1) as f32 * self.cell_size.x;
                    return ((edge - bounds.min.x).min(0.0), true);
                }
            }
        }
        (dx, false)
    }

    /// Sweep the leading edge along Y (positive is down).
    fn sweep_y(&self, bounds: Rect, dy: f32) -> (f32, bool) {
        if dy == 0.0 {
            return (0.0, false);
        }
        let (col_first, col_last) =
            Self::span(bounds.min.x, bounds.max.x, self.origin.x, self.cell_size.x);
        let solid_row = |row: i32| (col_first..=col_last).any(|col| self.is_solid(col, row));

        if dy > 0.0 {
            let leading = (bounds.max.y - self.origin.y) / self.cell_size.y;
            let target = (bounds.max.y + dy - self.origin.y) / self.cell_size.y;
            let first = leading.ceil() as i32;
            let last = target.ceil() as i32 - 1;
            for row in first..=last {
                if solid_row(row) {
                    let edge = self.origin.y + row as f32 * self.cell_size.y;
                    return ((edge - bounds.max.y).max(0.0), true);
                }
            }
        } else {
            let leading = (bounds.min.y - self.origin.y) / self.cell_size.y;
            let target = (bounds.min.y + dy - self.origin.y) / self.cell_size.y;
            let first = leading.floor() as i32 - 1;
            let last = target.floor() as i32;
            for row in (last..=first).rev() {
                if solid_row(row) {
                    let edge = self.origin.y + (row + 1) as f32 * self.cell_size.y;
                    return ((edge - bounds.min.y).min(0.0), true);
                }
            }
        }
        (dy, false)
    }
}

/// Moves bodies against one or more solid grids, X first, then Y.
pub struct TileGridMover<'a> {
    pub grids: &'a [SolidGrid],
}

impl<'a> TileGridMover<'a> {
    pub fn new(grids: &'a [SolidGrid]) -> Self {
        Self { grids }
    }
}

impl Mover for TileGridMover<'_> {
    fn move_body(&self, motion: Vec2, bounds: Rect, state: &mut CollisionState) -> Vec2 {
        state.clear();

        let mut dx = motion.x;
        let mut blocked_x = false;
        for grid in self.grids {
            let (clamped, hit) = grid.sweep_x(bounds, dx);
            dx = clamped;
            blocked_x |= hit;
        }
        if blocked_x {
            state.right = motion.x > 0.0;
            state.left = motion.x < 0.0;
        }

        let moved = Rect {
            min: bounds.min + Vec2::new(dx, 0.0),
            max: bounds.max + Vec2::new(dx, 0.0),
        };

        let mut dy = motion.y;
        let mut blocked_y = false;
        for grid in self.grids {
            let (clamped, hit) = grid.sweep_y(moved, dy);
            dy = clamped;
            blocked_y |= hit;
        }
        if blocked_y {
            state.below = motion.y > 0.0;
            state.above = motion.y < 0.0;
        }

        Vec2::new(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 6x4 grid of 16px cells: floor on row 3, a wall at column 4 on row 2.
    fn room() -> SolidGrid {
        #[rustfmt::skip]
        let cells = [
            0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 1, 0,
            1, 1, 1, 1, 1, 1,
        ];
        SolidGrid::new(
            Vec2::ZERO,
            Vec2::splat(16.0),
            6,
            4,
            cells.iter().map(|c| *c == 1).collect(),
        )
    }

    fn body(min: Vec2) -> Rect {
        Rect::from_corners(min, min + Vec2::new(8.0, 16.0))
    }

    #[test]
    fn test_falling_lands_on_floor() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        // Bottom edge at 44, floor row starts at 48.
        let motion = mover.move_body(Vec2::new(0.0, 10.0), body(Vec2::new(16.0, 28.0)), &mut state);
        assert_eq!(motion, Vec2::new(0.0, 4.0));
        assert!(state.below);
        assert!(!state.above && !state.left && !state.right);
    }

    #[test]
    fn test_resting_on_floor_stays_grounded() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        let motion = mover.move_body(Vec2::new(0.0, 0.5), body(Vec2::new(16.0, 32.0)), &mut state);
        assert_eq!(motion.y, 0.0);
        assert!(state.below);
    }

    #[test]
    fn test_wall_clamps_horizontal_motion() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        // Right edge at 60, wall column starts at 64.
        let motion = mover.move_body(Vec2::new(10.0, 0.0), body(Vec2::new(52.0, 32.0)), &mut state);
        assert_eq!(motion.x, 4.0);
        assert!(state.right);
        assert!(!state.left);

        // Moving away from the wall is free.
        let motion = mover.move_body(Vec2::new(-10.0, 0.0), body(Vec2::new(56.0, 32.0)), &mut state);
        assert_eq!(motion.x, -10.0);
        assert!(!state.has_collision());
    }

    #[test]
    fn test_wall_clamps_moving_left() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        // Left edge at 84, wall column ends at 80.
        let motion = mover.move_body(Vec2::new(-10.0, 0.0), body(Vec2::new(84.0, 32.0)), &mut state);
        assert_eq!(motion.x, -4.0);
        assert!(state.left);
    }

    #[test]
    fn test_fast_motion_does_not_tunnel() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        let motion = mover.move_body(Vec2::new(0.0, 500.0), body(Vec2::new(16.0, 0.0)), &mut state);
        assert_eq!(motion.y, 32.0);
        assert!(state.below);
    }

    #[test]
    fn test_outside_grid_is_empty() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState::default();

        let motion = mover.move_body(Vec2::new(0.0, 20.0), body(Vec2::new(-40.0, 40.0)), &mut state);
        assert_eq!(motion.y, 20.0);
        assert!(!state.below);
    }

    #[test]
    fn test_state_is_cleared_each_move() {
        let grids = [room()];
        let mover = TileGridMover::new(&grids);
        let mut state = CollisionState {
            left: true,
            above: true,
            ..default()
        };

        mover.move_body(Vec2::new(0.0, 0.0), body(Vec2::new(16.0, 0.0)), &mut state);
        assert!(!state.has_collision());
    }

    #[test]
    fn test_solid_cells() {
        let grid = room();
        let cells: Vec<Rect> = grid.solid_cells().collect();
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], Rect::new(64.0, 32.0, 80.0, 48.0));
    }
}
