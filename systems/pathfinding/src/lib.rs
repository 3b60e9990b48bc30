#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid navigation for AI-controlled bodies.
//!
//! [`Navigator`] flattens an obstacle grid into an eight-way adjacency table
//! once and then answers breadth-first shortest-path queries against it,
//! reusing the same scratch buffers for every query. Every step costs one,
//! diagonal or not, so breadth-first order alone yields a minimal step count.
//! [`WalkabilityGrid`] sits on top and derives the grid a body of a given
//! diameter can actually traverse.

pub mod walkability;

use std::collections::VecDeque;

use log::{debug, trace};
use rally_core::{CellCoord, GridShape, Matrix};

pub use walkability::{WalkabilityError, WalkabilityGrid};

/// Neighbor table entry marking a blocked or out-of-bounds neighbor, and the
/// parent entry of a cell the search has not reached.
pub const NO_NEIGHBOR: usize = usize::MAX;

/// Number of neighbor slots stored per cell.
pub const NEIGHBORS_PER_CELL: usize = 8;

/// Column and row offsets in expansion order: left, right, up, down, then
/// up-left, up-right, down-left, down-right. Straight moves come first so
/// that among equally short routes the search settles on straighter ones.
const DIRECTIONS: [(i64, i64); NEIGHBORS_PER_CELL] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Breadth-first path search over a fixed obstacle grid.
///
/// A default-constructed navigator is uninitialized and answers every query
/// with an empty path. [`Navigator::initialize`] binds it to a grid; queries
/// then reuse the neighbor table, visited flags, parent links and work queue
/// without reallocating. Queries take `&mut self`, so concurrent searches
/// need separate navigators.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    shape: GridShape,
    neighbors: Vec<usize>,
    visited: Vec<bool>,
    parents: Vec<usize>,
    queue: VecDeque<usize>,
}

impl Navigator {
    /// Creates a navigator bound to `grid`.
    #[must_use]
    pub fn new(grid: &Matrix) -> Self {
        let mut navigator = Self::default();
        navigator.initialize(grid);
        navigator
    }

    /// Rebuilds the neighbor table for `grid` and sizes the scratch buffers
    /// to its cell count.
    ///
    /// Call once per grid, not per query. Re-initializing with another grid
    /// reuses the existing allocations where they are large enough.
    pub fn initialize(&mut self, grid: &Matrix) {
        let cell_count = grid.cell_count();
        self.shape = grid.shape();
        debug_assert_eq!(self.shape.cell_count(), Some(cell_count));

        self.neighbors.clear();
        self.neighbors.reserve(cell_count * NEIGHBORS_PER_CELL);
        for cell in grid.coords() {
            for (column_offset, row_offset) in DIRECTIONS {
                let neighbor = offset(cell, column_offset, row_offset)
                    .filter(|neighbor| grid.is_free(*neighbor))
                    .and_then(|neighbor| grid.index_of(neighbor))
                    .unwrap_or(NO_NEIGHBOR);
                self.neighbors.push(neighbor);
            }
        }

        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.parents.clear();
        self.parents.resize(cell_count, NO_NEIGHBOR);
        self.queue.clear();
        self.queue.reserve(cell_count);

        debug!(
            "navigator initialized for {}x{} grid with {} free cells",
            self.shape.columns(),
            self.shape.rows(),
            cell_count - grid.count_blocked()
        );
    }

    /// Reports whether the navigator is bound to a grid.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.visited.is_empty()
    }

    /// Dimensions of the bound grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.shape.columns(), self.shape.rows())
    }

    /// Neighbor slots of `cell` in expansion order, or `None` outside the
    /// grid.
    #[must_use]
    pub fn neighbors_of(&self, cell: CellCoord) -> Option<&[usize]> {
        let index = self.shape.index_of(cell)?;
        let base = index * NEIGHBORS_PER_CELL;
        self.neighbors.get(base..base + NEIGHBORS_PER_CELL)
    }

    /// Writes the shortest path from `start` to `end` into `out`, both
    /// endpoints included.
    ///
    /// `out` is cleared first and left empty when `end` is unreachable or
    /// either endpoint lies outside the grid. A blocked `start` is still
    /// expanded, so a body nudged onto an obstacle can find its way out; a
    /// blocked `end` is only reachable when it equals `start`.
    pub fn find_path(&mut self, start: CellCoord, end: CellCoord, out: &mut Vec<CellCoord>) {
        out.clear();

        let Some((start_index, end_index)) = self.endpoints(start, end) else {
            trace!("path query outside grid: {start:?} -> {end:?}");
            return;
        };

        if !self.search(start_index, end_index) {
            trace!("no path from {start:?} to {end:?}");
            return;
        }

        let mut current = end_index;
        loop {
            let Some(cell) = self.shape.coord_of(current) else {
                out.clear();
                return;
            };
            out.push(cell);
            if current == start_index {
                break;
            }
            current = self.parents[current];
        }
        out.reverse();

        trace!("path from {start:?} to {end:?} spans {} cells", out.len());
    }

    /// Convenience wrapper around [`Navigator::find_path`] that allocates the
    /// output.
    #[must_use]
    pub fn path(&mut self, start: CellCoord, end: CellCoord) -> Vec<CellCoord> {
        let mut out = Vec::new();
        self.find_path(start, end, &mut out);
        out
    }

    /// Number of steps on the shortest path, `None` when unreachable.
    #[must_use]
    pub fn path_len_between(&mut self, start: CellCoord, end: CellCoord) -> Option<usize> {
        let (start_index, end_index) = self.endpoints(start, end)?;
        if !self.search(start_index, end_index) {
            return None;
        }

        let mut steps = 0;
        let mut current = end_index;
        while current != start_index {
            current = self.parents[current];
            steps += 1;
        }
        Some(steps)
    }

    fn endpoints(&self, start: CellCoord, end: CellCoord) -> Option<(usize, usize)> {
        let start = self.shape.index_of(start)?;
        let end = self.shape.index_of(end)?;
        (start.max(end) < self.visited.len()).then_some((start, end))
    }

    /// Breadth-first search from `start` until `end` is dequeued. Parent
    /// links are valid for every reached cell afterward.
    fn search(&mut self, start: usize, end: usize) -> bool {
        self.reset();
        self.visited[start] = true;
        self.queue.push_back(start);

        while let Some(current) = self.queue.pop_front() {
            if current == end {
                return true;
            }

            let base = current * NEIGHBORS_PER_CELL;
            for slot in base..base + NEIGHBORS_PER_CELL {
                let neighbor = self.neighbors[slot];
                if neighbor == NO_NEIGHBOR || self.visited[neighbor] {
                    continue;
                }
                self.visited[neighbor] = true;
                self.parents[neighbor] = current;
                self.queue.push_back(neighbor);
            }
        }

        false
    }

    fn reset(&mut self) {
        self.visited.fill(false);
        self.parents.fill(NO_NEIGHBOR);
        self.queue.clear();
    }
}

fn offset(cell: CellCoord, column_offset: i64, row_offset: i64) -> Option<CellCoord> {
    let column = u32::try_from(i64::from(cell.column()) + column_offset).ok()?;
    let row = u32::try_from(i64::from(cell.row()) + row_offset).ok()?;
    Some(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::{Navigator, NO_NEIGHBOR};
    use rally_core::{CellCoord, Matrix};

    #[test]
    fn neighbor_table_lists_straight_moves_before_diagonals() {
        let grid = Matrix::from_rows(&[[0_i64, 0, 0], [0, 0, 1], [0, 0, 0]]).expect("grid");
        let navigator = Navigator::new(&grid);

        let slots = navigator
            .neighbors_of(CellCoord::new(1, 1))
            .expect("inside grid");
        assert_eq!(slots, &[3, NO_NEIGHBOR, 1, 7, 0, 2, 6, 8]);

        let corner = navigator
            .neighbors_of(CellCoord::new(0, 0))
            .expect("inside grid");
        assert_eq!(
            corner,
            &[NO_NEIGHBOR, 1, NO_NEIGHBOR, 3, NO_NEIGHBOR, NO_NEIGHBOR, NO_NEIGHBOR, 4]
        );
    }

    #[test]
    fn uninitialized_navigator_returns_empty_paths() {
        let mut navigator = Navigator::default();
        assert!(!navigator.is_initialized());
        assert!(navigator
            .path(CellCoord::new(0, 0), CellCoord::new(0, 0))
            .is_empty());
    }

    #[test]
    fn reset_clears_scratch_without_reallocating() {
        let grid = Matrix::empty(6, 6).expect("grid");
        let mut navigator = Navigator::new(&grid);
        let visited_ptr = navigator.visited.as_ptr();
        let parents_ptr = navigator.parents.as_ptr();
        let queue_capacity = navigator.queue.capacity();

        let path = navigator.path(CellCoord::new(0, 0), CellCoord::new(5, 5));
        assert_eq!(path.len(), 6);
        assert!(navigator.visited.iter().any(|visited| *visited));

        navigator.reset();

        assert!(navigator.visited.iter().all(|visited| !visited));
        assert!(navigator.parents.iter().all(|parent| *parent == NO_NEIGHBOR));
        assert!(navigator.queue.is_empty());
        assert_eq!(navigator.visited.as_ptr(), visited_ptr);
        assert_eq!(navigator.parents.as_ptr(), parents_ptr);
        assert_eq!(navigator.queue.capacity(), queue_capacity);
    }

    #[test]
    fn path_len_between_matches_path_length() {
        let grid = Matrix::from_rows(&[
            [0_i64, 0, 0, 0],
            [1, 1, 1, 0],
            [0, 0, 0, 0],
        ])
        .expect("grid");
        let mut navigator = Navigator::new(&grid);
        let start = CellCoord::new(0, 0);
        let end = CellCoord::new(0, 2);

        let path = navigator.path(start, end);
        assert_eq!(navigator.path_len_between(start, end), Some(path.len() - 1));
        assert_eq!(path.len() - 1, 6);
    }

    #[test]
    fn blocked_start_still_expands() {
        let grid = Matrix::from_rows(&[[1_i64, 0, 0]]).expect("grid");
        let mut navigator = Navigator::new(&grid);
        assert_eq!(
            navigator.path(CellCoord::new(0, 0), CellCoord::new(2, 0)),
            vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)]
        );
        assert!(navigator
            .path(CellCoord::new(2, 0), CellCoord::new(0, 0))
            .is_empty());
    }

    #[test]
    fn navigator_shares_the_grid_indexing() {
        let grid = Matrix::from_rows(&[[0_i64, 0, 0], [0, 1, 0]]).expect("grid");
        let navigator = Navigator::new(&grid);

        assert_eq!(navigator.dimensions(), (3, 2));
        assert_eq!(navigator.shape, grid.shape());
        assert_eq!(navigator.visited.len(), grid.cell_count());
        assert_eq!(navigator.neighbors_of(CellCoord::new(3, 0)), None);
    }
}
