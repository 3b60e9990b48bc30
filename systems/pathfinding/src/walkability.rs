//! Traversable cells for a body of a given size.
//!
//! Obstacle grids are authored at the resolution of the level, but a body
//! wider than a point cannot use every free cell of that grid. The
//! walkability grid doubles the resolution and keeps only the fine cells a
//! body can occupy with its center without overlapping an obstacle cell or
//! leaving the world.

use log::debug;
use rally_core::{ArithmeticError, CellCoord, Circle, GridError, Int, Matrix, Pt};
use thiserror::Error;

/// Reasons a walkability grid could not be derived.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WalkabilityError {
    /// Coordinate arithmetic left the representable range.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    /// The fine grid could not be built.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Halving the cell size would leave a fine cell without extent.
    #[error("cell size {cell_size} is too small to subdivide")]
    CellTooSmall {
        /// Requested coarse cell size.
        cell_size: Int,
    },
    /// An odd cell size cannot be split into two fine cells of equal size.
    #[error("cell size {cell_size} is not an even number of ticks")]
    OddCellSize {
        /// Requested coarse cell size.
        cell_size: Int,
    },
    /// Body diameters cannot be negative.
    #[error("body diameter {diameter} is negative")]
    NegativeDiameter {
        /// Requested body diameter.
        diameter: Int,
    },
}

/// Double-resolution grid marking where a body's center may rest.
///
/// Zero cells are walkable, any other value is not, matching the obstacle
/// convention of [`Matrix`], so the grid feeds straight into a
/// [`Navigator`](crate::Navigator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkabilityGrid {
    grid: Matrix,
    fine_cell_size: Int,
}

impl WalkabilityGrid {
    /// Derives the walkable fine cells of `obstacles` for a body of
    /// `body_diameter`, where each obstacle cell spans `cell_size` ticks.
    /// The cell size must be even so that two fine cells tile one obstacle
    /// cell exactly.
    ///
    /// A fine cell is walkable when the axis-aligned square of side
    /// `body_diameter` centred on it stays inside the world and overlaps the
    /// interior of free obstacle cells only. Touching an obstacle face is
    /// allowed. A zero diameter only checks the obstacle cell containing the
    /// fine cell's center.
    pub fn derive(
        obstacles: &Matrix,
        cell_size: Int,
        body_diameter: Int,
    ) -> Result<Self, WalkabilityError> {
        if body_diameter.is_negative() {
            return Err(WalkabilityError::NegativeDiameter {
                diameter: body_diameter,
            });
        }

        let fine_cell_size = cell_size.div(Int::TWO)?;
        if !fine_cell_size.is_positive() {
            return Err(WalkabilityError::CellTooSmall { cell_size });
        }
        if !cell_size.rem(Int::TWO)?.is_zero() {
            return Err(WalkabilityError::OddCellSize { cell_size });
        }

        let columns = obstacles
            .columns()
            .checked_mul(2)
            .ok_or(GridError::TooManyCells)?;
        let rows = obstacles
            .rows()
            .checked_mul(2)
            .ok_or(GridError::TooManyCells)?;
        let mut grid = Matrix::empty(columns, rows)?;

        let bounds = WorldBounds {
            width: Int::new(i64::from(obstacles.columns())).mul(cell_size)?,
            height: Int::new(i64::from(obstacles.rows())).mul(cell_size)?,
            cell_size,
        };
        let radius = Circle::new(Pt::ZERO, body_diameter).radius()?;

        for fine in grid.coords().collect::<Vec<_>>() {
            let center = fine.world_center(fine_cell_size)?;
            if !bounds.footprint_is_clear(obstacles, center, radius)? {
                grid.set(fine, Int::ONE)?;
            }
        }

        debug!(
            "walkability derived: {}x{} fine cells, {} blocked for diameter {}",
            columns,
            rows,
            grid.count_blocked(),
            body_diameter
        );

        Ok(Self {
            grid,
            fine_cell_size,
        })
    }

    /// The fine grid, zero where walkable.
    #[must_use]
    pub fn grid(&self) -> &Matrix {
        &self.grid
    }

    /// Consumes the helper, returning the fine grid.
    #[must_use]
    pub fn into_grid(self) -> Matrix {
        self.grid
    }

    /// Side length of one fine cell in ticks.
    #[must_use]
    pub const fn fine_cell_size(&self) -> Int {
        self.fine_cell_size
    }

    /// Reports whether a body may rest centred on `cell`.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.grid.is_free(cell)
    }

    /// World position of a fine cell's center.
    pub fn cell_center(&self, cell: CellCoord) -> Result<Pt, ArithmeticError> {
        cell.world_center(self.fine_cell_size)
    }

    /// Fine cell containing `point`, or `None` outside the grid.
    #[must_use]
    pub fn cell_containing(&self, point: Pt) -> Option<CellCoord> {
        if point.x.is_negative() || point.y.is_negative() {
            return None;
        }
        let size = self.fine_cell_size.raw();
        let column = u32::try_from(point.x.raw() / size).ok()?;
        let row = u32::try_from(point.y.raw() / size).ok()?;
        let cell = CellCoord::new(column, row);
        self.grid.contains(cell).then_some(cell)
    }
}

/// Extent of the obstacle grid in world ticks.
#[derive(Clone, Copy, Debug)]
struct WorldBounds {
    width: Int,
    height: Int,
    cell_size: Int,
}

impl WorldBounds {
    fn footprint_is_clear(
        self,
        obstacles: &Matrix,
        center: Pt,
        radius: Int,
    ) -> Result<bool, ArithmeticError> {
        let left = center.x.sub(radius)?;
        let right = center.x.add(radius)?;
        let top = center.y.sub(radius)?;
        let bottom = center.y.add(radius)?;

        if left.is_negative() || top.is_negative() || right > self.width || bottom > self.height {
            return Ok(false);
        }

        let Some((first_column, last_column)) = self.covered(left, right)? else {
            return Ok(false);
        };
        let Some((first_row, last_row)) = self.covered(top, bottom)? else {
            return Ok(false);
        };

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                if !obstacles.is_free(CellCoord::new(column, row)) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Obstacle cells whose interior overlaps `[low, high]` on one axis.
    /// Cell `i` spans `[i * size, (i + 1) * size)`, so a span ending exactly
    /// on a cell boundary does not reach the next cell.
    fn covered(self, low: Int, high: Int) -> Result<Option<(u32, u32)>, ArithmeticError> {
        let first = low.raw() / self.cell_size.raw();
        let last = if high > low {
            high.dec()?.raw() / self.cell_size.raw()
        } else {
            first
        };
        Ok(u32::try_from(first).ok().zip(u32::try_from(last).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::{WalkabilityError, WalkabilityGrid};
    use rally_core::{CellCoord, Int, Matrix, Pt};

    fn unit(value: i64) -> Int {
        Int::from_units(value).expect("in range")
    }

    fn blocked_cells(walkability: &WalkabilityGrid) -> Vec<CellCoord> {
        walkability
            .grid()
            .coords()
            .filter(|cell| !walkability.is_walkable(*cell))
            .collect()
    }

    #[test]
    fn small_body_only_loses_the_obstacle_footprint() {
        let obstacles =
            Matrix::from_rows(&[[0_i64, 0, 0], [0, 1, 0], [0, 0, 0]]).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(10), unit(4)).expect("derive");

        assert_eq!(walkability.grid().columns(), 6);
        assert_eq!(walkability.grid().rows(), 6);
        assert_eq!(walkability.fine_cell_size(), unit(5));
        assert_eq!(
            blocked_cells(&walkability),
            vec![
                CellCoord::new(2, 2),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
                CellCoord::new(3, 3),
            ]
        );
    }

    #[test]
    fn wide_body_keeps_clear_of_walls_and_obstacles() {
        let obstacles =
            Matrix::from_rows(&[[0_i64, 0, 0], [0, 1, 0], [0, 0, 0]]).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(10), unit(6)).expect("derive");

        assert!(!walkability.is_walkable(CellCoord::new(0, 0)));
        assert!(!walkability.is_walkable(CellCoord::new(1, 1)));
        assert_eq!(blocked_cells(&walkability).len(), 36);
    }

    #[test]
    fn touching_an_obstacle_face_is_allowed() {
        let obstacles = Matrix::from_rows(&[[0_i64, 1]]).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(20), unit(10)).expect("derive");

        assert!(walkability.is_walkable(CellCoord::new(1, 0)));
        assert!(walkability.is_walkable(CellCoord::new(1, 1)));
        assert!(!walkability.is_walkable(CellCoord::new(2, 0)));
        assert!(walkability.is_walkable(CellCoord::new(0, 0)));
    }

    #[test]
    fn zero_diameter_checks_the_containing_cell() {
        let obstacles = Matrix::from_rows(&[[0_i64, 1], [0, 0]]).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(10), Int::ZERO).expect("derive");

        assert_eq!(
            blocked_cells(&walkability),
            vec![
                CellCoord::new(2, 0),
                CellCoord::new(3, 0),
                CellCoord::new(2, 1),
                CellCoord::new(3, 1),
            ]
        );
    }

    #[test]
    fn fine_cells_map_back_to_world_points() {
        let obstacles = Matrix::empty(2, 2).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(10), unit(2)).expect("derive");

        let center = walkability
            .cell_center(CellCoord::new(3, 1))
            .expect("in range");
        assert_eq!(center, Pt::new(Int::new(17_500), Int::new(7_500)));
        assert_eq!(
            walkability.cell_containing(center),
            Some(CellCoord::new(3, 1))
        );
        assert_eq!(walkability.cell_containing(Pt::from_raw(-1, 0)), None);
        assert_eq!(walkability.cell_containing(Pt::from_raw(20_000, 0)), None);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let obstacles = Matrix::empty(2, 2).expect("grid");
        assert_eq!(
            WalkabilityGrid::derive(&obstacles, Int::ONE, unit(1)),
            Err(WalkabilityError::CellTooSmall {
                cell_size: Int::ONE
            })
        );
        assert_eq!(
            WalkabilityGrid::derive(&obstacles, Int::new(3), Int::ZERO),
            Err(WalkabilityError::OddCellSize {
                cell_size: Int::new(3)
            })
        );
        assert_eq!(
            WalkabilityGrid::derive(&obstacles, unit(10), Int::new(-1)),
            Err(WalkabilityError::NegativeDiameter {
                diameter: Int::new(-1)
            })
        );
    }

    #[test]
    fn fine_cells_tile_odd_unit_cell_sizes() {
        let obstacles = Matrix::from_rows(&[[0_i64, 1]]).expect("grid");
        let walkability =
            WalkabilityGrid::derive(&obstacles, unit(3), Int::ZERO).expect("derive");

        assert_eq!(walkability.fine_cell_size(), Int::new(1_500));
        assert!(walkability.is_walkable(CellCoord::new(0, 0)));
        assert!(walkability.is_walkable(CellCoord::new(1, 0)));
        assert!(!walkability.is_walkable(CellCoord::new(2, 0)));
        assert!(!walkability.is_walkable(CellCoord::new(3, 0)));

        let center = walkability
            .cell_center(CellCoord::new(2, 0))
            .expect("in range");
        assert_eq!(center, Pt::new(Int::new(3_750), Int::new(750)));
        assert_eq!(
            walkability.cell_containing(center),
            Some(CellCoord::new(2, 0))
        );
    }
}
