//! Dense obstacle grids and the cell coordinates that address them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geometry::Pt,
    scalar::{ArithmeticResult, Int},
};

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the Chebyshev distance, the step count when diagonal moves
    /// cost the same as straight ones.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// World position of the cell's top-left corner for the given cell size.
    pub fn world_origin(self, cell_size: Int) -> ArithmeticResult<Pt> {
        Ok(Pt::new(
            Int::new(i64::from(self.column)).mul(cell_size)?,
            Int::new(i64::from(self.row)).mul(cell_size)?,
        ))
    }

    /// World position of the cell's center for the given cell size.
    pub fn world_center(self, cell_size: Int) -> ArithmeticResult<Pt> {
        let half = cell_size.div(Int::TWO)?;
        self.world_origin(cell_size)?.add(Pt::new(half, half))
    }
}

/// Reasons a grid could not be built or modified.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The grid would contain no cells.
    #[error("grid must contain at least one cell")]
    EmptyGrid,
    /// A row's length disagrees with the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// The dimensions do not fit the addressable cell range.
    #[error("grid dimensions exceed the addressable cell range")]
    TooManyCells,
    /// The stored cells disagree with the declared dimensions.
    #[error("grid of {columns}x{rows} holds {found} cells")]
    CellCountMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Number of cells present.
        found: usize,
    },
    /// A write targeted a cell outside the grid.
    #[error("cell ({}, {}) lies outside the grid", .cell.column(), .cell.row())]
    OutOfBounds {
        /// Cell that was addressed.
        cell: CellCoord,
    },
}

/// Column and row extent of a grid, owning the row-major conversion between
/// cell coordinates and linear indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridShape {
    columns: u32,
    rows: u32,
}

impl GridShape {
    /// Creates a shape of `columns` by `rows` cells.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(self) -> u32 {
        self.rows
    }

    /// Total number of cells, or `None` when it exceeds `usize`.
    #[must_use]
    pub fn cell_count(self) -> Option<usize> {
        usize::try_from(u64::from(self.columns) * u64::from(self.rows)).ok()
    }

    /// Reports whether the cell lies inside the shape.
    #[must_use]
    pub const fn contains(self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major linear index of the cell, if it lies inside the shape.
    #[must_use]
    pub fn index_of(self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell addressed by a row-major linear index.
    #[must_use]
    pub fn coord_of(self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count()? {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Row-major grid of scalar cells where zero marks free space and any other
/// value marks an obstacle.
///
/// Deserialization checks that the cell count matches the dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    columns: u32,
    rows: u32,
    cells: Vec<Int>,
}

/// Unchecked wire form of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    columns: u32,
    rows: u32,
    cells: Vec<Int>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = GridError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        if raw.columns == 0 || raw.rows == 0 {
            return Err(GridError::EmptyGrid);
        }
        let expected = GridShape::new(raw.columns, raw.rows)
            .cell_count()
            .ok_or(GridError::TooManyCells)?;
        if raw.cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                columns: raw.columns,
                rows: raw.rows,
                found: raw.cells.len(),
            });
        }

        Ok(Self {
            columns: raw.columns,
            rows: raw.rows,
            cells: raw.cells,
        })
    }
}

impl Matrix {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(columns: u32, rows: u32, value: Int) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::EmptyGrid);
        }

        let count = GridShape::new(columns, rows)
            .cell_count()
            .ok_or(GridError::TooManyCells)?;
        Ok(Self {
            columns,
            rows,
            cells: vec![value; count],
        })
    }

    /// Creates an all-free grid.
    pub fn empty(columns: u32, rows: u32) -> Result<Self, GridError> {
        Self::filled(columns, rows, Int::ZERO)
    }

    /// Builds a grid from rows of raw cell values, top row first.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, GridError>
    where
        R: AsRef<[i64]>,
    {
        let Some(first) = rows.first() else {
            return Err(GridError::EmptyGrid);
        };
        let expected = first.as_ref().len();
        if expected == 0 {
            return Err(GridError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(GridError::RaggedRow {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend(row.iter().copied().map(Int::new));
        }

        Ok(Self {
            columns: u32::try_from(expected).map_err(|_| GridError::TooManyCells)?,
            rows: u32::try_from(rows.len()).map_err(|_| GridError::TooManyCells)?,
            cells,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn shape(&self) -> GridShape {
        GridShape::new(self.columns, self.rows)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell values in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Int] {
        &self.cells
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        self.shape().contains(cell)
    }

    /// Row-major linear index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        self.shape().index_of(cell)
    }

    /// Cell addressed by a row-major linear index.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> Option<CellCoord> {
        self.shape().coord_of(index)
    }

    /// Value stored in the cell, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Int> {
        self.index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the value stored in the cell.
    pub fn set(&mut self, cell: CellCoord, value: Int) -> Result<(), GridError> {
        let index = self
            .index_of(cell)
            .ok_or(GridError::OutOfBounds { cell })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Reports whether the cell lies inside the grid and holds zero.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some_and(Int::is_zero)
    }

    /// Reports whether the cell is outside the grid or holds an obstacle.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        !self.is_free(cell)
    }

    /// Number of obstacle cells.
    #[must_use]
    pub fn count_blocked(&self) -> usize {
        self.cells.iter().filter(|value| !value.is_zero()).count()
    }

    /// Iterator over every cell coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.columns).map(move |column| CellCoord::new(column, row)))
    }

    /// Grid mirrored across its main diagonal.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for column in 0..self.columns {
            for row in 0..self.rows {
                cells.push(
                    self.get(CellCoord::new(column, row))
                        .unwrap_or(Int::ZERO),
                );
            }
        }

        Self {
            columns: self.rows,
            rows: self.columns,
            cells,
        }
    }
}
