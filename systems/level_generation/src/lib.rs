#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded arena generation.
//!
//! Arenas are obstacle grids with a solid border and randomly scattered
//! interior blocks. Randomness comes exclusively from a caller-owned
//! [`ChaCha8Rng`], so replaying a level only requires replaying its seed;
//! [`seed_for_level`] derives that seed from a campaign phrase and the level
//! index.

use log::debug;
use rally_core::{CellCoord, GridError, Int, Matrix};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Smallest arena side that still leaves an interior inside the border.
pub const MIN_ARENA_SIDE: u32 = 3;

/// Shape and obstacle density of a generated arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaParams {
    /// Number of columns including the border.
    pub columns: u32,
    /// Number of rows including the border.
    pub rows: u32,
    /// Chance, in percent, that an interior cell becomes an obstacle.
    pub obstacle_percent: u8,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 12,
            obstacle_percent: 18,
        }
    }
}

impl ArenaParams {
    /// Interior corner cells, kept clear so bodies always have somewhere to
    /// spawn. Ordered top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub const fn spawn_cells(&self) -> [CellCoord; 4] {
        let right = self.columns.saturating_sub(2);
        let bottom = self.rows.saturating_sub(2);
        [
            CellCoord::new(1, 1),
            CellCoord::new(right, 1),
            CellCoord::new(1, bottom),
            CellCoord::new(right, bottom),
        ]
    }

    fn validate(&self) -> Result<(), GenerationError> {
        if self.columns < MIN_ARENA_SIDE || self.rows < MIN_ARENA_SIDE {
            return Err(GenerationError::ArenaTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.obstacle_percent > 100 {
            return Err(GenerationError::DensityOutOfRange {
                percent: self.obstacle_percent,
            });
        }
        Ok(())
    }

    fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }
}

/// Reasons an arena could not be generated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The arena has no interior inside its border.
    #[error("arena of {columns}x{rows} cells has no interior")]
    ArenaTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Obstacle density must be a percentage.
    #[error("obstacle density {percent}% exceeds 100%")]
    DensityOutOfRange {
        /// Requested density.
        percent: u8,
    },
    /// The grid could not be allocated.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Generates a bordered arena, drawing one random number per interior cell
/// that is not a spawn cell, in row-major order.
pub fn generate_arena(
    params: &ArenaParams,
    rng: &mut ChaCha8Rng,
) -> Result<Matrix, GenerationError> {
    params.validate()?;

    let spawns = params.spawn_cells();
    let mut grid = Matrix::empty(params.columns, params.rows)?;
    for cell in grid.coords().collect::<Vec<_>>() {
        let blocked = if params.is_border(cell) {
            true
        } else if spawns.contains(&cell) {
            false
        } else {
            rng.gen_range(0..100_u8) < params.obstacle_percent
        };

        if blocked {
            grid.set(cell, Int::ONE)?;
        }
    }

    debug!(
        "generated {}x{} arena with {} obstacle cells at {}% density",
        params.columns,
        params.rows,
        grid.count_blocked(),
        params.obstacle_percent
    );
    Ok(grid)
}

/// Derives the generator seed for `level` of the campaign named by `phrase`.
///
/// The same phrase and level always produce the same seed on every platform.
#[must_use]
pub fn seed_for_level(phrase: &str, level: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update((phrase.len() as u64).to_le_bytes());
    hasher.update(phrase.as_bytes());
    hasher.update(level.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
