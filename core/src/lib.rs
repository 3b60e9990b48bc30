#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic numeric and spatial contracts shared across the Rally engine.
//!
//! Every world quantity is an [`Int`] counted in raw ticks, with
//! [`TICKS_PER_UNIT`] ticks per game unit, so the authoritative server,
//! predicting clients and recorded replays all compute bit-identical results.
//! Arithmetic never wraps: overflow and division faults surface as
//! [`ArithmeticError`] values. Geometry builds on the scalar layer and grids
//! describe static obstacles for the collision and pathfinding systems.

pub mod geometry;
pub mod grid;
pub mod scalar;

pub use geometry::{direction_to, squared_distance, Circle, Line, Pt, Square};
pub use grid::{CellCoord, GridError, GridShape, Matrix};
pub use scalar::{ArithmeticError, ArithmeticResult, Int, Operation, TICKS_PER_UNIT};
