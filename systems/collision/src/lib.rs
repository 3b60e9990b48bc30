#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous collision queries for circular bodies moving among static
//! square obstacles.
//!
//! A moving circle is reduced to a moving point by growing each square with
//! the circle's radius (a Minkowski sum): four straight edges pushed outward
//! and four corner circles of the body's own diameter. The first contact
//! along the travel segment is the nearest intersection with any of those
//! eight features. Rounding throughout prefers reporting a spurious contact
//! over missing a real one.

pub mod intersect;

use log::{debug, trace};
use rally_core::{
    direction_to, squared_distance, ArithmeticResult, Circle, Int, Line, Matrix, Pt, Square,
};

pub use intersect::{intersect_circle, intersect_horizontal, intersect_vertical};

/// Point of first contact along a travel segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Contact {
    /// Position of the moving body's center when it first touches the
    /// obstacle.
    pub point: Pt,
    /// Outward surface normal at the contact. Edge normals are one game unit
    /// long; corner normals point from the corner to the contact point.
    pub normal: Pt,
}

/// Nearest contact among a set of obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObstacleContact {
    /// Index of the obstacle that was hit within the queried slice.
    pub obstacle: usize,
    /// Contact against that obstacle.
    pub contact: Contact,
}

/// Sweeps a circle of `diameter` along `travel` against a single square.
///
/// Contacts located exactly at `travel.start` are ignored so a body resting
/// against an obstacle can slide away from it. Returns `Ok(None)` when the
/// body reaches `travel.end` untouched.
pub fn circle_square_collision(
    travel: Line,
    diameter: Int,
    square: Square,
) -> ArithmeticResult<Option<Contact>> {
    let radius = Circle::new(travel.start, diameter).radius()?;
    let reach = square.half_size()?.add(radius)?;
    let corners = square.corners()?;
    let [top_left, top_right, bottom_left, bottom_right] = corners;

    let left = square.center.x.sub(reach)?;
    let right = square.center.x.add(reach)?;
    let top = square.center.y.sub(reach)?;
    let bottom = square.center.y.add(reach)?;

    let mut nearest = NearestContact::new(travel.start);

    let vertical_edges = [
        (
            Line::new(Pt::new(left, top_left.y), Pt::new(left, bottom_left.y)),
            Pt::new(Int::UNIT.neg()?, Int::ZERO),
        ),
        (
            Line::new(Pt::new(right, top_right.y), Pt::new(right, bottom_right.y)),
            Pt::new(Int::UNIT, Int::ZERO),
        ),
    ];
    for (edge, normal) in vertical_edges {
        if let Some(point) = intersect_vertical(travel, edge)? {
            nearest.offer(point, normal)?;
        }
    }

    let horizontal_edges = [
        (
            Line::new(Pt::new(top_left.x, top), Pt::new(top_right.x, top)),
            Pt::new(Int::ZERO, Int::UNIT.neg()?),
        ),
        (
            Line::new(Pt::new(bottom_left.x, bottom), Pt::new(bottom_right.x, bottom)),
            Pt::new(Int::ZERO, Int::UNIT),
        ),
    ];
    for (edge, normal) in horizontal_edges {
        if let Some(point) = intersect_horizontal(travel, edge)? {
            nearest.offer(point, normal)?;
        }
    }

    for corner in corners {
        if let Some(point) = intersect_circle(travel, Circle::new(corner, diameter))? {
            nearest.offer(point, direction_to(corner, point)?)?;
        }
    }

    Ok(nearest.into_contact())
}

/// Sweeps a circle along `travel` against every square and keeps the contact
/// closest to `travel.start`.
///
/// Ties resolve to the lowest obstacle index so the outcome only depends on
/// the input order.
pub fn nearest_square_collision(
    travel: Line,
    diameter: Int,
    squares: &[Square],
) -> ArithmeticResult<Option<ObstacleContact>> {
    let mut best: Option<(Int, ObstacleContact)> = None;

    for (obstacle, square) in squares.iter().enumerate() {
        let Some(contact) = circle_square_collision(travel, diameter, *square)? else {
            continue;
        };

        let distance = squared_distance(travel.start, contact.point)?;
        if best
            .as_ref()
            .map_or(true, |(best_distance, _)| distance < *best_distance)
        {
            best = Some((distance, ObstacleContact { obstacle, contact }));
        }
    }

    if let Some((_, hit)) = &best {
        trace!(
            "sweep from ({}, {}) hit obstacle {} at ({}, {})",
            travel.start.x,
            travel.start.y,
            hit.obstacle,
            hit.contact.point.x,
            hit.contact.point.y
        );
    }

    Ok(best.map(|(_, hit)| hit))
}

/// Reports whether two circles overlap or touch.
pub fn circles_overlap(a: Circle, b: Circle) -> ArithmeticResult<bool> {
    let reach = a.radius()?.add(b.radius()?)?;
    Ok(squared_distance(a.center, b.center)? <= reach.square()?)
}

/// World-space squares for every obstacle cell of a grid, rebuilt in place.
///
/// Cell `(column, row)` becomes a square of side `cell_size` centred at
/// `((column + 1/2) * cell_size, (row + 1/2) * cell_size)`.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    squares: Vec<Square>,
}

impl ObstacleField {
    /// Creates an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field populated from `grid`.
    pub fn from_grid(grid: &Matrix, cell_size: Int) -> ArithmeticResult<Self> {
        let mut field = Self::new();
        field.rebuild(grid, cell_size)?;
        Ok(field)
    }

    /// Replaces the stored squares with the obstacles of `grid`, reusing the
    /// existing allocation.
    pub fn rebuild(&mut self, grid: &Matrix, cell_size: Int) -> ArithmeticResult<()> {
        self.squares.clear();
        for cell in grid.coords() {
            if grid.is_blocked(cell) {
                self.squares
                    .push(Square::new(cell.world_center(cell_size)?, cell_size));
            }
        }

        debug!(
            "obstacle field rebuilt: {} squares from {}x{} grid",
            self.squares.len(),
            grid.columns(),
            grid.rows()
        );
        Ok(())
    }

    /// Obstacle squares in row-major cell order.
    #[must_use]
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Sweeps a circle along `travel` against every obstacle in the field.
    pub fn sweep(&self, travel: Line, diameter: Int) -> ArithmeticResult<Option<ObstacleContact>> {
        nearest_square_collision(travel, diameter, &self.squares)
    }
}

/// Running minimum over candidate contacts for one sweep.
#[derive(Debug)]
struct NearestContact {
    origin: Pt,
    best: Option<(Int, Contact)>,
}

impl NearestContact {
    fn new(origin: Pt) -> Self {
        Self { origin, best: None }
    }

    fn offer(&mut self, point: Pt, normal: Pt) -> ArithmeticResult<()> {
        let distance = squared_distance(self.origin, point)?;
        if distance.is_zero() {
            return Ok(());
        }

        let closer = self
            .best
            .as_ref()
            .map_or(true, |(best_distance, _)| distance < *best_distance);
        if closer {
            self.best = Some((distance, Contact { point, normal }));
        }
        Ok(())
    }

    fn into_contact(self) -> Option<Contact> {
        self.best.map(|(_, contact)| contact)
    }
}
