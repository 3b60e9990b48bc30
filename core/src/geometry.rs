//! Point, vector and shape primitives built on checked scalar arithmetic.

use serde::{Deserialize, Serialize};

use crate::scalar::{ArithmeticResult, Int};

/// Location or displacement in world space, measured in raw ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pt {
    /// Horizontal component; grows to the right.
    pub x: Int,
    /// Vertical component; grows downward.
    pub y: Int,
}

impl Pt {
    /// The origin, also the zero vector.
    pub const ZERO: Self = Self::new(Int::ZERO, Int::ZERO);

    /// Creates a point from two scalars.
    #[must_use]
    pub const fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }

    /// Creates a point from raw tick components.
    #[must_use]
    pub const fn from_raw(x: i64, y: i64) -> Self {
        Self::new(Int::new(x), Int::new(y))
    }

    /// Creates a point from whole game units.
    pub fn from_units(x: i64, y: i64) -> ArithmeticResult<Self> {
        Ok(Self::new(Int::from_units(x)?, Int::from_units(y)?))
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Component-wise sum.
    pub fn add(self, other: Self) -> ArithmeticResult<Self> {
        Ok(Self::new(self.x.add(other.x)?, self.y.add(other.y)?))
    }

    /// Component-wise difference `self - other`.
    pub fn sub(self, other: Self) -> ArithmeticResult<Self> {
        Ok(Self::new(self.x.sub(other.x)?, self.y.sub(other.y)?))
    }

    /// Multiplies both components by `multiply_by`, then divides by
    /// `divide_by`.
    ///
    /// The multiplication happens first so the truncating division sees the
    /// full-precision product.
    pub fn scale(self, multiply_by: Int, divide_by: Int) -> ArithmeticResult<Self> {
        Ok(Self::new(
            self.x.mul(multiply_by)?.div(divide_by)?,
            self.y.mul(multiply_by)?.div(divide_by)?,
        ))
    }

    /// Dot product of two vectors.
    pub fn dot(self, other: Self) -> ArithmeticResult<Int> {
        self.x.mul(other.x)?.add(self.y.mul(other.y)?)
    }

    /// Squared length of the vector.
    pub fn squared_len(self) -> ArithmeticResult<Int> {
        self.x.square()?.add(self.y.square()?)
    }

    /// Length of the vector, rounded down.
    pub fn len(self) -> ArithmeticResult<Int> {
        self.squared_len()?.sqrt()
    }

    /// Rescales the vector to exactly `new_len`.
    ///
    /// The zero vector has no direction and is returned unchanged.
    pub fn set_len(self, new_len: Int) -> ArithmeticResult<Self> {
        let len = self.len()?;
        if len.is_zero() {
            return Ok(self);
        }
        self.scale(new_len, len)
    }

    /// Lengthens (or, for negative `extra`, shortens) the vector by an
    /// absolute amount. Shortening past zero yields the zero vector.
    pub fn add_len(self, extra: Int) -> ArithmeticResult<Self> {
        let len = self.len()?;
        if len.is_zero() {
            return Ok(self);
        }

        let new_len = len.add(extra)?;
        if !new_len.is_positive() {
            return Ok(Self::ZERO);
        }
        self.scale(new_len, len)
    }
}

/// Squared distance between two points.
pub fn squared_distance(a: Pt, b: Pt) -> ArithmeticResult<Int> {
    b.sub(a)?.squared_len()
}

/// Vector pointing from `from` to `to`.
pub fn direction_to(from: Pt, to: Pt) -> ArithmeticResult<Pt> {
    to.sub(from)
}

/// Directed segment between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// First endpoint.
    pub start: Pt,
    /// Second endpoint.
    pub end: Pt,
}

impl Line {
    /// Creates a segment from `start` to `end`.
    #[must_use]
    pub const fn new(start: Pt, end: Pt) -> Self {
        Self { start, end }
    }

    /// Vector from the start to the end of the segment.
    pub fn direction(self) -> ArithmeticResult<Pt> {
        direction_to(self.start, self.end)
    }

    /// Reports whether both endpoints coincide.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.start == self.end
    }
}

/// Circle described by its center and diameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the circle.
    pub center: Pt,
    /// Full diameter in raw ticks.
    pub diameter: Int,
}

impl Circle {
    /// Creates a circle.
    #[must_use]
    pub const fn new(center: Pt, diameter: Int) -> Self {
        Self { center, diameter }
    }

    /// Radius rounded up, `diameter / 2 + diameter % 2`.
    ///
    /// Rounding up keeps an odd diameter from shrinking the body, so
    /// collision queries err toward touching.
    pub fn radius(self) -> ArithmeticResult<Int> {
        self.diameter
            .div(Int::TWO)?
            .add(self.diameter.rem(Int::TWO)?)
    }

    /// Reports whether `point` lies inside or on the circle.
    pub fn contains(self, point: Pt) -> ArithmeticResult<bool> {
        let reach = self.radius()?.square()?;
        Ok(squared_distance(self.center, point)? <= reach)
    }
}

/// Axis-aligned square described by its center and side length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// Center of the square.
    pub center: Pt,
    /// Side length in raw ticks.
    pub size: Int,
}

impl Square {
    /// Creates a square.
    #[must_use]
    pub const fn new(center: Pt, size: Int) -> Self {
        Self { center, size }
    }

    /// Half of the side length, rounded toward zero.
    pub fn half_size(self) -> ArithmeticResult<Int> {
        self.size.div(Int::TWO)
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right.
    pub fn corners(self) -> ArithmeticResult<[Pt; 4]> {
        let half = self.half_size()?;
        let left = self.center.x.sub(half)?;
        let right = self.center.x.add(half)?;
        let top = self.center.y.sub(half)?;
        let bottom = self.center.y.add(half)?;
        Ok([
            Pt::new(left, top),
            Pt::new(right, top),
            Pt::new(left, bottom),
            Pt::new(right, bottom),
        ])
    }

    /// Reports whether `point` lies inside or on the square.
    pub fn contains(self, point: Pt) -> ArithmeticResult<bool> {
        let half = self.half_size()?;
        let dx = point.x.sub(self.center.x)?.abs()?;
        let dy = point.y.sub(self.center.y)?.abs()?;
        Ok(dx <= half && dy <= half)
    }
}

#[cfg(test)]
mod tests {
    use super::{direction_to, squared_distance, Circle, Line, Pt, Square};
    use crate::scalar::Int;

    #[test]
    fn squared_distance_and_length_agree() {
        let a = Pt::from_raw(1, 2);
        let b = Pt::from_raw(4, 6);
        assert_eq!(squared_distance(a, b), Ok(Int::new(25)));
        assert_eq!(direction_to(a, b).and_then(Pt::len), Ok(Int::new(5)));
    }

    #[test]
    fn scale_multiplies_before_dividing() {
        let vector = Pt::from_raw(1, 3);
        assert_eq!(
            vector.scale(Int::new(2), Int::new(3)),
            Ok(Pt::from_raw(0, 2))
        );
    }

    #[test]
    fn set_len_rescales_exact_vectors() {
        let vector = Pt::from_raw(3_000, 4_000);
        assert_eq!(vector.set_len(Int::new(10_000)), Ok(Pt::from_raw(6_000, 8_000)));
        assert_eq!(Pt::ZERO.set_len(Int::new(10)), Ok(Pt::ZERO));
    }

    #[test]
    fn add_len_clamps_at_zero() {
        let vector = Pt::from_raw(0, 5_000);
        assert_eq!(vector.add_len(Int::new(1_000)), Ok(Pt::from_raw(0, 6_000)));
        assert_eq!(vector.add_len(Int::new(-2_000)), Ok(Pt::from_raw(0, 3_000)));
        assert_eq!(vector.add_len(Int::new(-9_000)), Ok(Pt::ZERO));
    }

    #[test]
    fn dot_product_composes_checked_operations() {
        assert_eq!(
            Pt::from_raw(2, -3).dot(Pt::from_raw(4, 5)),
            Ok(Int::new(-7))
        );
        assert!(Pt::new(Int::MAX, Int::ZERO)
            .dot(Pt::from_raw(2, 0))
            .is_err());
    }

    #[test]
    fn circle_radius_rounds_up() {
        let odd = Circle::new(Pt::ZERO, Int::new(11));
        let even = Circle::new(Pt::ZERO, Int::new(10));
        assert_eq!(odd.radius(), Ok(Int::new(6)));
        assert_eq!(even.radius(), Ok(Int::new(5)));
        assert_eq!(odd.contains(Pt::from_raw(6, 0)), Ok(true));
        assert_eq!(even.contains(Pt::from_raw(4, 4)), Ok(false));
    }

    #[test]
    fn square_corners_surround_center() {
        let square = Square::new(Pt::from_raw(10, 20), Int::new(4));
        assert_eq!(
            square.corners(),
            Ok([
                Pt::from_raw(8, 18),
                Pt::from_raw(12, 18),
                Pt::from_raw(8, 22),
                Pt::from_raw(12, 22),
            ])
        );
        assert_eq!(square.contains(Pt::from_raw(12, 22)), Ok(true));
        assert_eq!(square.contains(Pt::from_raw(13, 20)), Ok(false));
    }

    #[test]
    fn degenerate_line_detected() {
        let point = Pt::from_raw(3, 3);
        assert!(Line::new(point, point).is_degenerate());
        assert!(!Line::new(point, Pt::ZERO).is_degenerate());
    }
}
