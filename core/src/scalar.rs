//! Checked scaled-integer scalar used for every world-space quantity.
//!
//! Values are stored as raw ticks inside an `i64`; one game unit spans
//! [`TICKS_PER_UNIT`] ticks. Every operation that could leave the `i64` range
//! reports an [`ArithmeticError`] instead of wrapping, so a desynchronising
//! numeric fault surfaces where it happens rather than ticks later.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of raw ticks that make up one game unit.
pub const TICKS_PER_UNIT: i64 = 1_000;

/// Operation that exceeded the representable range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Scalar addition.
    Add,
    /// Scalar subtraction.
    Subtract,
    /// Scalar multiplication.
    Multiply,
    /// Multiplication of a scalar with itself.
    Square,
    /// Sign inversion.
    Negate,
    /// Absolute value.
    Absolute,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "addition",
            Self::Subtract => "subtraction",
            Self::Multiply => "multiplication",
            Self::Square => "squaring",
            Self::Negate => "negation",
            Self::Absolute => "absolute value",
        };
        f.write_str(name)
    }
}

/// Failures reported by the checked scalar arithmetic.
///
/// None of these are recoverable gameplay conditions. They signal either a
/// programming error or a coordinate outside the supported range, and the
/// variants stay distinct so callers can tell which guard tripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Addition, subtraction, multiplication, negation or absolute value left
    /// the `i64` range.
    #[error("arithmetic overflow during {op}")]
    ArithmeticOverflow {
        /// Operation that overflowed.
        op: Operation,
    },
    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The single overflowing division, `i64::MIN / -1`.
    #[error("division overflow: minimum value divided by -1")]
    DivisionOverflow,
    /// Increment of the maximum representable value.
    #[error("increment overflow")]
    IncrementOverflow,
    /// Decrement of the minimum representable value.
    #[error("decrement overflow")]
    DecrementOverflow,
    /// Square root requested for a negative value.
    #[error("square root of negative value {value}")]
    NegativeSquareRoot {
        /// Raw value passed to the square root.
        value: i64,
    },
}

/// Result alias used throughout the scalar and geometry layers.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

const fn overflow(op: Operation) -> ArithmeticError {
    ArithmeticError::ArithmeticOverflow { op }
}

/// Scalar world quantity measured in raw ticks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Int(i64);

#[allow(clippy::should_implement_trait)]
impl Int {
    /// Zero ticks.
    pub const ZERO: Self = Self(0);
    /// A single raw tick.
    pub const ONE: Self = Self(1);
    /// Two raw ticks.
    pub const TWO: Self = Self(2);
    /// One game unit expressed in raw ticks.
    pub const UNIT: Self = Self(TICKS_PER_UNIT);
    /// Smallest representable value.
    pub const MIN: Self = Self(i64::MIN);
    /// Largest representable value.
    pub const MAX: Self = Self(i64::MAX);

    /// Wraps a raw tick count.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Converts whole game units into raw ticks.
    pub fn from_units(units: i64) -> ArithmeticResult<Self> {
        Self(units).mul(Self::UNIT)
    }

    /// Raw tick count.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole game units, truncated toward zero.
    #[must_use]
    pub const fn whole_units(self) -> i64 {
        self.0 / TICKS_PER_UNIT
    }

    /// Reports whether the value is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Reports whether the value is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Reports whether the value is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `-1`, `0` or `1` depending on the sign of the value.
    #[must_use]
    pub const fn signum(self) -> Self {
        Self(self.0.signum())
    }

    /// Checked addition.
    pub fn add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(overflow(Operation::Add))
    }

    /// Checked subtraction.
    pub fn sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(overflow(Operation::Subtract))
    }

    /// Checked multiplication. A zero operand short-circuits to zero.
    pub fn mul(self, rhs: Self) -> ArithmeticResult<Self> {
        if self.0 == 0 || rhs.0 == 0 {
            return Ok(Self::ZERO);
        }

        self.0
            .checked_mul(rhs.0)
            .map(Self)
            .ok_or(overflow(Operation::Multiply))
    }

    /// Checked division truncating toward zero.
    pub fn div(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.0 == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        self.0
            .checked_div(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::DivisionOverflow)
    }

    /// Checked remainder; the sign follows the dividend.
    pub fn rem(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.0 == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        self.0
            .checked_rem(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::DivisionOverflow)
    }

    /// Checked square of the value.
    pub fn square(self) -> ArithmeticResult<Self> {
        self.0
            .checked_mul(self.0)
            .map(Self)
            .ok_or(overflow(Operation::Square))
    }

    /// Integer square root, rounded down.
    ///
    /// The root is seeded from an `f64` estimate, which can land one tick
    /// off once the input exceeds the 53-bit mantissa. The estimate is then
    /// settled with integer comparisons so `sqrt(a * a) == |a|` holds across
    /// the whole non-overflowing range.
    pub fn sqrt(self) -> ArithmeticResult<Self> {
        if self.0 < 0 {
            return Err(ArithmeticError::NegativeSquareRoot { value: self.0 });
        }

        let target = i128::from(self.0);
        let mut root = i128::from((self.0 as f64).sqrt() as i64);
        while root * root > target {
            root -= 1;
        }
        while (root + 1) * (root + 1) <= target {
            root += 1;
        }

        Ok(Self(root as i64))
    }

    /// Checked absolute value.
    pub fn abs(self) -> ArithmeticResult<Self> {
        self.0
            .checked_abs()
            .map(Self)
            .ok_or(overflow(Operation::Absolute))
    }

    /// Checked negation.
    pub fn neg(self) -> ArithmeticResult<Self> {
        self.0
            .checked_neg()
            .map(Self)
            .ok_or(overflow(Operation::Negate))
    }

    /// Adds one raw tick.
    pub fn inc(self) -> ArithmeticResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(ArithmeticError::IncrementOverflow)
    }

    /// Removes one raw tick.
    pub fn dec(self) -> ArithmeticResult<Self> {
        self.0
            .checked_sub(1)
            .map(Self)
            .ok_or(ArithmeticError::DecrementOverflow)
    }
}

impl From<i64> for Int {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        let ticks = TICKS_PER_UNIT.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:03}",
            magnitude / ticks,
            magnitude % ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ArithmeticError, Int, Operation};
    use proptest::prelude::*;

    #[test]
    fn addition_reports_overflow_at_both_extremes() {
        assert_eq!(
            Int::MAX.add(Int::ONE),
            Err(ArithmeticError::ArithmeticOverflow { op: Operation::Add })
        );
        assert_eq!(
            Int::MIN.add(Int::new(-1)),
            Err(ArithmeticError::ArithmeticOverflow { op: Operation::Add })
        );
        assert_eq!(Int::MAX.add(Int::MIN), Ok(Int::new(-1)));
    }

    #[test]
    fn subtraction_reports_overflow() {
        assert_eq!(
            Int::MIN.sub(Int::ONE),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Subtract
            })
        );
        assert_eq!(
            Int::ZERO.sub(Int::MIN),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Subtract
            })
        );
    }

    #[test]
    fn multiplication_short_circuits_zero_and_reports_overflow() {
        assert_eq!(Int::MAX.mul(Int::ZERO), Ok(Int::ZERO));
        assert_eq!(Int::ZERO.mul(Int::MIN), Ok(Int::ZERO));
        assert_eq!(
            Int::MAX.mul(Int::TWO),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Multiply
            })
        );
        assert_eq!(
            Int::MIN.mul(Int::new(-1)),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Multiply
            })
        );
        assert_eq!(Int::new(-7).mul(Int::new(6)), Ok(Int::new(-42)));
    }

    #[test]
    fn division_distinguishes_zero_divisor_and_overflow() {
        assert_eq!(
            Int::new(5).div(Int::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            Int::MIN.div(Int::new(-1)),
            Err(ArithmeticError::DivisionOverflow)
        );
        assert_eq!(Int::new(-7).div(Int::new(2)), Ok(Int::new(-3)));
        assert_eq!(Int::new(7).div(Int::new(-2)), Ok(Int::new(-3)));
    }

    #[test]
    fn remainder_follows_division_rules() {
        assert_eq!(
            Int::new(5).rem(Int::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            Int::MIN.rem(Int::new(-1)),
            Err(ArithmeticError::DivisionOverflow)
        );
        assert_eq!(Int::new(-7).rem(Int::new(2)), Ok(Int::new(-1)));
    }

    #[test]
    fn increment_and_decrement_report_their_own_errors() {
        assert_eq!(Int::MAX.inc(), Err(ArithmeticError::IncrementOverflow));
        assert_eq!(Int::MIN.dec(), Err(ArithmeticError::DecrementOverflow));
        assert_eq!(Int::ZERO.inc(), Ok(Int::ONE));
        assert_eq!(Int::ZERO.dec(), Ok(Int::new(-1)));
    }

    #[test]
    fn sign_operations_reject_minimum_value() {
        assert_eq!(
            Int::MIN.abs(),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Absolute
            })
        );
        assert_eq!(
            Int::MIN.neg(),
            Err(ArithmeticError::ArithmeticOverflow {
                op: Operation::Negate
            })
        );
        assert_eq!(Int::new(-12).abs(), Ok(Int::new(12)));
        assert_eq!(Int::new(12).neg(), Ok(Int::new(-12)));
    }

    #[test]
    fn square_root_floors_and_rejects_negative_input() {
        assert_eq!(Int::new(0).sqrt(), Ok(Int::ZERO));
        assert_eq!(Int::new(15).sqrt(), Ok(Int::new(3)));
        assert_eq!(Int::new(16).sqrt(), Ok(Int::new(4)));
        assert_eq!(Int::MAX.sqrt(), Ok(Int::new(3_037_000_499)));
        assert_eq!(
            Int::new(-4).sqrt(),
            Err(ArithmeticError::NegativeSquareRoot { value: -4 })
        );
    }

    #[test]
    fn units_convert_to_ticks() {
        assert_eq!(Int::from_units(3), Ok(Int::new(3_000)));
        assert_eq!(Int::new(-2_500).whole_units(), -2);
        assert!(Int::from_units(i64::MAX).is_err());
    }

    #[test]
    fn display_renders_game_units() {
        assert_eq!(Int::new(12_345).to_string(), "12.345");
        assert_eq!(Int::new(-500).to_string(), "-0.500");
        assert_eq!(Int::ZERO.to_string(), "0.000");
    }

    #[test]
    fn scalar_round_trips_through_bincode() {
        let value = Int::new(-123_456);
        let bytes = bincode::serialize(&value).expect("serialize");
        let restored: Int = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, value);
    }

    proptest! {
        #[test]
        fn addition_matches_wide_arithmetic(a in any::<i64>(), b in any::<i64>()) {
            let wide = i128::from(a) + i128::from(b);
            let result = Int::new(a).add(Int::new(b));
            match i64::try_from(wide) {
                Ok(expected) => prop_assert_eq!(result, Ok(Int::new(expected))),
                Err(_) => prop_assert_eq!(
                    result,
                    Err(ArithmeticError::ArithmeticOverflow { op: Operation::Add })
                ),
            }
        }

        #[test]
        fn multiplication_matches_wide_arithmetic(a in any::<i64>(), b in any::<i64>()) {
            let wide = i128::from(a) * i128::from(b);
            let result = Int::new(a).mul(Int::new(b));
            match i64::try_from(wide) {
                Ok(expected) => prop_assert_eq!(result, Ok(Int::new(expected))),
                Err(_) => prop_assert_eq!(
                    result,
                    Err(ArithmeticError::ArithmeticOverflow { op: Operation::Multiply })
                ),
            }
        }

        #[test]
        fn square_root_round_trips(value in -3_037_000_499i64..=3_037_000_499) {
            let square = Int::new(value).square().expect("square fits");
            prop_assert_eq!(square.sqrt(), Ok(Int::new(value.abs())));
        }

        #[test]
        fn square_root_is_monotonic(a in 0i64..=i64::MAX, b in 0i64..=i64::MAX) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_root = Int::new(low).sqrt().expect("non-negative");
            let high_root = Int::new(high).sqrt().expect("non-negative");
            prop_assert!(low_root <= high_root);
        }
    }
}
