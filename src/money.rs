//! Fixed-point currency amount with 4 decimal places of internal precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so that monthly
//! accumulation and compounding never drift through floating-point error.
//! Amounts are displayed with 2 decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A signed currency amount that maintains exactly 4 decimal places.
///
/// All arithmetic re-normalizes the scale, so a running balance compounded
/// month after month stays at a fixed precision.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use finance_diagnosis::Money;
///
/// let amount = Money::from_str("1234.5").unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places kept internally.
    pub const SCALE: u32 = 4;

    /// The number of decimal places shown to the user.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Largest representable amount. Saturating operations stop here.
    pub const MAX: Self = Money(Decimal::MAX);

    /// Largest amount accepted as user input: one trillion.
    pub const MAX_INPUT: Self = Money(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    /// Creates a new `Money` from a `Decimal`, normalizing to 4 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Money(normalized)
    }

    /// Whole currency units, e.g. `Money::from_units(20_000)`.
    pub fn from_units(units: i64) -> Self {
        Money::new(Decimal::from(units))
    }

    /// The underlying decimal value.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Magnitude of the amount, e.g. a deficit reported as a positive value.
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Addition clamped to [`Money::MAX`] instead of overflowing.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Money::new(self.0.saturating_add(rhs.0))
    }

    /// Scaling clamped to [`Money::MAX`] instead of overflowing.
    pub fn saturating_mul(self, rhs: Decimal) -> Self {
        Money::new(self.0.saturating_mul(rhs))
    }

    /// Returns `true` once a saturating operation has hit the upper bound.
    pub fn is_saturated(&self) -> bool {
        *self >= Money::MAX
    }

    /// The value rounded half away from zero to display precision.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(Self::DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

/// Scaling by a rate or factor.
impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Money::new(self.0 * rhs)
    }
}

/// Division by a non-zero divisor; callers guarantee the divisor.
impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Money::new(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
