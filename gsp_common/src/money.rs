use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------       Money        ---------------------------------------------------------
/// An amount of money in minor currency units (cents). `Money::from(1999)` is 19.99.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

// Operators saturate. Use the `checked_*` methods where an out-of-range amount must be reported.
op!(binary Money, Add, add, saturating_add);
op!(binary Money, Sub, sub, saturating_sub);
op!(inplace Money, AddAssign, add_assign, saturating_add);
op!(unary Money, Neg, neg, saturating_neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as money: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| MoneyConversionError(format!("{value} is too large to convert to Money")))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

/// Parses a decimal amount in major units, e.g. `"24.98"` or `"5"`. At most two fractional digits are accepted.
impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MoneyConversionError(format!("'{s}' is not a valid amount"));
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || frac.len() > 2 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let whole = whole.parse::<i64>().map_err(|_| err())?;
        let frac = format!("{frac:0<2}").parse::<i64>().map_err(|_| err())?;
        let value = whole.checked_mul(MINOR_UNITS_PER_MAJOR).and_then(|v| v.checked_add(frac)).ok_or_else(err)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_major(units: i64) -> Self {
        Self(units.saturating_mul(MINOR_UNITS_PER_MAJOR))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Adds up `amounts`, or `None` if the total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::default(), Self::checked_add)
    }

    /// Parses an amount quoted by a payment provider in minor units, e.g. `"2498.00"` is 24.98. A non-zero
    /// fractional part is rejected since minor units cannot be split.
    pub fn from_provider_amount(s: &str) -> Result<Self, MoneyConversionError> {
        let err = || MoneyConversionError(format!("'{s}' is not a valid provider amount"));
        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if !frac.chars().all(|c| c == '0') {
            return Err(err());
        }
        whole.parse::<i64>().map(Self).map_err(|_| err())
    }
}
