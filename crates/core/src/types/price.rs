//! Type-safe price representation using decimal arithmetic.
//!
//! The store sells in euros only, so a [`Price`] is a bare amount and its
//! [`Display`](core::fmt::Display) implementation renders the French
//! currency format shoppers see on the page (`1 234,50 €`).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use super::Quantity;

/// Separator between the amount and the currency symbol (U+00A0).
const NO_BREAK_SPACE: char = '\u{a0}';

/// Thousands separator used by the French locale (U+202F).
const NARROW_NO_BREAK_SPACE: char = '\u{202f}';

/// A price in euros.
///
/// Arithmetic saturates at the bounds of [`Decimal`] instead of overflowing,
/// and any JSON number deserializes, out-of-range values clamping to those
/// bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in the currency's standard unit (euros, not cents).
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    amount: Decimal,
}

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self {
        amount: Decimal::ZERO,
    };

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Price for a finite number, clamped to the range of [`Decimal`].
    ///
    /// Non-finite input reads as zero.
    #[must_use]
    pub fn from_f64_saturating(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        match value.to_string().parse::<Decimal>() {
            Ok(amount) => Self::new(amount),
            Err(_) if value.abs() < 1.0 => Self::ZERO,
            Err(_) => Self::new(saturated(value.is_sign_negative())),
        }
    }

    /// The price of `qty` units at this unit price.
    #[must_use]
    pub fn times(self, qty: Quantity) -> Self {
        let amount = self
            .amount
            .checked_mul(Decimal::from(qty.get()))
            .unwrap_or_else(|| saturated(self.amount.is_sign_negative()));
        Self::new(amount)
    }
}

const fn saturated(negative: bool) -> Decimal {
    if negative { Decimal::MIN } else { Decimal::MAX }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(|value| Price::from_f64_saturating(value).amount)
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let amount = self
            .amount
            .checked_add(rhs.amount)
            .unwrap_or_else(|| saturated(rhs.amount.is_sign_negative()));
        Self::new(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as `fr-FR` currency: two decimals rounded half away from zero,
/// comma decimal separator, grouped thousands and a trailing euro sign.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let magnitude = rounded.abs();
        let whole = magnitude.trunc().normalize();
        let cents = ((magnitude - whole) * Decimal::ONE_HUNDRED)
            .trunc()
            .to_u32()
            .unwrap_or(0);

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }

        let digits = whole.to_string();
        let len = digits.len();
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                write!(f, "{NARROW_NO_BREAK_SPACE}")?;
            }
            write!(f, "{digit}")?;
        }

        write!(f, ",{cents:02}{NO_BREAK_SPACE}€")
    }
}
