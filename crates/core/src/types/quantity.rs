//! Line quantity that can never drop below one.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Quantity of a cart line.
///
/// ## Constraints
///
/// - Always at least [`Quantity::MIN`]. Constructing from `0` yields `1`,
///   matching how stored carts treat a zero or missing `qty`.
/// - [`Quantity::decrement`] clamps at the minimum instead of going to zero.
/// - Any JSON number deserializes: fractions truncate, values below one read
///   as one and values past `u32::MAX` clamp to it.
///
/// ```
/// use mignon_core::Quantity;
///
/// let qty = Quantity::new(1).decrement();
/// assert_eq!(qty.get(), 1);
/// assert_eq!(Quantity::new(0).get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "f64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity a line can hold.
    pub const MIN: Self = Self(1);

    /// Create a quantity, clamping `0` up to [`Quantity::MIN`].
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self::MIN } else { Self(value) }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more than the current quantity.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less than the current quantity, never below [`Quantity::MIN`].
    #[must_use]
    pub const fn decrement(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<f64> for Quantity {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(value: f64) -> Self {
        // Float-to-int `as` saturates and maps NaN to zero.
        Self::new(value as u32)
    }
}

impl From<Quantity> for u32 {
    fn from(qty: Quantity) -> Self {
        qty.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
