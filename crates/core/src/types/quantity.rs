//! Line-item quantity type.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero.
    #[error("quantity must be at least 1")]
    Zero,
    /// The value is negative.
    #[error("quantity cannot be negative (got {0})")]
    Negative(i64),
    /// The value does not fit in a `u32`.
    #[error("quantity must be at most {max}", max = u32::MAX)]
    TooLarge,
}

/// A cart line-item quantity.
///
/// Always a positive integer. A line whose quantity would drop to zero or
/// below is removed from the cart instead, so there is no way to hold a
/// non-positive `Quantity`.
///
/// ```
/// use pocketshop_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from a signed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero, negative, or above `u32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        match value {
            0 => Err(QuantityError::Zero),
            v if v < 0 => Err(QuantityError::Negative(v)),
            v => u32::try_from(v)
                .ok()
                .and_then(NonZeroU32::new)
                .map(Self)
                .ok_or(QuantityError::TooLarge),
        }
    }

    /// Create a quantity from a signed value, saturating at `u32::MAX`.
    ///
    /// Returns `None` for zero or negative values.
    #[must_use]
    pub fn saturating_from(value: i64) -> Option<Self> {
        if value <= 0 {
            return None;
        }
        let clamped = u32::try_from(value).unwrap_or(u32::MAX);
        NonZeroU32::new(clamped).map(Self)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(Quantity::new(-4), Err(QuantityError::Negative(-4)));
    }

    #[test]
    fn test_new_rejects_too_large() {
        assert_eq!(
            Quantity::new(i64::from(u32::MAX) + 1),
            Err(QuantityError::TooLarge)
        );
        assert_eq!(Quantity::new(i64::from(u32::MAX)).unwrap().get(), u32::MAX);
    }

    #[test]
    fn test_saturating_from() {
        assert_eq!(Quantity::saturating_from(0), None);
        assert_eq!(Quantity::saturating_from(-1), None);
        assert_eq!(Quantity::saturating_from(7).unwrap().get(), 7);
        assert_eq!(Quantity::saturating_from(i64::MAX).unwrap().get(), u32::MAX);
    }

    #[test]
    fn test_saturating_add() {
        let a = Quantity::new(2).unwrap();
        let b = Quantity::new(3).unwrap();
        assert_eq!(a.saturating_add(b).get(), 5);

        let max = Quantity::new(i64::from(u32::MAX)).unwrap();
        assert_eq!(max.saturating_add(Quantity::ONE).get(), u32::MAX);
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-1").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
        assert_eq!(serde_json::to_string(&Quantity::ONE).unwrap(), "1");
    }
}
