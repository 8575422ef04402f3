//! Dollar amounts for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dollar amount.
///
/// Amounts are exact decimals; nothing here rounds except [`Price::display`],
/// which formats to two places for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::new(Decimal::new(5, 0)).display(), "$5.00");
        assert_eq!(Price::new(Decimal::new(1999, 2)).to_string(), "$19.99");
    }

    #[test]
    fn test_display_rounds_only_for_presentation() {
        let price = Price::from(Decimal::new(10_005, 3));
        assert_eq!(price.display(), "$10.00");
        assert_eq!(price.amount(), Decimal::new(10_005, 3));
    }
}
