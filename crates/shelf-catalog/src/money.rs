//! Price type for catalog amounts.
//!
//! The bookstore prices everything in whole Toman, so a price is a plain
//! integer amount. The backend occasionally serializes prices as decimals
//! (`80000.0`); those are rounded on the way in.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

/// Currency suffix shown after formatted amounts.
pub const CURRENCY_SUFFIX: &str = "تومان";

/// A price in whole Toman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    /// Create a price from a whole amount.
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw amount.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Format with thousands separators and no suffix (e.g. "80,000").
    pub fn display_amount(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }

    /// Format as a display string (e.g. "80,000 تومان").
    pub fn display(&self) -> String {
        format!("{} {}", self.display_amount(), CURRENCY_SUFFIX)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, other: Price) -> Price {
        Price(self.0.saturating_add(other.0))
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, other: Price) -> Price {
        Price(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Price(raw.round() as i64))
    }
}

/// Read a price that may be `null`; null reads as the default amount.
pub(crate) fn price_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
    Ok(Option::<Price>::deserialize(deserializer)?.unwrap_or_default())
}
