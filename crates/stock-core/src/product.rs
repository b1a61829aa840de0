//! # Product Types
//!
//! Product records held by the catalog.
//! Persisted as `{id, name, price, qty}` records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog-assigned product identifier (always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id that follows this one
    pub(crate) fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Price held in hundredths, stored on disk as a plain decimal number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Price {
    /// Amount in hundredths (cents, kopecks)
    cents: i64,
}

impl Price {
    /// Largest unit price the catalog accepts (one billion)
    pub const MAX: Price = Price {
        cents: 1_000_000_000 * 100,
    };

    /// Create a price from a decimal amount, rounded to two places
    pub fn new(amount: f64) -> Self {
        Self {
            cents: (amount * 100.0).round() as i64,
        }
    }

    /// Create a price from hundredths
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Price of `quantity` units, saturating at the `i64` range
    pub fn times(&self, quantity: u32) -> Price {
        Price {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }

    /// Format for display (e.g., "10.50")
    pub fn display(&self) -> String {
        format!("{:.2}", self.as_decimal())
    }
}

impl From<f64> for Price {
    fn from(amount: f64) -> Self {
        Price::new(amount)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.as_decimal()
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        Price::from_cents(iter.fold(0i64, |acc, p| acc.saturating_add(p.cents)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier, assigned by the catalog
    pub id: ProductId,

    /// Display name (never empty)
    pub name: String,

    /// Unit price (never negative)
    pub price: Price,

    /// Stock on hand
    pub qty: u32,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, qty: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            qty,
        }
    }

    /// Check whether `quantity` units can be taken from stock
    pub fn has_stock(&self, quantity: u32) -> bool {
        self.qty >= quantity
    }

    pub fn in_stock(&self) -> bool {
        self.qty > 0
    }
}
