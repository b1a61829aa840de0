//! # Order Processing
//!
//! Checkout of a [`Cart`] against the [`ProductCatalog`] as one all-or-nothing
//! step.
//!
//! ## Two passes
//!
//! ```text
//!  cart lines ──► validate every line against the *current* catalog
//!                    │  any missing product   -> ProductNotFound
//!                    │  any short stock       -> InsufficientStock
//!                    ▼  (nothing touched yet)
//!                 decrement every line
//!                    ▼
//!                 save catalog once
//! ```
//!
//! Nothing else can mutate the catalog between the passes because
//! `place_order` holds `&mut ProductCatalog` for its whole duration. A
//! multi-threaded host has to keep both passes under the same lock.

use crate::cart::Cart;
use crate::catalog::ProductCatalog;
use crate::error::{StoreError, StoreResult};
use crate::product::{Price, Product, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// A committed order line, priced at checkout time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Product ID
    pub product_id: ProductId,

    /// Product name at checkout
    pub name: String,

    /// Unit price at checkout
    pub unit_price: Price,

    /// Quantity taken from stock
    pub quantity: u32,
}

impl ReceiptLine {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// Calculate the total price for this line
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Result of a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Unique order ID (generated)
    pub id: String,

    /// Committed lines in product id order
    pub lines: Vec<ReceiptLine>,

    /// Buyer contact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Commit timestamp
    pub placed_at: DateTime<Utc>,
}

impl OrderReceipt {
    fn new(lines: Vec<ReceiptLine>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lines,
            contact: None,
            placed_at: Utc::now(),
        }
    }

    /// Set the buyer contact name
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Calculate order total
    pub fn total(&self) -> Price {
        self.lines.iter().map(ReceiptLine::total).sum()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Validates and commits carts against a catalog.
///
/// The processor never clears the cart. The caller does that after a
/// successful order, so a failed order can be fixed and retried without
/// re-entering every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderProcessor;

impl OrderProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Check every cart line against current stock without changing anything.
    ///
    /// Returns the lines as they would be committed right now.
    pub fn validate(&self, cart: &Cart, catalog: &ProductCatalog) -> StoreResult<Vec<ReceiptLine>> {
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        cart.items()
            .map(|(product_id, quantity)| {
                let product = catalog
                    .find(product_id)
                    .ok_or(StoreError::ProductNotFound { product_id })?;
                if !product.has_stock(quantity) {
                    return Err(StoreError::InsufficientStock {
                        product_id,
                        requested: quantity,
                        available: product.qty,
                    });
                }
                Ok(ReceiptLine::from_product(product, quantity))
            })
            .collect()
    }

    /// Commit the cart: every line is decremented, or none is.
    ///
    /// The catalog is saved once after all decrements. If that save fails
    /// the stock levels are restored and the error is returned.
    pub fn place_order(&self, cart: &Cart, catalog: &mut ProductCatalog) -> StoreResult<OrderReceipt> {
        let lines = self.validate(cart, catalog).inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "Order rejected");
        })?;

        catalog.transaction(|catalog| {
            for line in &lines {
                catalog.decrement(line.product_id, line.quantity)?;
            }
            Ok(())
        })?;

        let receipt = OrderReceipt::new(lines);
        info!(
            order_id = %receipt.id,
            lines = receipt.lines.len(),
            items = receipt.item_count(),
            total = %receipt.total(),
            "Order placed"
        );
        Ok(receipt)
    }
}

/// Checkout needs a non-empty contact name
pub fn validate_contact(contact: &str) -> StoreResult<String> {
    let contact = contact.trim();
    if contact.is_empty() {
        return Err(StoreError::validation("contact name is required"));
    }
    Ok(contact.to_string())
}
