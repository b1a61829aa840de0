//! # Store Error Types
//!
//! Typed error handling for catalog, cart and order operations.
//! All store operations return `Result<T, StoreError>`.

use crate::product::ProductId;
use thiserror::Error;

/// Core error type for all store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input shape (negative price or quantity, empty name, non-positive amount)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced product does not exist in the catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// Requested quantity exceeds stock on hand
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Checkout attempted with no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has no line for this product
    #[error("Product {product_id} is not in the cart")]
    NotInCart { product_id: ProductId },

    /// Catalog could not be written to storage
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StoreError {
    /// Returns true if the caller can report this error and carry on
    /// with the same menu.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StoreError::Persistence(_))
    }

    /// Short stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation",
            StoreError::ProductNotFound { .. } => "not_found",
            StoreError::InsufficientStock { .. } => "insufficient_stock",
            StoreError::EmptyCart => "empty_cart",
            StoreError::NotInCart { .. } => "not_in_cart",
            StoreError::Persistence(_) => "persistence",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
