//! # stock-core
//!
//! Catalog, cart and checkout logic for the stockroom inventory tool.
//!
//! This crate provides:
//! - `Product`, `ProductId` and `Price` for catalog records
//! - `ProductCatalog` for product CRUD with id allocation and persistence
//! - `Cart` for a buyer's unpersisted selection
//! - `OrderProcessor` for all-or-nothing checkout
//! - `Persistence` port with JSON file and in-memory backends
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use stock_core::{Cart, MemoryPersistence, OrderProcessor, Price, ProductCatalog};
//!
//! let mut catalog = ProductCatalog::open(MemoryPersistence::new());
//! let tea = catalog.add("Tea", Price::new(2.50), 5)?;
//!
//! let mut cart = Cart::new();
//! cart.add_item(&catalog, tea.id, 3)?;
//!
//! let receipt = OrderProcessor::new().place_order(&cart, &mut catalog)?;
//! cart.clear();
//!
//! assert_eq!(receipt.total(), Price::new(7.50));
//! assert_eq!(catalog.find(tea.id).map(|p| p.qty), Some(2));
//! # Ok::<(), stock_core::StoreError>(())
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod order;
pub mod persistence;
pub mod product;

// Re-exports for convenience
pub use cart::{Cart, CartLine};
pub use catalog::ProductCatalog;
pub use error::{StoreError, StoreResult};
pub use order::{validate_contact, OrderProcessor, OrderReceipt, ReceiptLine};
pub use persistence::{BoxedPersistence, JsonFilePersistence, MemoryPersistence, Persistence};
pub use product::{Price, Product, ProductId};
