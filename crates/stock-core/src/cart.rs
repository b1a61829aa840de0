//! # Cart
//!
//! A buyer's in-progress selection. The cart only remembers product ids and
//! quantities; names, prices and stock are looked up in the catalog every
//! time they are needed, so admin edits show up without notifying the cart.

use crate::catalog::ProductCatalog;
use crate::error::{StoreError, StoreResult};
use crate::product::{Price, Product, ProductId};
use std::collections::BTreeMap;
use tracing::debug;

/// A cart line re-resolved against the catalog at read time
#[derive(Debug, Clone, Copy)]
pub struct CartLine<'a> {
    pub product_id: ProductId,
    pub quantity: u32,
    /// `None` when the product was removed from the catalog
    pub product: Option<&'a Product>,
}

impl CartLine<'_> {
    /// Current unit price times quantity, if the product still exists
    pub fn subtotal(&self) -> Option<Price> {
        self.product.map(|p| p.price.times(self.quantity))
    }

    /// Whether the catalog can currently cover this line
    pub fn is_available(&self) -> bool {
        self.product.is_some_and(|p| p.has_stock(self.quantity))
    }
}

/// Buyer-local basket of product id to quantity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeMap<ProductId, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` units, merging with an existing line.
    ///
    /// The merged quantity must fit current stock; on any error the cart is
    /// left unchanged. Returns the line's new quantity.
    pub fn add_item(&mut self, catalog: &ProductCatalog, product_id: ProductId, qty: i64) -> StoreResult<u32> {
        let qty = positive_quantity(qty)?;
        let product = catalog
            .find(product_id)
            .ok_or(StoreError::ProductNotFound { product_id })?;

        let existing = self.quantity_of(product_id);
        let wanted = match existing.checked_add(qty) {
            Some(wanted) if product.has_stock(wanted) => wanted,
            // a sum past u32::MAX is beyond any stock level
            _ => {
                return Err(StoreError::InsufficientStock {
                    product_id,
                    requested: existing.saturating_add(qty),
                    available: product.qty,
                })
            }
        };

        self.items.insert(product_id, wanted);
        debug!(product_id = %product_id, quantity = wanted, "Cart line added");
        Ok(wanted)
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn edit_item(&mut self, catalog: &ProductCatalog, product_id: ProductId, new_qty: i64) -> StoreResult<()> {
        if new_qty <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }
        if !self.items.contains_key(&product_id) {
            return Err(StoreError::NotInCart { product_id });
        }

        let qty = positive_quantity(new_qty)?;
        let product = catalog
            .find(product_id)
            .ok_or(StoreError::ProductNotFound { product_id })?;
        if !product.has_stock(qty) {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: qty,
                available: product.qty,
            });
        }

        self.items.insert(product_id, qty);
        debug!(product_id = %product_id, quantity = qty, "Cart line edited");
        Ok(())
    }

    /// Drop a line. Returns false if there was no such line.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        self.items.remove(&product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Quantity currently held for a product (0 if absent)
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    /// Raw (product id, quantity) pairs in id order
    pub fn items(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Lines resolved against the catalog as it is right now
    pub fn lines<'a>(&self, catalog: &'a ProductCatalog) -> Vec<CartLine<'a>> {
        self.items()
            .map(|(product_id, quantity)| CartLine {
                product_id,
                quantity,
                product: catalog.find(product_id),
            })
            .collect()
    }

    /// Total at current prices, skipping products that no longer exist
    pub fn total(&self, catalog: &ProductCatalog) -> Price {
        self.lines(catalog).iter().filter_map(CartLine::subtotal).sum()
    }
}

fn positive_quantity(qty: i64) -> StoreResult<u32> {
    if qty <= 0 {
        return Err(StoreError::validation(format!(
            "quantity must be positive (got {})",
            qty
        )));
    }
    u32::try_from(qty).map_err(|_| StoreError::validation(format!("quantity {} is too large", qty)))
}
