//! # Product Catalog
//!
//! The authoritative set of products and their stock levels.
//! Every successful mutation is flushed to the injected [`Persistence`]
//! backend before the call returns; a failed flush rolls the in-memory
//! state back so memory and storage never diverge.

use crate::error::{StoreError, StoreResult};
use crate::persistence::{BoxedPersistence, Persistence};
use crate::product::{Price, Product, ProductId};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info, warn};

/// Product catalog backed by a persistence port
pub struct ProductCatalog {
    products: BTreeMap<ProductId, Product>,
    /// Highest id ever allocated or loaded; ids are never handed out twice
    high_water: u64,
    storage: BoxedPersistence,
}

impl ProductCatalog {
    /// Load the catalog from storage.
    ///
    /// Records that break product rules (id 0, empty name, price out of
    /// range) are skipped; records sharing an id collapse to the last one read.
    pub fn open(storage: impl Persistence + 'static) -> Self {
        Self::from_boxed(Box::new(storage))
    }

    /// Load the catalog from an already boxed backend
    pub fn from_boxed(storage: BoxedPersistence) -> Self {
        let mut products = BTreeMap::new();
        for product in storage.load() {
            if let Err(e) = check_record(&product) {
                warn!(product_id = %product.id, error = %e, "Invalid product in storage, skipping");
                continue;
            }
            if let Some(previous) = products.insert(product.id, product) {
                warn!(product_id = %previous.id, "Duplicate product id in storage, keeping last record");
            }
        }
        let high_water = products.keys().next_back().map(ProductId::get).unwrap_or(0);

        info!(
            storage = %storage.describe(),
            products = products.len(),
            "Catalog loaded"
        );

        Self {
            products,
            high_water,
            storage,
        }
    }

    /// Add a new product under a freshly allocated id
    pub fn add(&mut self, name: &str, price: Price, qty: i64) -> StoreResult<Product> {
        let (name, qty) = validate_fields(name, price, qty)?;

        self.transaction(|catalog| {
            let id = catalog.allocate_id();
            let product = Product::new(id, name, price, qty);
            catalog.products.insert(id, product.clone());
            Ok(product)
        })
        .inspect(|product| info!(product_id = %product.id, name = %product.name, "Product added"))
    }

    /// Overwrite every field of an existing product
    pub fn edit(&mut self, id: ProductId, name: &str, price: Price, qty: i64) -> StoreResult<Product> {
        if !self.products.contains_key(&id) {
            return Err(StoreError::ProductNotFound { product_id: id });
        }
        let (name, qty) = validate_fields(name, price, qty)?;

        self.transaction(|catalog| {
            let product = catalog
                .products
                .get_mut(&id)
                .ok_or(StoreError::ProductNotFound { product_id: id })?;
            product.name = name;
            product.price = price;
            product.qty = qty;
            Ok(product.clone())
        })
        .inspect(|product| info!(product_id = %product.id, qty = product.qty, "Product edited"))
    }

    /// Delete a product. Carts still holding its id find out at checkout.
    pub fn remove(&mut self, id: ProductId) -> StoreResult<Product> {
        self.transaction(|catalog| {
            catalog
                .products
                .remove(&id)
                .ok_or(StoreError::ProductNotFound { product_id: id })
        })
        .inspect(|product| info!(product_id = %product.id, "Product removed"))
    }

    /// Look up a product by id
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// All products in id order
    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Products with stock on hand, in id order
    pub fn available(&self) -> impl Iterator<Item = &Product> {
        self.products.values().filter(|p| p.in_stock())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Take `qty` units out of stock without persisting.
    ///
    /// Only the order processor calls this, inside [`Self::transaction`].
    pub(crate) fn decrement(&mut self, id: ProductId, qty: u32) -> StoreResult<()> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound { product_id: id })?;

        if !product.has_stock(qty) {
            return Err(StoreError::InsufficientStock {
                product_id: id,
                requested: qty,
                available: product.qty,
            });
        }
        product.qty -= qty;
        Ok(())
    }

    /// Run `f` against the catalog and flush once at the end.
    ///
    /// If `f` fails nothing is written; if the flush fails the catalog is
    /// restored to its state before `f` ran.
    pub(crate) fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let products = self.products.clone();
        let high_water = self.high_water;

        let outcome = f(self).and_then(|value| self.flush().map(|()| value));
        if outcome.is_err() {
            self.products = products;
            self.high_water = high_water;
        }
        outcome
    }

    fn flush(&self) -> StoreResult<()> {
        let snapshot: Vec<Product> = self.products.values().cloned().collect();
        self.storage.save(&snapshot).inspect_err(|e| {
            error!(storage = %self.storage.describe(), error = %e, "Failed to save catalog");
        })
    }

    fn allocate_id(&mut self) -> ProductId {
        let max_existing = self.products.keys().next_back().map(ProductId::get).unwrap_or(0);
        let id = ProductId::new(self.high_water.max(max_existing)).next();
        self.high_water = id.get();
        id
    }
}

impl fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("products", &self.products.len())
            .field("high_water", &self.high_water)
            .field("storage", &self.storage.describe())
            .finish()
    }
}

fn validate_fields(name: &str, price: Price, qty: i64) -> StoreResult<(String, u32)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::validation("product name must not be empty"));
    }
    if price.is_negative() {
        return Err(StoreError::validation(format!(
            "price must not be negative (got {})",
            price
        )));
    }
    if price > Price::MAX {
        return Err(StoreError::validation(format!(
            "price must not exceed {} (got {})",
            Price::MAX,
            price
        )));
    }
    if qty < 0 {
        return Err(StoreError::validation(format!(
            "quantity must not be negative (got {})",
            qty
        )));
    }
    let qty = u32::try_from(qty)
        .map_err(|_| StoreError::validation(format!("quantity {} is too large", qty)))?;
    Ok((name.to_string(), qty))
}

/// Loaded records must satisfy the same rules as `add`
fn check_record(product: &Product) -> StoreResult<()> {
    if product.id.get() == 0 {
        return Err(StoreError::validation("product id must be positive"));
    }
    validate_fields(&product.name, product.price, i64::from(product.qty)).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPersistence;

    fn catalog_with(products: Vec<Product>) -> (ProductCatalog, MemoryPersistence) {
        let storage = MemoryPersistence::with_products(products);
        (ProductCatalog::open(storage.clone()), storage)
    }

    #[test]
    fn test_add_allocates_after_max_loaded_id() {
        let (mut catalog, storage) = catalog_with(vec![
            Product::new(ProductId::new(2), "A", Price::new(1.0), 1),
            Product::new(ProductId::new(9), "B", Price::new(1.0), 1),
        ]);

        let product = catalog.add("C", Price::new(3.0), 4).unwrap();
        assert_eq!(product.id, ProductId::new(10));
        assert_eq!(storage.save_count(), 1);
        assert_eq!(storage.stored().len(), 3);
    }

    #[test]
    fn test_first_id_is_one() {
        let (mut catalog, _) = catalog_with(Vec::new());
        assert_eq!(catalog.add("A", Price::new(1.0), 0).unwrap().id, ProductId::new(1));
    }

    #[test]
    fn test_removed_newest_id_not_reused() {
        let (mut catalog, _) = catalog_with(Vec::new());
        catalog.add("A", Price::new(1.0), 1).unwrap();
        let b = catalog.add("B", Price::new(1.0), 1).unwrap();
        catalog.remove(b.id).unwrap();

        let c = catalog.add("C", Price::new(1.0), 1).unwrap();
        assert_eq!(c.id, ProductId::new(3));
    }

    #[test]
    fn test_add_validation() {
        let (mut catalog, storage) = catalog_with(Vec::new());

        for result in [
            catalog.add("", Price::new(1.0), 1),
            catalog.add("   ", Price::new(1.0), 1),
            catalog.add("Tea", Price::new(-0.01), 1),
            catalog.add("Tea", Price::new(1.0), -1),
        ] {
            assert!(matches!(result, Err(StoreError::Validation(_))));
        }
        assert!(catalog.is_empty());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_add_trims_name_and_allows_free_items() {
        let (mut catalog, _) = catalog_with(Vec::new());
        let product = catalog.add("  Sticker ", Price::new(0.0), 0).unwrap();
        assert_eq!(product.name, "Sticker");
    }

    #[test]
    fn test_edit_overwrites_fields() {
        let (mut catalog, storage) = catalog_with(Vec::new());
        let id = catalog.add("Tea", Price::new(1.0), 5).unwrap().id;

        catalog.edit(id, "Green tea", Price::new(2.5), 1).unwrap();

        let product = catalog.find(id).unwrap();
        assert_eq!(product.name, "Green tea");
        assert_eq!(product.price, Price::new(2.5));
        assert_eq!(product.qty, 1);
        assert_eq!(storage.stored()[0].qty, 1);
    }

    #[test]
    fn test_edit_and_remove_unknown_id() {
        let (mut catalog, storage) = catalog_with(Vec::new());

        assert!(matches!(
            catalog.edit(ProductId::new(5), "X", Price::new(1.0), 1),
            Err(StoreError::ProductNotFound { .. })
        ));
        assert!(matches!(
            catalog.remove(ProductId::new(5)),
            Err(StoreError::ProductNotFound { .. })
        ));
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_find_missing_is_none() {
        let (catalog, _) = catalog_with(Vec::new());
        assert!(catalog.find(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_all_is_id_ordered() {
        let (catalog, _) = catalog_with(vec![
            Product::new(ProductId::new(5), "E", Price::new(1.0), 0),
            Product::new(ProductId::new(1), "A", Price::new(1.0), 2),
            Product::new(ProductId::new(3), "C", Price::new(1.0), 1),
        ]);

        let ids: Vec<u64> = catalog.all().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3, 5]);

        let available: Vec<u64> = catalog.available().map(|p| p.id.get()).collect();
        assert_eq!(available, vec![1, 3]);
    }

    #[test]
    fn test_add_rejects_price_above_max() {
        let (mut catalog, storage) = catalog_with(Vec::new());

        assert!(matches!(
            catalog.add("Gold", Price::new(1e17), 10),
            Err(StoreError::Validation(_))
        ));
        assert!(catalog.add("Gold", Price::MAX, 10).is_ok());

        let id = catalog.all().next().unwrap().id;
        assert!(matches!(
            catalog.edit(id, "Gold", Price::from_cents(Price::MAX.cents() + 1), 10),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_load_skips_invalid_records() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 0, "name": "Zero", "price": 1.0, "qty": 1},
                {"id": 2, "name": "", "price": 1.0, "qty": 3},
                {"id": 3, "name": "Refund", "price": -5.0, "qty": 3},
                {"id": 4, "name": "Gold", "price": 1e17, "qty": 1},
                {"id": 5, "name": "Tea", "price": 2.5, "qty": 4}
            ]"#,
        )
        .unwrap();

        let mut catalog = ProductCatalog::open(crate::persistence::JsonFilePersistence::new(&path));

        let ids: Vec<u64> = catalog.all().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![5]);
        assert!(catalog.all().all(|p| !p.price.is_negative() && !p.name.is_empty()));
        assert_eq!(catalog.add("Mug", Price::new(7.0), 1).unwrap().id, ProductId::new(6));
    }

    #[test]
    fn test_duplicate_ids_keep_last_record() {
        let (catalog, _) = catalog_with(vec![
            Product::new(ProductId::new(1), "Old", Price::new(1.0), 1),
            Product::new(ProductId::new(1), "New", Price::new(1.0), 1),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(ProductId::new(1)).unwrap().name, "New");
    }

    #[test]
    fn test_decrement() {
        let (mut catalog, storage) = catalog_with(vec![Product::new(
            ProductId::new(1),
            "A",
            Price::new(1.0),
            3,
        )]);

        catalog.decrement(ProductId::new(1), 2).unwrap();
        assert_eq!(catalog.find(ProductId::new(1)).unwrap().qty, 1);

        let err = catalog.decrement(ProductId::new(1), 2).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(catalog.find(ProductId::new(1)).unwrap().qty, 1);

        // decrement alone never writes
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let (mut catalog, storage) = catalog_with(Vec::new());
        let id = catalog.add("Tea", Price::new(1.0), 5).unwrap().id;
        storage.set_fail_saves(true);

        assert!(matches!(
            catalog.add("Coffee", Price::new(2.0), 1),
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(
            catalog.edit(id, "Tea", Price::new(1.0), 0),
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(catalog.remove(id), Err(StoreError::Persistence(_))));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(id).unwrap().qty, 5);

        storage.set_fail_saves(false);
        assert_eq!(catalog.add("Coffee", Price::new(2.0), 1).unwrap().id, ProductId::new(2));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add,
            RemoveNth(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                2 => Just(Op::Add),
                1 => any::<usize>().prop_map(Op::RemoveNth),
            ]
        }

        proptest! {
            /// Property: allocated ids strictly increase, even across removals.
            #[test]
            fn ids_strictly_increase(ops in prop::collection::vec(op(), 1..60)) {
                let (mut catalog, _) = catalog_with(Vec::new());
                let mut last = 0u64;

                for op in ops {
                    match op {
                        Op::Add => {
                            let id = catalog.add("P", Price::new(1.0), 1).unwrap().id.get();
                            prop_assert!(id > last);
                            last = id;
                        }
                        Op::RemoveNth(n) => {
                            if !catalog.is_empty() {
                                let id = catalog.all().nth(n % catalog.len()).unwrap().id;
                                catalog.remove(id).unwrap();
                            }
                        }
                    }
                }
            }

            /// Property: stock never goes negative under any decrement sequence.
            #[test]
            fn stock_never_negative(
                initial in 0u32..50,
                takes in prop::collection::vec(0u32..20, 0..30)
            ) {
                let (mut catalog, _) = catalog_with(Vec::new());
                let id = catalog.add("P", Price::new(1.0), i64::from(initial)).unwrap().id;
                let mut expected = initial;

                for take in takes {
                    let result = catalog.decrement(id, take);
                    if take <= expected {
                        prop_assert!(result.is_ok());
                        expected -= take;
                    } else {
                        prop_assert!(result.is_err());
                    }
                    prop_assert_eq!(catalog.find(id).unwrap().qty, expected);
                }
            }
        }
    }
}
