//! # Menus
//!
//! Main, administrator and buyer menus. Every store error is reported to the
//! user and control returns to the same menu; only a closed or failing
//! terminal ends the session.

use crate::console::{Console, InputError};
use stock_core::{
    validate_contact, Cart, OrderProcessor, OrderReceipt, Price, Product, ProductCatalog,
    ProductId, StoreError,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single menu action
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type ActionResult = Result<(), ActionError>;

/// Interactive session over one catalog
pub struct Menus<'a, C> {
    console: &'a mut C,
    catalog: &'a mut ProductCatalog,
    currency: String,
    processor: OrderProcessor,
}

impl<'a, C: Console> Menus<'a, C> {
    pub fn new(console: &'a mut C, catalog: &'a mut ProductCatalog, currency: impl Into<String>) -> Self {
        Self {
            console,
            catalog,
            currency: currency.into(),
            processor: OrderProcessor::new(),
        }
    }

    /// Run the main menu until the user exits or input ends
    pub fn run(&mut self) -> std::io::Result<()> {
        match self.main_menu() {
            Ok(()) | Err(InputError::Closed) => Ok(()),
            Err(InputError::Io(e)) => Err(e),
            // prompts in the main loop only read text
            Err(e @ InputError::Invalid { .. }) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            )),
        }
    }

    fn main_menu(&mut self) -> Result<(), InputError> {
        loop {
            self.console.show("")?;
            self.console.show("--- Main menu ---")?;
            self.console.show("1. Administrator")?;
            self.console.show("2. Buyer")?;
            self.console.show("0. Exit")?;

            match self.console.ask_text("=> ")?.trim() {
                "1" => self.admin_menu()?,
                "2" => self.buyer_menu()?,
                "0" => {
                    self.console.show("Goodbye!")?;
                    return Ok(());
                }
                other => self.unknown_command(other)?,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Administrator
    // -------------------------------------------------------------------------

    fn admin_menu(&mut self) -> Result<(), InputError> {
        loop {
            self.console.show("")?;
            self.console.show("--- Admin panel ---")?;
            self.console.show("1. Add product")?;
            self.console.show("2. Edit product")?;
            self.console.show("3. Remove product")?;
            self.console.show("4. View catalog")?;
            self.console.show("0. Back")?;

            let result = match self.console.ask_text("=> ")?.trim() {
                "1" => self.add_product(),
                "2" => self.edit_product(),
                "3" => self.remove_product(),
                "4" => self.show_catalog(false),
                "0" => return Ok(()),
                other => Ok(self.unknown_command(other)?),
            };
            self.settle(result)?;
        }
    }

    fn add_product(&mut self) -> ActionResult {
        let name = self.console.ask_text("Name: ")?;
        let price = Price::new(self.console.ask_decimal("Price: ")?);
        let qty = self.console.ask_int("Quantity: ")?;

        let product = self.catalog.add(&name, price, qty)?;
        self.console.show(&format!("Product added with ID={}.", product.id))?;
        Ok(())
    }

    fn edit_product(&mut self) -> ActionResult {
        let id = self.ask_product_id("ID to edit: ")?;
        let Some(current) = self.catalog.find(id) else {
            return Err(StoreError::ProductNotFound { product_id: id }.into());
        };
        let current = self.format_product(current);
        self.console.show(&format!("Current: {}", current))?;

        let name = self.console.ask_text("New name: ")?;
        let price = Price::new(self.console.ask_decimal("New price: ")?);
        let qty = self.console.ask_int("New quantity: ")?;

        self.catalog.edit(id, &name, price, qty)?;
        self.console.show("Product updated.")?;
        Ok(())
    }

    fn remove_product(&mut self) -> ActionResult {
        let id = self.ask_product_id("ID to remove: ")?;
        let product = self.catalog.remove(id)?;
        self.console.show(&format!("Product '{}' removed.", product.name))?;
        Ok(())
    }

    fn show_catalog(&mut self, available_only: bool) -> ActionResult {
        self.console.show("")?;
        self.console.show("--- Catalog ---")?;

        let rows: Vec<String> = if available_only {
            self.catalog
                .available()
                .map(|p| {
                    format!(
                        "ID={} | {} | {} {} | (available: {} pcs)",
                        p.id,
                        p.name,
                        p.price,
                        self.currency,
                        p.qty
                    )
                })
                .collect()
        } else {
            self.catalog.all().map(|p| self.format_product(p)).collect()
        };

        if rows.is_empty() {
            let message = if available_only {
                "Sorry, everything is sold out."
            } else {
                "The catalog is empty."
            };
            self.console.show(message)?;
        }
        for row in rows {
            self.console.show(&row)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Buyer
    // -------------------------------------------------------------------------

    fn buyer_menu(&mut self) -> Result<(), InputError> {
        let mut cart = Cart::new();
        loop {
            self.console.show("")?;
            self.console.show("--- Buyer menu ---")?;
            self.console.show("1. Browse catalog")?;
            self.console.show("2. Add to cart")?;
            self.console.show("3. View cart")?;
            self.console.show("4. Change quantity")?;
            self.console.show("5. Remove from cart")?;
            self.console.show("6. Checkout")?;
            self.console.show("0. Back")?;

            let result = match self.console.ask_text("=> ")?.trim() {
                "1" => self.show_catalog(true),
                "2" => self.add_to_cart(&mut cart),
                "3" => self.show_cart(&cart),
                "4" => self.change_quantity(&mut cart),
                "5" => self.remove_from_cart(&mut cart),
                "6" => self.checkout(&mut cart),
                "0" => {
                    if !cart.is_empty() {
                        debug!(lines = cart.len(), "Buyer left with a non-empty cart");
                    }
                    return Ok(());
                }
                other => Ok(self.unknown_command(other)?),
            };
            self.settle(result)?;
        }
    }

    fn add_to_cart(&mut self, cart: &mut Cart) -> ActionResult {
        let id = self.ask_product_id("Product ID: ")?;
        let Some(product) = self.catalog.find(id) else {
            return Err(StoreError::ProductNotFound { product_id: id }.into());
        };
        let prompt = format!("Quantity (available {}): ", product.qty);
        let name = product.name.clone();

        let qty = self.console.ask_int(&prompt)?;
        let in_cart = cart.add_item(self.catalog, id, qty)?;
        self.console
            .show(&format!("'{}' added to cart (now {} pcs).", name, in_cart))?;
        Ok(())
    }

    fn show_cart(&mut self, cart: &Cart) -> ActionResult {
        if cart.is_empty() {
            self.console.show("Your cart is empty.")?;
            return Ok(());
        }

        self.console.show("")?;
        self.console.show("--- Your cart ---")?;
        let rows: Vec<String> = cart
            .lines(self.catalog)
            .iter()
            .map(|line| match (line.product, line.subtotal()) {
                (Some(p), Some(subtotal)) => {
                    let mut row = format!(
                        "ID={} | {} | {} {} | {} pcs | Subtotal: {} {}",
                        p.id, p.name, p.price, self.currency, line.quantity, subtotal, self.currency
                    );
                    if !line.is_available() {
                        row.push_str(&format!(" | only {} in stock", p.qty));
                    }
                    row
                }
                _ => format!(
                    "ID={} | no longer available | {} pcs",
                    line.product_id, line.quantity
                ),
            })
            .collect();
        for row in rows {
            self.console.show(&row)?;
        }

        let total = cart.total(self.catalog);
        self.console.show("--------------------")?;
        self.console
            .show(&format!("Total: {} {}", total, self.currency))?;
        Ok(())
    }

    fn change_quantity(&mut self, cart: &mut Cart) -> ActionResult {
        let id = self.ask_product_id("Product ID in cart: ")?;
        if cart.quantity_of(id) == 0 {
            return Err(StoreError::NotInCart { product_id: id }.into());
        }
        let prompt = match self.catalog.find(id) {
            Some(p) => format!("New quantity (available {}, 0 removes): ", p.qty),
            None => "New quantity (0 removes): ".to_string(),
        };

        let qty = self.console.ask_int(&prompt)?;
        cart.edit_item(self.catalog, id, qty)?;
        let message = if qty <= 0 {
            "Removed from cart."
        } else {
            "Quantity updated."
        };
        self.console.show(message)?;
        Ok(())
    }

    fn remove_from_cart(&mut self, cart: &mut Cart) -> ActionResult {
        let id = self.ask_product_id("Product ID to remove: ")?;
        let message = if cart.remove_item(id) {
            "Removed from cart."
        } else {
            "This product is not in your cart."
        };
        self.console.show(message)?;
        Ok(())
    }

    fn checkout(&mut self, cart: &mut Cart) -> ActionResult {
        if cart.is_empty() {
            return Err(StoreError::EmptyCart.into());
        }
        let contact = validate_contact(&self.console.ask_text("Contact name: ")?)?;

        let receipt = self
            .processor
            .place_order(cart, self.catalog)?
            .with_contact(contact);
        cart.clear();
        self.show_receipt(&receipt)?;
        Ok(())
    }

    fn show_receipt(&mut self, receipt: &OrderReceipt) -> ActionResult {
        self.console.show("")?;
        self.console.show(&format!(
            "Order placed for {}.",
            receipt.contact.as_deref().unwrap_or("customer")
        ))?;
        self.console.show(&format!("Order ID: {}", receipt.id))?;
        for line in &receipt.lines {
            self.console.show(&format!(
                "{} x {} @ {} {} = {} {}",
                line.name,
                line.quantity,
                line.unit_price,
                self.currency,
                line.total(),
                self.currency
            ))?;
        }
        self.console
            .show(&format!("Total: {} {}", receipt.total(), self.currency))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn ask_product_id(&mut self, prompt: &str) -> Result<ProductId, ActionError> {
        let raw = self.console.ask_int(prompt)?;
        u64::try_from(raw)
            .ok()
            .filter(|id| *id > 0)
            .map(ProductId::new)
            .ok_or_else(|| StoreError::Validation(format!("{} is not a valid product ID", raw)).into())
    }

    fn format_product(&self, p: &Product) -> String {
        format!(
            "ID={} | {} | {} {} | {} pcs",
            p.id, p.name, p.price, self.currency, p.qty
        )
    }

    fn unknown_command(&mut self, command: &str) -> Result<(), InputError> {
        self.console
            .show(&format!("Unknown command '{}'.", command))?;
        Ok(())
    }

    /// Report a failed action and keep the menu running.
    /// Only a closed or broken terminal escapes.
    fn settle(&mut self, result: ActionResult) -> Result<(), InputError> {
        match result {
            Ok(()) => Ok(()),
            Err(ActionError::Store(e)) => {
                warn!(kind = e.kind(), error = %e, "Operation failed");
                let message = describe(&e);
                self.console.show(&message)?;
                Ok(())
            }
            Err(ActionError::Input(e @ InputError::Invalid { .. })) => {
                self.console.show(&format!("Invalid input: {}.", e))?;
                Ok(())
            }
            Err(ActionError::Input(e)) => Err(e),
            Err(ActionError::Io(e)) => Err(e.into()),
        }
    }
}

/// User-facing message for a store error
pub fn describe(err: &StoreError) -> String {
    match err {
        StoreError::Validation(message) => format!("Error: {}.", message),
        StoreError::ProductNotFound { product_id } => {
            format!("Product with ID={} not found.", product_id)
        }
        StoreError::InsufficientStock {
            product_id,
            requested,
            available,
        } => format!(
            "Not enough stock for product ID={}: requested {}, available {}.",
            product_id, requested, available
        ),
        StoreError::EmptyCart => "Your cart is empty.".to_string(),
        StoreError::NotInCart { .. } => "This product is not in your cart.".to_string(),
        StoreError::Persistence(message) => format!(
            "Could not save the catalog ({}). The change was not applied.",
            message
        ),
    }
}
