//! The cart aggregate and its invariants.
//!
//! `Cart` is a pure in-memory structure - no persistence, no notification.
//! All mutation goes through its methods so the invariants hold at every
//! step:
//!
//! - At most one [`CartLine`] per `ProductId`; re-adding a product
//!   increments its quantity instead of duplicating the line.
//! - Every line's quantity is >= 1; a mutation that would drive a quantity
//!   to 0 or below removes the line entirely.
//! - Insertion order is display order.

use pomelo_core::{CurrencyCode, Price, Product, ProductId};
use serde::{Deserialize, Serialize};

/// One product-quantity pairing held in the cart.
///
/// Title, price, and image are a snapshot of the product's display data
/// captured when the item was added. They are not re-fetched, so they may
/// go stale relative to the catalog; items already in the cart keep the
/// price they were added at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog identifier of the product.
    pub product_id: ProductId,
    /// Display title at add time.
    pub title: String,
    /// Unit price at add time.
    pub unit_price: Price,
    /// Product image URL at add time.
    pub image_url: String,
    /// Number of units; always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a catalog product into a new line with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            unit_price: Price::new(product.price, currency),
            image_url: product.image.clone(),
            quantity: 1,
        }
    }

    /// The line's extended price (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The full ordered collection of [`CartLine`] entries for the current
/// device/session.
///
/// Serializes transparently as the array of lines, in display order - the
/// exact layout held under the persisted storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Add one unit of `product`.
    ///
    /// If a line for the product already exists its quantity is
    /// incremented; otherwise a new line is appended with quantity 1.
    pub fn add(&mut self, product: &Product, currency: CurrencyCode) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::from_product(product, currency)),
        }
    }

    /// Remove the line for `product_id`. A no-op if no such line exists.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Set the quantity of the line for `product_id`.
    ///
    /// A quantity of 0 or below removes the line. Unknown ids are a no-op.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart entirely.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The exact sum of `unit_price * quantity` over all lines, recomputed
    /// on demand. Zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self
            .lines
            .first()
            .map_or_else(CurrencyCode::default, |line| line.unit_price.currency_code);

        let amount = self
            .lines
            .iter()
            .map(|line| line.line_total().amount)
            .sum();

        Price::new(amount, currency)
    }
}
