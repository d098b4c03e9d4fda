//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A product record as supplied by the upstream catalog.
///
/// This is the shape the catalog's JSON API returns for a single product;
/// the cart only consumes the fields it needs for display. The catalog is
/// an external collaborator, so this type stays dumb - no fetching here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the catalog's currency, as a plain decimal amount.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
}
