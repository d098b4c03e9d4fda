//! Integration tests for Pomelo.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pomelo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store invariants over shared handles
//! - `persistence` - File-backed round-trip and reload behavior
//! - `session` - Logout erasure through the session bridge
//!
//! Shared fixtures live here so the test files stay focused on behavior.

use pomelo_core::{Product, ProductId};
use rust_decimal::Decimal;

/// A catalog product fixture with the given id and price.
///
/// # Panics
///
/// Panics if `price` is not a valid decimal literal.
#[must_use]
pub fn product(id: i64, title: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: price.parse::<Decimal>().expect("valid decimal literal"),
        image: format!("https://cdn.example.com/{id}.jpg"),
    }
}
