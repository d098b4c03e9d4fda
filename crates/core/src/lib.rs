//! Pomelo Core - Shared types library.
//!
//! This crate provides common types used across all Pomelo components:
//! - `cart` - Client-side cart state manager
//! - `integration-tests` - Cross-crate test suite
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices, plus the
//!   catalog product record shape

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
