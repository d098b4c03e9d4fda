//! Pomelo Cart - client-side cart state manager.
//!
//! This crate owns the shopping cart's data, enforces its quantity and
//! identity invariants, persists it across sessions, and synchronizes it
//! with authentication state (clearing on logout).
//!
//! # Architecture
//!
//! - [`cart`] - The `Cart` aggregate and its `CartLine` entries; all
//!   mutation invariants live here, free of any I/O.
//! - [`storage`] - The persistence boundary: a `CartStorage` trait with a
//!   JSON-file implementation and an in-memory implementation.
//! - [`store`] - The `CartStore`, which mediates all mutation, persists
//!   after every change, and notifies subscribers.
//! - [`session`] - The `SessionBridge`, the one-way notification path from
//!   the auth collaborator into cart lifecycle.
//! - [`config`] - Environment-driven configuration.
//!
//! The store is constructed explicitly by the application's composition
//! root and passed by handle to whatever needs it - there is no ambient
//! singleton.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod session;
pub mod storage;
pub mod store;

pub use cart::{Cart, CartLine};
pub use config::{CartConfig, ConfigError};
pub use session::SessionBridge;
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, SharedCartStore};
