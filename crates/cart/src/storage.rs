//! The persistence boundary for the cart.
//!
//! A single durable key holds the serialized array of cart lines in display
//! order. Absence of the key, or a value that fails to parse as that shape,
//! is treated as an empty cart - availability wins over strictness, so a
//! corrupt snapshot never surfaces as an error to the user.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::cart::Cart;

/// Errors that can occur writing or clearing the persisted cart.
///
/// Read-side failures are never surfaced; `load` degrades to an empty cart
/// instead.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying storage I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The cart snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The durable storage boundary the cart store reads from and writes to.
///
/// `save` overwrites the full snapshot (last write wins); `clear` removes
/// the snapshot entirely so the next `load` starts empty.
pub trait CartStorage: Send {
    /// Load the previously persisted cart.
    ///
    /// Returns an empty cart if nothing was persisted or the persisted
    /// data is unreadable or corrupt.
    fn load(&self) -> Cart;

    /// Durably write the full cart snapshot, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    fn save(&self, cart: &Cart) -> Result<(), StorageError>;

    /// Remove the persisted cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying removal fails.
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: CartStorage + Sync + ?Sized> CartStorage for std::sync::Arc<S> {
    fn load(&self) -> Cart {
        (**self).load()
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        (**self).save(cart)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// File-backed storage: one JSON file holding the cart snapshot.
///
/// The native equivalent of the browser's local storage key.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create storage backed by the given file path.
    ///
    /// The file is not created until the first `save`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path backing this storage.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Cart {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Cart::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read cart storage: {e}");
                return Cart::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Persisted cart is corrupt, starting empty: {e}"
                );
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string(cart)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests and for running without a writable disk.
///
/// Snapshots pass through the same serialized form as the file-backed
/// storage, so round-trip behavior matches.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed storage with a raw serialized value, as a prior process would
    /// have left it. Useful for corruption tests.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(raw.into())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Cart {
        let guard = self.lock();
        let Some(raw) = guard.as_deref() else {
            return Cart::new();
        };

        match serde_json::from_str(raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!("Persisted cart is corrupt, starting empty: {e}");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        *self.lock() = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pomelo_core::{CurrencyCode, Product, ProductId};

    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            &Product {
                id: ProductId::new(1),
                title: "Shirt".to_string(),
                price: "19.99".parse().unwrap(),
                image: "x".to_string(),
            },
            CurrencyCode::USD,
        );
        cart
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        let cart = sample_cart();

        storage.save(&cart).unwrap();
        assert_eq!(storage.load(), cart);
    }

    #[test]
    fn test_memory_load_empty_when_never_saved() {
        assert!(MemoryStorage::new().load().is_empty());
    }

    #[test]
    fn test_memory_corrupt_value_loads_empty() {
        let storage = MemoryStorage::with_raw("{not json");
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_memory_clear_then_load_is_empty() {
        let storage = MemoryStorage::new();
        storage.save(&sample_cart()).unwrap();
        storage.clear().unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("cart.json"));
        let cart = sample_cart();

        storage.save(&cart).unwrap();
        assert_eq!(storage.load(), cart);
    }

    #[test]
    fn test_file_missing_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("missing.json"));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_file_corrupt_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "definitely not json").unwrap();

        assert!(JsonFileStorage::new(path).load().is_empty());
    }

    #[test]
    fn test_file_wrong_shape_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        // Valid JSON, but not an array of cart lines
        std::fs::write(&path, r#"{"hello":"world"}"#).unwrap();

        assert!(JsonFileStorage::new(path).load().is_empty());
    }

    #[test]
    fn test_file_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("cart.json"));

        storage.save(&sample_cart()).unwrap();
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_file_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested/state/cart.json"));

        storage.save(&sample_cart()).unwrap();
        assert_eq!(storage.load().len(), 1);
    }
}
