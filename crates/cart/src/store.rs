//! The cart store: the sole owner and mutator of the cart.
//!
//! Every mutation runs in three synchronous steps: mutate the in-memory
//! [`Cart`], persist the new snapshot, notify subscribers. Persistence
//! failures are logged and swallowed - the in-memory cart stays
//! authoritative for the remainder of the session, so a mutation always
//! succeeds from the caller's perspective.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pomelo_core::{CurrencyCode, Price, Product, ProductId};

use crate::cart::{Cart, CartLine};
use crate::config::CartConfig;
use crate::storage::{CartStorage, JsonFileStorage};

/// A subscriber notified with the current cart after every mutation.
pub type CartListener = Box<dyn Fn(&Cart) + Send>;

/// Owns the [`Cart`] and mediates all mutation.
///
/// Constructed explicitly by the composition root; hydrates its initial
/// state from storage. UI layers subscribe via [`CartStore::subscribe`]
/// instead of holding framework-reactive state of their own.
pub struct CartStore {
    cart: Cart,
    currency: CurrencyCode,
    storage: Box<dyn CartStorage>,
    listeners: Vec<CartListener>,
}

impl CartStore {
    /// Create a store hydrated from `storage`, pricing new lines in USD.
    #[must_use]
    pub fn new(storage: impl CartStorage + 'static) -> Self {
        Self::with_currency(storage, CurrencyCode::default())
    }

    /// Create a store hydrated from `storage`, pricing new lines in the
    /// given currency.
    #[must_use]
    pub fn with_currency(storage: impl CartStorage + 'static, currency: CurrencyCode) -> Self {
        let storage = Box::new(storage);
        let cart = storage.load();
        Self {
            cart,
            currency,
            storage,
            listeners: Vec::new(),
        }
    }

    /// Create a store from configuration, backed by file storage.
    #[must_use]
    pub fn from_config(config: &CartConfig) -> Self {
        Self::with_currency(
            JsonFileStorage::new(config.storage_path.clone()),
            config.currency,
        )
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// The cart total, recomputed on demand.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    /// Register a listener called with the cart after every mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&Cart) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Add one unit of `product`, merging into an existing line if present.
    pub fn add_item(&mut self, product: &Product) {
        self.cart.add(product, self.currency);
        tracing::debug!(product_id = %product.id, "Added item to cart");
        self.persist();
        self.notify();
    }

    /// Remove the line for `product_id`. A no-op if absent.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.cart.remove(product_id);
        tracing::debug!(%product_id, "Removed item from cart");
        self.persist();
        self.notify();
    }

    /// Set the quantity for `product_id`; 0 or below removes the line,
    /// unknown ids are a no-op.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        self.cart.set_quantity(product_id, quantity);
        tracing::debug!(%product_id, quantity, "Updated cart quantity");
        self.persist();
        self.notify();
    }

    /// Empty the cart and persist an empty snapshot.
    ///
    /// A `load` immediately afterwards returns an empty cart, not "no
    /// data" - the storage key is overwritten, not deleted.
    pub fn clear(&mut self) {
        self.cart.clear();
        tracing::debug!("Cleared cart");
        self.persist();
        self.notify();
    }

    /// Session-end notification from the auth collaborator.
    ///
    /// Empties the in-memory cart and deletes the persisted snapshot
    /// entirely, so the cart never leaks across user sessions on a shared
    /// device. One-way: login does not rehydrate anything.
    pub fn on_session_ended(&mut self) {
        self.cart.clear();
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to clear cart storage on logout: {e}");
        }
        tracing::debug!("Session ended, cart erased");
        self.notify();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.cart) {
            tracing::warn!("Failed to persist cart, keeping in-memory state: {e}");
        }
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.cart);
        }
    }
}

/// A cheaply cloneable handle to a [`CartStore`].
///
/// The composition root constructs one and hands clones to the UI layer
/// and the auth collaborator's [`SessionBridge`](crate::SessionBridge).
#[derive(Clone)]
pub struct SharedCartStore {
    inner: Arc<Mutex<CartStore>>,
}

impl SharedCartStore {
    /// Wrap a store in a shared handle.
    #[must_use]
    pub fn new(store: CartStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartStore> {
        // The store stays consistent even if a listener panicked mid-notify
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`CartStore::add_item`].
    pub fn add_item(&self, product: &Product) {
        self.lock().add_item(product);
    }

    /// See [`CartStore::remove_item`].
    pub fn remove_item(&self, product_id: ProductId) {
        self.lock().remove_item(product_id);
    }

    /// See [`CartStore::update_quantity`].
    pub fn update_quantity(&self, product_id: ProductId, quantity: i64) {
        self.lock().update_quantity(product_id, quantity);
    }

    /// See [`CartStore::clear`].
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// See [`CartStore::on_session_ended`].
    pub fn on_session_ended(&self) {
        self.lock().on_session_ended();
    }

    /// See [`CartStore::subscribe`].
    pub fn subscribe(&self, listener: impl Fn(&Cart) + Send + 'static) {
        self.lock().subscribe(listener);
    }

    /// A snapshot of the current lines in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock().item_count()
    }

    /// The cart total, recomputed on demand.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lock().total()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    fn shirt() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Shirt".to_string(),
            price: "19.99".parse().unwrap(),
            image: "x".to_string(),
        }
    }

    /// Storage whose writes always fail, as when the medium is full.
    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self) -> Cart {
            Cart::new()
        }

        fn save(&self, _cart: &Cart) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }

        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_every_mutation_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::new(Arc::clone(&storage));

        store.add_item(&shirt());
        assert_eq!(storage.load().len(), 1);

        store.update_quantity(ProductId::new(1), 4);
        assert_eq!(storage.load().lines()[0].quantity, 4);

        store.remove_item(ProductId::new(1));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_hydrates_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = CartStore::new(Arc::clone(&storage));
            store.add_item(&shirt());
            store.add_item(&shirt());
        }

        // A fresh store over the same storage sees the persisted cart
        let store = CartStore::new(Arc::clone(&storage));
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.total().amount, "39.98".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_clear_persists_empty_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::new(Arc::clone(&storage));

        store.add_item(&shirt());
        store.clear();
        store.clear();

        // The snapshot exists and is empty - clear overwrites, not deletes
        assert!(store.is_empty());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_session_end_erases_memory_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::new(Arc::clone(&storage));

        store.add_item(&shirt());
        store.on_session_ended();

        assert!(store.is_empty());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut store = CartStore::new(BrokenStorage);

        store.add_item(&shirt());
        store.add_item(&shirt());

        // The mutation succeeded from the caller's perspective
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.total().amount, "39.98".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_listeners_notified_on_every_mutation() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut store = CartStore::new(MemoryStorage::new());

        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.add_item(&shirt());
        store.update_quantity(ProductId::new(1), 3);
        store.remove_item(ProductId::new(1));
        store.clear();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_listener_sees_current_cart() {
        let seen = Arc::new(AtomicU32::new(0));
        let mut store = CartStore::new(MemoryStorage::new());

        let seen_count = Arc::clone(&seen);
        store.subscribe(move |cart| {
            seen_count.store(cart.item_count(), Ordering::SeqCst);
        });

        store.add_item(&shirt());
        store.add_item(&shirt());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shared_handle_clones_share_state() {
        let store = SharedCartStore::new(CartStore::new(MemoryStorage::new()));
        let other = store.clone();

        store.add_item(&shirt());
        assert_eq!(other.item_count(), 1);

        other.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_currency_flows_into_new_lines() {
        let mut store =
            CartStore::with_currency(MemoryStorage::new(), CurrencyCode::GBP);
        store.add_item(&shirt());

        assert_eq!(
            store.lines()[0].unit_price.currency_code,
            CurrencyCode::GBP
        );
        assert_eq!(store.total().display(), "£19.99");
    }
}
