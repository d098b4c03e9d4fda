//! The one-way notification path from authentication into cart lifecycle.

use crate::store::SharedCartStore;

/// Notifies the cart when a user session ends.
///
/// The composition root hands one of these to the auth collaborator, which
/// calls [`SessionBridge::on_session_ended`] on explicit logout. That is
/// the bridge's entire surface: the auth layer never reaches into cart
/// internals, and the cart never observes logins - the cart is
/// device-scoped, not account-scoped.
#[derive(Clone)]
pub struct SessionBridge {
    store: SharedCartStore,
}

impl SessionBridge {
    /// Create a bridge over the given store handle.
    #[must_use]
    pub const fn new(store: SharedCartStore) -> Self {
        Self { store }
    }

    /// The user transitioned from authenticated to unauthenticated.
    ///
    /// Erases the in-memory cart and the persisted snapshot, so cart
    /// contents never persist across distinct user sessions on a shared
    /// device.
    pub fn on_session_ended(&self) {
        self.store.on_session_ended();
    }
}
