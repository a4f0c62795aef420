//! Per-shopper state: cart, wishlist, browsing history and cached user.
//!
//! A [`StateStore`] only exists once its persisted state has been loaded
//! (see [`StateStore::open`]), so a write can never clobber saved state
//! before it was read. Every mutation writes its own key through to the
//! storage backend; write failures are logged and otherwise ignored.

pub mod cart;
pub mod history;
pub mod storage;
pub mod wishlist;

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use satchel_core::ProductId;

use crate::catalog::{Catalog, Product};
use crate::models::User;

pub use cart::{Cart, CartLine};
pub use history::{BrowsingHistory, HISTORY_LIMIT};
pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError};
pub use wishlist::{Wishlist, WishlistChange};

/// Storage keys for persisted shopper state.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    pub const HISTORY: &str = "browsingHistory";
    pub const USER: &str = "user";
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Destructive,
}

/// A short user-facing message describing the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Info,
        }
    }

    /// A notice reporting a failure.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Destructive,
        }
    }
}

/// Loaded shopper state over a storage backend.
#[derive(Debug)]
pub struct StateStore<S> {
    storage: S,
    cart: Cart,
    wishlist: Wishlist,
    history: BrowsingHistory,
    user: Option<User>,
}

impl<S: StateStorage> StateStore<S> {
    /// Load all persisted state from `storage`.
    ///
    /// A key that cannot be read or parsed is logged and starts empty.
    pub fn open(storage: S) -> Self {
        let cart = load_key(&storage, keys::CART).unwrap_or_default();
        let wishlist = load_key(&storage, keys::WISHLIST).unwrap_or_default();
        let history = load_key(&storage, keys::HISTORY).unwrap_or_default();
        let user = load_key(&storage, keys::USER);

        Self {
            storage,
            cart,
            wishlist,
            history,
            user,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn history(&self) -> &BrowsingHistory {
        &self.history
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of `product` to the cart.
    pub fn add_to_cart(&mut self, product: &Product) -> Notice {
        self.cart.add(&product.id);
        persist(&mut self.storage, keys::CART, &self.cart);
        Notice::info(
            "Added to cart",
            format!("{} is now in your cart.", product.name),
        )
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) {
        if self.cart.remove(id) {
            persist(&mut self.storage, keys::CART, &self.cart);
        }
    }

    /// Replace the quantity of a cart line; zero or less removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if self.cart.set_quantity(id, quantity) {
            persist(&mut self.storage, keys::CART, &self.cart);
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        persist(&mut self.storage, keys::CART, &self.cart);
    }

    /// Add `product` to the wishlist, or remove it if already there.
    pub fn toggle_wishlist(&mut self, product: &Product) -> Notice {
        let change = self.wishlist.toggle(&product.id);
        persist(&mut self.storage, keys::WISHLIST, &self.wishlist);
        match change {
            WishlistChange::Added => Notice::info(
                "Added to wishlist",
                format!("{} is now in your wishlist.", product.name),
            ),
            WishlistChange::Removed => Notice::info(
                "Removed from wishlist",
                format!("{} has been removed from your wishlist.", product.name),
            ),
        }
    }

    pub fn remove_from_wishlist(&mut self, id: &ProductId) {
        if self.wishlist.remove(id) {
            persist(&mut self.storage, keys::WISHLIST, &self.wishlist);
        }
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: &ProductId) -> bool {
        self.wishlist.contains(id)
    }

    /// Record a product view.
    pub fn add_to_history(&mut self, id: &ProductId) {
        self.history.record(id.clone());
        persist(&mut self.storage, keys::HISTORY, &self.history);
    }

    /// Cache the signed-in user, or forget it on sign-out.
    pub fn set_user(&mut self, user: Option<User>) {
        if self.user == user {
            return;
        }
        self.user = user;
        match &self.user {
            Some(user) => persist(&mut self.storage, keys::USER, user),
            None => {
                if let Err(e) = self.storage.remove(keys::USER) {
                    tracing::warn!(
                        key = keys::USER,
                        error = %e,
                        "failed to remove persisted state"
                    );
                }
            }
        }
    }

    /// Cart subtotal at current catalog prices.
    #[must_use]
    pub fn cart_total(&self, catalog: &Catalog) -> Decimal {
        self.cart.total(catalog)
    }

    /// Units in the cart, for the header badge.
    #[must_use]
    pub fn cart_item_count(&self) -> u32 {
        self.cart.item_count()
    }
}

/// Write `value` under `key`. Failures are logged; the in-memory state stays
/// authoritative.
fn persist<S: StateStorage, T: Serialize + ?Sized>(storage: &mut S, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize state");
            return;
        }
    };
    if let Err(e) = storage.save(key, &json) {
        tracing::warn!(key, error = %e, "failed to persist state");
    }
}

fn load_key<S: StateStorage, T: DeserializeOwned>(storage: &S, key: &str) -> Option<T> {
    let raw = match storage.load(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding malformed persisted state");
            None
        }
    }
}
