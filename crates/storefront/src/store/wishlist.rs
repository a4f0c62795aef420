//! Saved-for-later products.

use serde::{Deserialize, Serialize};

use satchel_core::ProductId;

/// Outcome of toggling a product on the wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

/// Insertion-ordered set of product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct Wishlist {
    ids: Vec<ProductId>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove `id` if present, add it otherwise.
    pub fn toggle(&mut self, id: &ProductId) -> WishlistChange {
        if self.remove(id) {
            WishlistChange::Removed
        } else {
            self.ids.push(id.clone());
            WishlistChange::Added
        }
    }

    /// Returns whether `id` was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }
}

impl From<Vec<ProductId>> for Wishlist {
    fn from(ids: Vec<ProductId>) -> Self {
        let mut wishlist = Self::new();
        for id in ids {
            if !wishlist.contains(&id) {
                wishlist.ids.push(id);
            }
        }
        wishlist
    }
}

impl From<Wishlist> for Vec<ProductId> {
    fn from(wishlist: Wishlist) -> Self {
        wishlist.ids
    }
}
