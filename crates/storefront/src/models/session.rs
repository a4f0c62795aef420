//! Session-related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous identifier tying a browser session to its cart, wishlist and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopperId(Uuid);

impl ShopperId {
    /// Generate a fresh random shopper id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ShopperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session keys.
pub mod session_keys {
    /// Key for the shopper id of this browser session.
    pub const SHOPPER_ID: &str = "shopper_id";
}
