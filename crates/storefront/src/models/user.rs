//! Signed-in user, as cached by the storefront.

use serde::{Deserialize, Serialize};

use satchel_core::UserId;

/// Display name used when the identity provider has none.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// The authenticated user.
///
/// The identity provider is authoritative; this is a local copy refreshed on
/// every session change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Email address, empty when the provider account has none.
    pub email: String,
}

impl User {
    /// Build a user from provider fields, filling in defaults for missing values.
    #[must_use]
    pub fn from_provider(
        uid: impl Into<String>,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Self {
        let name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);
        Self {
            id: UserId::new(uid),
            name: name.to_owned(),
            email: email.unwrap_or_default().to_owned(),
        }
    }
}
