//! Shopper extractor.
//!
//! Resolves the browser session to its [`Shopper`], assigning a fresh
//! shopper id on the first request of a session.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{ShopperId, session_keys};
use crate::shoppers::Shopper;
use crate::state::AppState;

/// The shopper behind the current request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentShopper(shopper): CurrentShopper) -> String {
///     shopper.with_store(|store| store.cart_item_count()).to_string()
/// }
/// ```
pub struct CurrentShopper(pub Arc<Shopper>);

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = match session.get::<ShopperId>(session_keys::SHOPPER_ID).await? {
            Some(id) => id,
            None => {
                let id = ShopperId::generate();
                session.insert(session_keys::SHOPPER_ID, id).await?;
                tracing::debug!(shopper_id = %id, "new shopper");
                id
            }
        };

        Ok(Self(state.shoppers().get_or_load(id).await))
    }
}
