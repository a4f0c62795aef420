//! Authentication extractors.
//!
//! The signed-in user is whatever the shopper's session observer currently
//! holds.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::models::User;
use crate::shoppers::Shopper;
use crate::state::AppState;

use super::CurrentShopper;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user, _): RequireAuth) -> String {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User, pub Arc<Shopper>);

/// Rejection for requests that need a signed-in user.
pub enum AuthRejection {
    /// No user is signed in.
    Unauthorized,
    /// The shopper could not be resolved.
    App(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Please sign in to continue", "redirect": "/login" })),
            )
                .into_response(),
            Self::App(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentShopper(shopper) = CurrentShopper::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::App)?;
        let user = shopper.user().ok_or(AuthRejection::Unauthorized)?;
        Ok(Self(user, shopper))
    }
}

/// Extractor that optionally gets the signed-in user.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentShopper(shopper) = CurrentShopper::from_request_parts(parts, state).await?;
        Ok(Self(shopper.user()))
    }
}
