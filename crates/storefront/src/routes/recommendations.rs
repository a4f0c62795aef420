//! Recommendation route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::Product;
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Recommendation request body.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text style preferences, e.g. "minimalist, black leather".
    #[serde(default)]
    pub preferences: String,
}

/// Recommended products, in catalog order.
#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub products: Vec<Product>,
}

/// Suggest bags from the shopper's browsing history and preferences.
///
/// Always answers 200; a failed or unconfigured completion yields an empty
/// list.
#[instrument(skip(state, shopper))]
pub async fn recommend(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<RecommendationRequest>,
) -> Json<Recommendations> {
    // Copy out so the store lock is not held across the completion call.
    let history = shopper.with_store(|store| store.history().joined());

    let products = state
        .recommendations()
        .recommend(state.catalog().catalog(), &history, &body.preferences)
        .await
        .into_iter()
        .cloned()
        .collect();

    Json(Recommendations { products })
}
