//! Browsing history route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::Product;
use crate::middleware::CurrentShopper;
use crate::state::AppState;

use super::products::resolve_ids;

/// Recently viewed products, most recent first.
#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub products: Vec<Product>,
}

#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<HistoryView> {
    let ids = shopper.with_store(|store| store.history().ids().to_vec());
    Json(HistoryView {
        products: resolve_ids(state.catalog().catalog(), &ids),
    })
}
