//! Checkout route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use satchel_core::DeliveryOption;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::models::Order;
use crate::services::checkout::{
    CheckoutForm, CheckoutSummary, checkout_summary, order_placed_notice, place_order,
};
use crate::state::AppState;
use crate::store::Notice;

/// Query parameters for the order summary.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    #[serde(default)]
    pub delivery_option: DeliveryOption,
}

/// Response to a placed order.
#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub order: Order,
    pub notice: Notice,
    pub redirect: String,
}

/// Order summary for the chosen delivery option.
///
/// An empty cart answers 409 with a redirect back to `/cart`.
#[instrument(skip(state, shopper))]
pub async fn summary(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<CheckoutSummary>> {
    let catalog = state.catalog().catalog();
    let summary =
        shopper.with_store(|store| checkout_summary(store, catalog, query.delivery_option))?;
    Ok(Json(summary))
}

/// Validate the form and place a mock order.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn place(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<OrderPlaced>)> {
    let catalog = state.catalog().catalog();
    let order = shopper.with_store(|store| place_order(store, catalog, &form))?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order.id.as_str())]),
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderPlaced {
            redirect: format!("/orders/{}", order.id),
            notice: order_placed_notice(),
            order,
        }),
    ))
}
