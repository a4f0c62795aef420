//! Order history and tracking route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::models::order::order_history;
use crate::state::AppState;

/// Order with its tracking progress.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order: Order,
    pub progress_percent: u8,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            progress_percent: order.progress_percent(),
            order,
        }
    }
}

/// The signed-in shopper's orders, most recent first. Empty renders as
/// "No Orders Yet".
#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderView>,
}

/// Order history for signed-in shoppers.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user, _): RequireAuth,
) -> Json<OrderList> {
    let orders = order_history(state.catalog().catalog())
        .into_iter()
        .map(OrderView::from)
        .collect();
    Json(OrderList { orders })
}

/// Order detail for signed-in shoppers.
///
/// Orders from the history resolve to themselves. Other orders are not
/// stored: any `ORD-` id resolves to a placeholder in Processing, everything
/// else is 404.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user, _): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    let order = order_history(state.catalog().catalog())
        .into_iter()
        .find(|order| order.id.as_str() == id)
        .or_else(|| Order::placeholder(&id))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(OrderView::from(order)))
}
