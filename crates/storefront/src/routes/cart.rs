//! Cart route handlers.
//!
//! Every mutation answers with the updated cart so the client never needs a
//! second round trip to redraw the cart drawer.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use satchel_core::ProductId;

use crate::catalog::{Catalog, Product};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::shoppers::ShopperStore;
use crate::state::AppState;
use crate::store::Notice;

use super::products::find_product;

// =============================================================================
// View Types
// =============================================================================

/// Cart line with its product resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Cart as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: Decimal,
    pub item_count: u32,
}

impl CartView {
    /// Snapshot the shopper's cart at current catalog prices.
    pub fn build(store: &ShopperStore, catalog: &Catalog) -> Self {
        let lines: Vec<CartLineView> = store
            .cart()
            .resolve(catalog)
            .into_iter()
            .map(|(product, quantity)| CartLineView {
                product: product.clone(),
                quantity,
                line_total: product.price.times(quantity),
            })
            .collect();

        Self {
            subtotal: lines.iter().map(|line| line.line_total).sum(),
            item_count: store.cart_item_count(),
            lines,
        }
    }
}

/// Cart after a mutation, plus a notice where the action produces one.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub cart: CartView,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Request body naming a single product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub product_id: ProductId,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantity {
    pub product_id: ProductId,
    pub quantity: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartView> {
    let catalog = state.catalog().catalog();
    Json(shopper.with_store(|store| CartView::build(store, catalog)))
}

/// Add one unit of a product.
#[instrument(skip(state, shopper))]
pub async fn add(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<ProductRef>,
) -> Result<Json<CartResponse>> {
    let catalog = state.catalog().catalog();
    let product = find_product(catalog, &body.product_id)?;

    let (notice, cart) = shopper.with_store(|store| {
        let notice = store.add_to_cart(product);
        (notice, CartView::build(store, catalog))
    });
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product.id.as_str())]),
    );

    Ok(Json(CartResponse {
        notice: Some(notice),
        cart,
    }))
}

/// Set the quantity of a line. Zero or less removes it.
#[instrument(skip(state, shopper))]
pub async fn update(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<UpdateQuantity>,
) -> Json<CartResponse> {
    let catalog = state.catalog().catalog();
    let cart = shopper.with_store(|store| {
        store.update_quantity(&body.product_id, body.quantity);
        CartView::build(store, catalog)
    });
    Json(CartResponse { notice: None, cart })
}

/// Remove a line.
#[instrument(skip(state, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<ProductRef>,
) -> Json<CartResponse> {
    let catalog = state.catalog().catalog();
    let cart = shopper.with_store(|store| {
        store.remove_from_cart(&body.product_id);
        CartView::build(store, catalog)
    });
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", body.product_id.as_str())]),
    );
    Json(CartResponse { notice: None, cart })
}

/// Empty the cart.
#[instrument(skip(state, shopper))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartResponse> {
    let catalog = state.catalog().catalog();
    let cart = shopper.with_store(|store| {
        store.clear_cart();
        CartView::build(store, catalog)
    });
    Json(CartResponse { notice: None, cart })
}

/// Units in the cart, for the header badge.
#[instrument(skip(shopper))]
pub async fn count(CurrentShopper(shopper): CurrentShopper) -> Json<CartCount> {
    Json(CartCount {
        count: shopper.with_store(|store| store.cart_item_count()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use satchel_core::{Brand, Category};

    use super::*;
    use crate::catalog::tests::product;
    use crate::store::{MemoryStorage, StateStorage, StateStore};

    #[test]
    fn test_cart_view_prices_lines() {
        let catalog = Catalog::new(vec![
            product("a", Category::Tote, Brand::ChicVogue, 1_000),
            product("b", Category::Clutch, Brand::LuxeCarry, 2_500),
        ])
        .unwrap();
        let storage: Box<dyn StateStorage + Send> = Box::new(MemoryStorage::new());
        let mut store = StateStore::open(storage);
        store.add_to_cart(&catalog.products()[0]);
        store.add_to_cart(&catalog.products()[0]);
        store.add_to_cart(&catalog.products()[1]);

        let view = CartView::build(&store, &catalog);
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].line_total, Decimal::from(20));
        assert_eq!(view.subtotal, Decimal::from(45));
        assert_eq!(view.item_count, 3);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["itemCount"], 3);
        assert_eq!(json["lines"][1]["product"]["id"], "b");
    }

    #[test]
    fn test_update_body_accepts_negative_quantity() {
        let body: UpdateQuantity =
            serde_json::from_str(r#"{"productId":"a","quantity":-2}"#).unwrap();
        assert_eq!(body.quantity, -2);
    }
}
