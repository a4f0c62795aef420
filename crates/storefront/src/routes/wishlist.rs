//! Wishlist route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::Product;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::state::AppState;
use crate::store::Notice;

use super::cart::ProductRef;
use super::products::{find_product, resolve_ids};

/// Saved products, oldest first.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub products: Vec<Product>,
}

/// Result of toggling a product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub notice: Notice,
    pub in_wishlist: bool,
    pub wishlist: WishlistView,
}

/// Current wishlist.
#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<WishlistView> {
    let catalog = state.catalog().catalog();
    let ids = shopper.with_store(|store| store.wishlist().ids().to_vec());
    Json(WishlistView {
        products: resolve_ids(catalog, &ids),
    })
}

/// Add a product to the wishlist, or remove it if already saved.
#[instrument(skip(state, shopper))]
pub async fn toggle(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<ProductRef>,
) -> Result<Json<ToggleResponse>> {
    let catalog = state.catalog().catalog();
    let product = find_product(catalog, &body.product_id)?;

    let (notice, in_wishlist, ids) = shopper.with_store(|store| {
        let notice = store.toggle_wishlist(product);
        (
            notice,
            store.is_in_wishlist(&product.id),
            store.wishlist().ids().to_vec(),
        )
    });
    add_breadcrumb(
        "wishlist",
        &notice.title,
        Some(&[("product_id", product.id.as_str())]),
    );

    Ok(Json(ToggleResponse {
        notice,
        in_wishlist,
        wishlist: WishlistView {
            products: resolve_ids(catalog, &ids),
        },
    }))
}

/// Remove a product from the wishlist. Removing an unsaved product is a no-op.
#[instrument(skip(state, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(body): Json<ProductRef>,
) -> Json<WishlistView> {
    let catalog = state.catalog().catalog();
    let ids = shopper.with_store(|store| {
        store.remove_from_wishlist(&body.product_id);
        store.wishlist().ids().to_vec()
    });
    Json(WishlistView {
        products: resolve_ids(catalog, &ids),
    })
}
