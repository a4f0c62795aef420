//! HTTP route handlers for storefront.
//!
//! Every route speaks JSON. Where the browser should move on after an
//! action, the response carries a `redirect` path instead of a 3xx.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET  /api/products           - Filtered product list (?categories=&brands=&min=&max=)
//! GET  /api/products/facets    - Filter sidebar options
//! GET  /api/products/{id}      - Product detail (records browsing history)
//!
//! # Cart
//! GET  /api/cart               - Cart lines and subtotal
//! POST /api/cart/add           - Add one unit
//! POST /api/cart/update        - Set a line quantity (zero or less removes)
//! POST /api/cart/remove        - Remove a line
//! POST /api/cart/clear         - Empty the cart
//! GET  /api/cart/count         - Header badge count
//!
//! # Wishlist / history
//! GET  /api/wishlist           - Saved products
//! POST /api/wishlist/toggle    - Add or remove a product
//! POST /api/wishlist/remove    - Remove a product
//! GET  /api/history            - Recently viewed products
//!
//! # Checkout
//! GET  /api/checkout           - Order summary (?deliveryOption=)
//! POST /api/checkout           - Place a mock order
//! GET  /api/orders             - Order history (requires auth)
//! GET  /api/orders/{id}        - Order tracking (requires auth)
//!
//! # Recommendations (rate limited)
//! POST /api/recommendations    - Suggest bags from history and preferences
//!
//! # Auth (rate limited)
//! POST /api/auth/login
//! POST /api/auth/register
//! POST /api/auth/google
//! POST /api/auth/logout
//! POST /api/auth/forgot-password
//! GET  /api/auth/me
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod history;
pub mod orders;
pub mod products;
pub mod recommendations;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/google", post(auth::google))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/facets", get(products::facets))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
}

/// Create all API routes for the storefront.
///
/// `rate_limited` attaches the per-IP governors to the auth and
/// recommendation groups. Requests without a resolvable client IP are
/// rejected by the governor, so in-process tests turn it off.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    let mut auth = auth_routes();
    let mut recommendations = Router::new().route("/", post(recommendations::recommend));
    if rate_limited {
        auth = auth.layer(auth_rate_limiter());
        recommendations = recommendations.layer(api_rate_limiter());
    }

    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .route("/api/history", get(history::show))
        .route(
            "/api/checkout",
            get(checkout::summary).post(checkout::place),
        )
        .route("/api/orders", get(orders::index))
        .route("/api/orders/{id}", get(orders::show))
        .nest("/api/recommendations", recommendations)
        .nest("/api/auth", auth)
}
