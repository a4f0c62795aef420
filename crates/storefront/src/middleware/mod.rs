//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Rate limiting (governor, per route group)
//!
//! Extractors:
//! - [`CurrentShopper`] resolves the browser session to its shopper state
//! - [`RequireAuth`] / [`OptionalAuth`] expose the signed-in user

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;
pub mod shopper;

pub use auth::{OptionalAuth, RequireAuth};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use shopper::CurrentShopper;
