//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in, registration and session observation
//! - `checkout` - Checkout form validation and mock order placement
//! - `recommendations` - LLM-backed bag recommendations

pub mod auth;
pub mod checkout;
pub mod recommendations;

pub use auth::{AuthError, AuthService, SessionObserver};
pub use checkout::{CheckoutError, CheckoutForm};
pub use recommendations::RecommendationService;
