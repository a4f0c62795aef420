//! Domain models for the storefront.

pub mod order;
pub mod session;
pub mod user;

pub use order::{Order, OrderItem};
pub use session::{ShopperId, session_keys};
pub use user::User;
