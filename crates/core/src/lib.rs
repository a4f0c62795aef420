//! Satchel Core - Shared domain types.
//!
//! This crate provides the types shared by every Satchel component:
//! - `storefront` - JSON storefront API (catalog, cart, checkout, auth)
//! - `cli` - Offline catalog tooling
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, catalog facets and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
