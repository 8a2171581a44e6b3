//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types exchanged between the Shopfront client
//! stores and the storefront API:
//! - users and the credentials used to obtain them
//! - carts, line items, and cart mutations
//! - validated emails, string-backed IDs, and prices
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no state.
//! Wire names follow the storefront API (`_id`, `camelCase` fields).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and wire models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
