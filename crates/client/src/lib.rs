//! Shopfront client library.
//!
//! Client-side state for a storefront web application:
//! - [`session`] - who is signed in (login, registration, social login, logout)
//! - [`cart`] - the current cart and its mutations
//! - [`oauth`] - the one-shot handler for the OAuth success redirect
//!
//! Stores talk to the storefront API through the [`api`] traits, persist the
//! bearer token through [`storage`], and report outcomes through [`notify`].
//! [`context::Storefront`] wires everything together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod navigation;
pub mod notify;
pub mod oauth;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use context::Storefront;
pub use error::{ClientError, Result};
