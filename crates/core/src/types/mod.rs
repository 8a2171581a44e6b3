//! Core types for the Shopfront client.

pub mod cart;
pub mod credentials;
pub mod email;
pub mod id;
pub mod price;
pub mod user;

pub use cart::{Cart, CartItem, CartItemInput, CartItemRemoval};
pub use credentials::{LoginCredentials, RegisterCredentials};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use user::User;
