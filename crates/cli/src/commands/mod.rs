//! Command implementations.

pub mod auth;
pub mod cart;
pub mod oauth;

use shopfront_client::ClientError;
use shopfront_client::config::ConfigError;
use shopfront_core::EmailError;
use thiserror::Error;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid redirect URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Redirect(String),

    #[error("Cart could not be loaded")]
    CartUnavailable,
}
