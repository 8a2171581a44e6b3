//! Storefront API boundary.
//!
//! # Architecture
//!
//! - [`AuthApi`] and [`CartApi`] are the only seams the stores depend on
//! - [`HttpApiClient`] implements both over `reqwest`
//! - The API client owns the bearer token lifecycle: it reads the token from
//!   [`TokenStorage`](crate::storage::TokenStorage) before each call, persists
//!   it after a successful sign-in, and removes it on logout
//!
//! Auth calls return the raw [`ApiResponse`] envelope so the session store can
//! apply its own acceptance rules (200 vs 201, token presence). Cart calls
//! return the updated cart or an error.

mod http;

pub use http::HttpApiClient;

use core::fmt;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use shopfront_core::{Cart, CartItemInput, CartItemRemoval, LoginCredentials, RegisterCredentials, User};

use crate::error::ClientError;

// =============================================================================
// Response Envelope
// =============================================================================

/// The `{ statusCode, message, data }` envelope every endpoint answers with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    /// Server message; validation errors sent as a list are joined.
    #[serde(default, deserialize_with = "message_text")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Build an envelope by hand (used when the body is not an envelope).
    #[must_use]
    pub const fn new(status_code: u16, data: Option<T>, message: Option<String>) -> Self {
        Self {
            status_code,
            message,
            data,
        }
    }

    /// 200 or 201.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status_code, 200 | 201)
    }

    /// The payload of a 200 response, if any.
    #[must_use]
    pub fn into_ok_data(self) -> Option<T> {
        if self.status_code == 200 { self.data } else { None }
    }

    /// The server message, or `fallback` when the server sent none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl ApiResponse<User> {
    /// The user of a 200 response. A user without an `_id` counts as absent.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        self.into_ok_data().filter(|user| !user.id.is_empty())
    }
}

fn message_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<Message>::deserialize(deserializer)?.map(|message| match message {
            Message::One(text) => text,
            Message::Many(parts) => parts.join(", "),
        }),
    )
}

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Payload of the login, registration and social-login endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthPayload {
    /// Present when the server opened a session. Empty strings count as absent.
    #[serde(default, deserialize_with = "non_empty_token")]
    pub access_token: Option<AccessToken>,
    /// Present when the server embeds the user; otherwise fetch it.
    #[serde(default)]
    pub user: Option<User>,
}

fn non_empty_token<'de, D>(deserializer: D) -> Result<Option<AccessToken>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|token| !token.is_empty())
        .map(AccessToken::new))
}

// =============================================================================
// Traits
// =============================================================================

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Email/password login.
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ApiResponse<AuthPayload>, ClientError>;

    /// Account registration.
    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<ApiResponse<AuthPayload>, ClientError>;

    /// Exchange a social-provider (Google) authorization code for a session.
    async fn social_login(&self, code: &str) -> Result<ApiResponse<AuthPayload>, ClientError>;

    /// Fetch the user the stored token belongs to.
    async fn current_user(&self) -> Result<ApiResponse<User>, ClientError>;

    /// Discard the stored token. Never touches the network.
    fn logout(&self);
}

/// Cart endpoints. Every mutation answers with the authoritative cart.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn get_cart(&self) -> Result<Cart, ClientError>;

    async fn add_item(&self, input: &CartItemInput) -> Result<Cart, ClientError>;

    async fn update_item(&self, input: &CartItemInput) -> Result<Cart, ClientError>;

    async fn remove_item(&self, removal: &CartItemRemoval) -> Result<Cart, ClientError>;

    async fn clear_cart(&self) -> Result<(), ClientError>;
}
