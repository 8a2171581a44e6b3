//! `reqwest` implementation of the storefront API traits.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{Cart, CartItemInput, CartItemRemoval, LoginCredentials, RegisterCredentials, User};

use super::{ApiResponse, AuthApi, AuthPayload, CartApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::storage::{self, ACCESS_TOKEN_KEY, TokenStorage};

/// How much of an unexpected body to keep in error messages and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// HTTP client for the storefront API.
///
/// Cheap to clone; clones share the connection pool and token storage.
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpApiClientInner>,
}

struct HttpApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn TokenStorage>,
}

impl HttpApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(client, config.api_url.clone(), storage))
    }

    /// Create a client from an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            inner: Arc::new(HttpApiClientInner {
                client,
                base_url,
                storage,
            }),
        }
    }

    /// The storage this client reads its bearer token from.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.inner.storage
    }

    /// Build a request against an endpoint relative to the base URL,
    /// attaching the stored bearer token if there is one.
    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.inner.base_url.join(endpoint).map_err(|e| ClientError::Api {
            status: 0,
            message: format!("Invalid endpoint {endpoint}: {e}"),
        })?;

        let request = self.inner.client.request(method, url);

        Ok(match storage::read_access_token(self.inner.storage.as_ref()) {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        })
    }

    /// Send a request and decode the response envelope.
    ///
    /// Error statuses are returned as envelopes too, so callers decide what
    /// counts as failure.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = %status, "API response received");
        decode_envelope(status, &body)
    }

    /// Send a cart request and require a 2xx status.
    async fn send_cart<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>, ClientError> {
        let response = self.send::<T>(request).await?;

        if !(200..300).contains(&response.status_code) {
            tracing::warn!(
                status = response.status_code,
                message = ?response.message,
                "Cart request rejected"
            );
            return Err(ClientError::Api {
                status: response.status_code,
                message: response.message_or("Cart request failed"),
            });
        }

        Ok(response.data)
    }

    async fn send_for_cart(&self, request: RequestBuilder) -> Result<Cart, ClientError> {
        self.send_cart::<Cart>(request).await?.ok_or_else(|| ClientError::Api {
            status: 200,
            message: "Cart missing from response".to_string(),
        })
    }

    /// Persist the token from a successful sign-in response.
    fn persist_session(&self, response: &ApiResponse<AuthPayload>) -> Result<(), ClientError> {
        if !response.is_success() {
            return Ok(());
        }

        if let Some(token) = response.data.as_ref().and_then(|d| d.access_token.as_ref()) {
            self.inner.storage.set(ACCESS_TOKEN_KEY, token.expose())?;
            debug!("Access token persisted");
        }

        Ok(())
    }
}

/// Decode a response body into an envelope.
///
/// Accepts a proper `{ statusCode, ... }` envelope, a bare payload on
/// success, or anything at all on failure (the body becomes the message).
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<ApiResponse<T>, ClientError> {
    let code = status.as_u16();

    if body.trim().is_empty() {
        let message = (!status.is_success()).then(|| reason(status));
        return Ok(ApiResponse::new(code, None, message));
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if status.is_success() => {
            tracing::error!(
                error = %e,
                body = %excerpt(body),
                "Failed to parse API response"
            );
            return Err(ClientError::Parse(e));
        }
        Err(_) => return Ok(ApiResponse::new(code, None, Some(excerpt(body)))),
    };

    if value.get("statusCode").is_some() {
        return Ok(serde_json::from_value(value)?);
    }

    if status.is_success() {
        let data = serde_json::from_value(value)?;
        return Ok(ApiResponse::new(code, Some(data), None));
    }

    let message = value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| reason(status), str::to_string);
    Ok(ApiResponse::new(code, None, Some(message)))
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[async_trait]
impl AuthApi for HttpApiClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<ApiResponse<AuthPayload>, ClientError> {
        let request = self.request(Method::POST, "auth/login")?.json(credentials);
        let response = self.send(request).await?;
        self.persist_session(&response)?;
        Ok(response)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<ApiResponse<AuthPayload>, ClientError> {
        let request = self.request(Method::POST, "auth/register")?.json(credentials);
        let response = self.send(request).await?;
        self.persist_session(&response)?;
        Ok(response)
    }

    #[instrument(skip_all)]
    async fn social_login(&self, code: &str) -> Result<ApiResponse<AuthPayload>, ClientError> {
        let request = self
            .request(Method::POST, "auth/google")?
            .json(&json!({ "code": code }));
        let response = self.send(request).await?;
        self.persist_session(&response)?;
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<ApiResponse<User>, ClientError> {
        let request = self.request(Method::GET, "auth/me")?;
        self.send(request).await
    }

    fn logout(&self) {
        storage::discard_access_token(self.inner.storage.as_ref());
        debug!("Access token discarded");
    }
}

#[async_trait]
impl CartApi for HttpApiClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ClientError> {
        let request = self.request(Method::GET, "cart")?;
        self.send_for_cart(request).await
    }

    #[instrument(skip(self), fields(product_id = %input.product_id))]
    async fn add_item(&self, input: &CartItemInput) -> Result<Cart, ClientError> {
        let request = self.request(Method::POST, "cart/items")?.json(input);
        self.send_for_cart(request).await
    }

    #[instrument(skip(self), fields(product_id = %input.product_id))]
    async fn update_item(&self, input: &CartItemInput) -> Result<Cart, ClientError> {
        let request = self.request(Method::PATCH, "cart/items")?.json(input);
        self.send_for_cart(request).await
    }

    #[instrument(skip(self), fields(product_id = %removal.product_id))]
    async fn remove_item(&self, removal: &CartItemRemoval) -> Result<Cart, ClientError> {
        let request = self.request(Method::DELETE, "cart/items")?.json(removal);
        self.send_for_cart(request).await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, "cart")?;
        self.send_cart::<serde_json::Value>(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope() {
        let response: ApiResponse<User> = decode_envelope(
            StatusCode::OK,
            r#"{"statusCode":200,"data":{"_id":"u1","email":"a@b.c","name":"A","avatar":""}}"#,
        )
        .unwrap();
        assert_eq!(response.into_ok_data().unwrap().id.as_str(), "u1");
    }

    #[test]
    fn test_decode_bare_success_payload() {
        let response: ApiResponse<Cart> =
            decode_envelope(StatusCode::OK, r#"{"items":[],"totalPrice":0}"#).unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.data.unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_without_envelope() {
        let response: ApiResponse<User> =
            decode_envelope(StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#).unwrap();
        assert_eq!(response.status_code, 401);
        assert_eq!(response.message.as_deref(), Some("Token expired"));

        let response: ApiResponse<User> =
            decode_envelope(StatusCode::BAD_GATEWAY, "<html>upstream down</html>").unwrap();
        assert_eq!(response.message.as_deref(), Some("<html>upstream down</html>"));
    }

    #[test]
    fn test_decode_empty_bodies() {
        let ok: ApiResponse<serde_json::Value> = decode_envelope(StatusCode::NO_CONTENT, "").unwrap();
        assert!(ok.data.is_none());
        assert!(ok.message.is_none());

        let err: ApiResponse<serde_json::Value> = decode_envelope(StatusCode::NOT_FOUND, "").unwrap();
        assert_eq!(err.message.as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_decode_malformed_success_is_parse_error() {
        let result: Result<ApiResponse<User>, _> = decode_envelope(StatusCode::OK, "{not json");
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }
}
