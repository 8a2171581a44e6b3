//! Unified error handling with Sentry integration.
//!
//! Every store operation returns `Result<T, ClientError>`. The `Display`
//! output of each variant is the message shown to the user, so callers can
//! forward `err.to_string()` straight into a notification.

use thiserror::Error;

use crate::storage::StorageError;

/// Shown when registration succeeds but the follow-up login does not.
pub const AUTO_LOGIN_FAILED_MESSAGE: &str =
    "Registration successful but auto-login failed. Please try logging in manually.";

/// Client-level error type for the session and cart stores.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing local token storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP or envelope status code.
        status: u16,
        /// Server-provided message, or a generic fallback.
        message: String,
    },

    /// Authentication was rejected or returned an unusable response.
    #[error("{0}")]
    Auth(String),

    /// Registration succeeded but no session could be obtained.
    #[error("{}", AUTO_LOGIN_FAILED_MESSAGE)]
    AutoLoginFailed,
}

impl ClientError {
    /// Status code reported by the API, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context after a successful sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.filter(|e| !e.is_empty()).map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a failed user action as a Sentry breadcrumb.
///
/// Breadcrumbs show up in later error reports as the trail of actions that
/// preceded the error.
pub fn add_failure_breadcrumb(category: &str, message: &str, error: &ClientError) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Warning,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "error".to_string(),
        serde_json::Value::String(error.to_string()),
    );
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_user_facing_message() {
        let err = ClientError::Api {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status(), Some(409));

        assert_eq!(
            ClientError::Auth("Login failed".to_string()).to_string(),
            "Login failed"
        );
    }

    #[test]
    fn test_auto_login_failed_message() {
        assert_eq!(
            ClientError::AutoLoginFailed.to_string(),
            "Registration successful but auto-login failed. Please try logging in manually."
        );
        assert_eq!(ClientError::AutoLoginFailed.status(), None);
    }
}
