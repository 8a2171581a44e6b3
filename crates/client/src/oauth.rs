//! OAuth redirect handler.
//!
//! After a successful Google sign-in the API redirects the browser to the
//! storefront with the session in the query string:
//!
//! ```text
//! /auth/google-success?access_token=...&user_id=...&user_name=Jane+Doe&user_email=...&user_avatar=...
//! ```
//!
//! The handler persists the token, seeds the session store with a provisional
//! user built from the query (so the UI flips to signed-in immediately), then
//! reconciles with a full user fetch and navigates home.
//!
//! The effect runs at most once per handler, however many times it is invoked.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

use shopfront_core::{User, UserId};

use crate::api::AuthApi;
use crate::navigation::{Navigator, paths};
use crate::notify::{Notification, Notifier};
use crate::session::SessionStore;
use crate::storage::{ACCESS_TOKEN_KEY, StorageError, TokenStorage};

const FALLBACK_FAILURE_MESSAGE: &str = "Google login failed";
const MISSING_TOKEN_MESSAGE: &str = "No access token received from Google login";
const SUCCESS_MESSAGE: &str = "Logged in with Google successfully";

/// Errors that abort the redirect after the token was received.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("Failed to store access token: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid user name in redirect: {0}")]
    InvalidName(String),
}

/// Handler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPhase {
    #[default]
    Processing,
    Done,
}

/// How a handled redirect ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Signed in; carries the user left in the session store.
    SignedIn(User),
    /// The redirect carried no access token.
    MissingToken,
    /// Processing failed after the token was received.
    Failed(String),
}

/// Session parameters carried by the redirect URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_avatar: Option<String>,
}

impl RedirectParams {
    /// Read the parameters from a URL's query string.
    ///
    /// Values are form-decoded (`+` becomes a space). Empty values count as
    /// absent. The first occurrence of a repeated key wins.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "access_token" => &mut params.access_token,
                "user_id" => &mut params.user_id,
                "user_name" => &mut params.user_name,
                "user_email" => &mut params.user_email,
                "user_avatar" => &mut params.user_avatar,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }

    /// Build the provisional user shown until the full fetch completes.
    ///
    /// The name is percent-decoded once more and any remaining `+` becomes a
    /// space, so both `Jane+Doe` and `Jane%2BDoe` display as "Jane Doe".
    ///
    /// # Errors
    ///
    /// Returns [`RedirectError::InvalidName`] if the name does not decode to UTF-8.
    pub fn provisional_user(&self) -> Result<User, RedirectError> {
        let name = match self.user_name.as_deref() {
            Some(raw) => urlencoding::decode(raw)
                .map_err(|e| RedirectError::InvalidName(e.to_string()))?
                .replace('+', " "),
            None => String::new(),
        };

        Ok(User {
            id: UserId::new(self.user_id.clone().unwrap_or_default()),
            email: self.user_email.clone().unwrap_or_default(),
            name,
            avatar: self.user_avatar.clone().unwrap_or_default(),
        })
    }
}

/// One-shot handler for the OAuth success redirect.
pub struct OAuthRedirectHandler {
    session: SessionStore,
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    ran: AtomicBool,
    phase: watch::Sender<RedirectPhase>,
}

impl OAuthRedirectHandler {
    #[must_use]
    pub fn new(
        session: SessionStore,
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            api,
            storage,
            notifier,
            navigator,
            ran: AtomicBool::new(false),
            phase: watch::Sender::new(RedirectPhase::Processing),
        }
    }

    #[must_use]
    pub fn phase(&self) -> RedirectPhase {
        *self.phase.borrow()
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.phase() == RedirectPhase::Processing
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RedirectPhase> {
        self.phase.subscribe()
    }

    /// Process the redirect URL.
    ///
    /// Returns `None` without side effects if the handler already ran.
    #[instrument(skip_all)]
    pub async fn handle(&self, url: &Url) -> Option<RedirectOutcome> {
        // Latch before the first await so re-entrant calls see it.
        if self.ran.swap(true, Ordering::SeqCst) {
            debug!("OAuth redirect already handled, ignoring");
            return None;
        }

        let outcome = self.process(RedirectParams::from_url(url)).await;
        self.phase.send_replace(RedirectPhase::Done);
        Some(outcome)
    }

    async fn process(&self, params: RedirectParams) -> RedirectOutcome {
        let Some(token) = params.access_token.clone() else {
            warn!("OAuth redirect without access token");
            self.notifier.notify(Notification::error(MISSING_TOKEN_MESSAGE));
            self.navigator.push(paths::LOGIN);
            return RedirectOutcome::MissingToken;
        };

        match self.complete(&token, &params).await {
            Ok(user) => {
                self.notifier.notify(Notification::success(SUCCESS_MESSAGE));
                self.navigator.push(paths::HOME);
                RedirectOutcome::SignedIn(user)
            }
            Err(e) => {
                let message = Some(e.to_string())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
                warn!(error = %message, "OAuth redirect failed");
                self.notifier.notify(Notification::error(message.clone()));
                self.navigator.push(paths::LOGIN);
                RedirectOutcome::Failed(message)
            }
        }
    }

    async fn complete(&self, token: &str, params: &RedirectParams) -> Result<User, RedirectError> {
        self.storage.set(ACCESS_TOKEN_KEY, token)?;

        let provisional = params.provisional_user()?;
        self.session.set_user_directly(provisional.clone());

        // Reconciliation failures keep the provisional user.
        match self.api.current_user().await {
            Ok(response) => match response.into_user() {
                Some(user) => {
                    info!(user_id = %user.id, "OAuth session reconciled");
                    self.session.set_user_directly(user.clone());
                    return Ok(user);
                }
                None => warn!("Current user unavailable after OAuth redirect"),
            },
            Err(e) => warn!(error = %e, "Failed to fetch user data after OAuth redirect"),
        }

        Ok(provisional)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use crate::error::ClientError;
    use crate::navigation::History;
    use crate::notify::BufferedNotifier;
    use crate::storage::MemoryStorage;
    use crate::testing::{FakeAuthApi, user};

    struct Harness {
        api: Arc<FakeAuthApi>,
        storage: Arc<MemoryStorage>,
        notifier: Arc<BufferedNotifier>,
        history: Arc<History>,
        session: SessionStore,
        handler: OAuthRedirectHandler,
    }

    fn harness() -> Harness {
        let api = Arc::new(FakeAuthApi::new());
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(BufferedNotifier::new());
        let history = Arc::new(History::new());
        let session = SessionStore::new(api.clone(), storage.clone());
        let handler = OAuthRedirectHandler::new(
            session.clone(),
            api.clone(),
            storage.clone(),
            notifier.clone(),
            history.clone(),
        );
        Harness {
            api,
            storage,
            notifier,
            history,
            session,
            handler,
        }
    }

    fn url(query: &str) -> Url {
        Url::parse(&format!("https://shop.example/auth/google-success?{query}")).unwrap()
    }

    #[test]
    fn test_params_decode_plus_as_space() {
        let params = RedirectParams::from_url(&url("access_token=abc&user_name=John+Doe"));
        let user = params.provisional_user().unwrap();
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "");
        assert!(user.is_provisional());
    }

    #[test]
    fn test_params_double_encoded_name() {
        let params = RedirectParams::from_url(&url("user_name=Jos%25C3%25A9%2BDoe"));
        assert_eq!(params.provisional_user().unwrap().name, "José Doe");
    }

    #[test]
    fn test_params_empty_token_is_missing() {
        let params = RedirectParams::from_url(&url("access_token=&user_id=u1"));
        assert_eq!(params.access_token, None);
        assert_eq!(params.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_params_stray_percent_kept_literally() {
        let params = RedirectParams::from_url(&url("user_name=100%25+Pure"));
        assert_eq!(params.provisional_user().unwrap().name, "100% Pure");
    }

    #[test]
    fn test_params_invalid_utf8_name() {
        let params = RedirectParams::from_url(&url("user_name=%25FF%25FE"));
        assert!(matches!(
            params.provisional_user(),
            Err(RedirectError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_success_reconciles_and_navigates_home() {
        let h = harness();
        h.api
            .push_current_user(Ok(ApiResponse::new(200, Some(user("u1")), None)));

        let outcome = h
            .handler
            .handle(&url("access_token=abc&user_id=u1&user_name=John+Doe&user_email=j%40x.io"))
            .await;

        assert_eq!(outcome, Some(RedirectOutcome::SignedIn(user("u1"))));
        assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(h.session.user(), Some(user("u1")));
        assert_eq!(h.history.entries(), vec!["/"]);
        assert_eq!(
            h.notifier.drain(),
            vec![Notification::success("Logged in with Google successfully")]
        );
        assert_eq!(h.handler.phase(), RedirectPhase::Done);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_provisional_user() {
        let h = harness();
        h.api.push_current_user(Err(ClientError::Api {
            status: 503,
            message: "down".into(),
        }));

        let outcome = h
            .handler
            .handle(&url("access_token=abc&user_id=u9&user_name=John+Doe&user_avatar=https%3A%2F%2Fcdn%2Fa.png"))
            .await
            .unwrap();

        let RedirectOutcome::SignedIn(seeded) = outcome else {
            panic!("expected sign-in, got {outcome:?}");
        };
        assert_eq!(seeded.name, "John Doe");
        assert_eq!(seeded.avatar, "https://cdn/a.png");
        assert_eq!(h.session.user(), Some(seeded));
        assert_eq!(h.history.current().as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn test_missing_token_never_touches_storage() {
        let h = harness();

        let outcome = h.handler.handle(&url("user_name=John+Doe")).await;

        assert_eq!(outcome, Some(RedirectOutcome::MissingToken));
        assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(h.session.user(), None);
        assert_eq!(h.history.entries(), vec!["/auth/login"]);
        assert_eq!(
            h.notifier.drain(),
            vec![Notification::error("No access token received from Google login")]
        );
        assert_eq!(h.api.calls().current_user, 0);
        assert!(!h.handler.is_processing());
    }

    #[tokio::test]
    async fn test_failure_after_token_navigates_to_login() {
        let h = harness();

        let outcome = h
            .handler
            .handle(&url("access_token=abc&user_name=%25FF"))
            .await
            .unwrap();

        let RedirectOutcome::Failed(message) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(message.starts_with("Invalid user name"));
        assert_eq!(h.history.entries(), vec!["/auth/login"]);
        assert!(h.notifier.drain()[0].is_error());
        assert_eq!(h.handler.phase(), RedirectPhase::Done);
    }

    #[tokio::test]
    async fn test_runs_once() {
        let h = harness();
        h.api
            .push_current_user(Ok(ApiResponse::new(200, Some(user("u1")), None)));
        let redirect = url("access_token=abc");

        let (first, second) = tokio::join!(h.handler.handle(&redirect), h.handler.handle(&redirect));
        let third = h.handler.handle(&redirect).await;

        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(third, None);
        assert_eq!(h.api.calls().current_user, 1);
        assert_eq!(h.history.entries().len(), 1);
        assert_eq!(h.notifier.drain().len(), 1);
    }
}
