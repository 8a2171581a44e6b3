//! Session store: who is signed in.
//!
//! Holds the current [`User`] and a loading flag behind a `watch` channel so
//! UI code can subscribe to changes. The startup check is failure-silent; all
//! user-initiated operations return their errors.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, watch};
use tracing::{debug, info, instrument, warn};

use shopfront_core::{LoginCredentials, RegisterCredentials, User};

use crate::api::{ApiResponse, AuthApi, AuthPayload};
use crate::error::{self, ClientError};
use crate::storage::{self, TokenStorage};

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True until the startup check has finished.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Which endpoint a sign-in went through; selects the error texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignIn {
    Password,
    Google,
}

impl SignIn {
    const fn rejected_message(self) -> &'static str {
        match self {
            Self::Password => "Login failed",
            Self::Google => "Google login failed",
        }
    }

    const fn user_fetch_message(self) -> &'static str {
        match self {
            Self::Password => "Failed to get user data after login",
            Self::Google => "Failed to get user data after Google login",
        }
    }
}

/// Client-side session state.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionState>,
    startup: OnceCell<()>,
    /// Serializes sign-in operations so responses apply in call order.
    ops: Mutex<()>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                storage,
                state: watch::Sender::new(SessionState::default()),
                startup: OnceCell::new(),
                ops: Mutex::new(()),
            }),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().user.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Validate the persisted token, once.
    ///
    /// Later calls wait for the first one and then return immediately. Never
    /// fails: a missing or rejected token just leaves the session signed out.
    pub async fn initialize(&self) {
        self.inner
            .startup
            .get_or_init(|| self.check_persisted_session())
            .await;
    }

    async fn check_persisted_session(&self) {
        let _guard = self.inner.ops.lock().await;

        if storage::read_access_token(self.inner.storage.as_ref()).is_none() {
            debug!("No persisted access token");
            self.set_loading(false);
            return;
        }

        match self.inner.api.current_user().await {
            Ok(response) => match response.into_user() {
                Some(user) => {
                    info!(user_id = %user.id, "Restored session");
                    error::set_sentry_user(&user.id, Some(user.email.as_str()));
                    self.replace_user(Some(user));
                }
                None => {
                    debug!("Persisted access token rejected, discarding");
                    storage::discard_access_token(self.inner.storage.as_ref());
                }
            },
            Err(e) => {
                debug!(error = %e, "Session check failed, discarding access token");
                storage::discard_access_token(self.inner.storage.as_ref());
            }
        }

        self.set_loading(false);
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Fails if the response is not 200/201 with a token, if the follow-up
    /// user fetch fails, or on transport errors. State is unchanged on error.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ClientError> {
        let _guard = self.inner.ops.lock().await;
        let response = self.inner.api.login(credentials).await?;
        let user = self.resolve_sign_in(response, SignIn::Password).await?;
        Ok(self.sign_in(user))
    }

    /// Sign in with a social-provider (Google) authorization code.
    ///
    /// # Errors
    ///
    /// Same contract as [`login`](Self::login).
    #[instrument(skip_all)]
    pub async fn social_login(&self, code: &str) -> Result<User, ClientError> {
        let _guard = self.inner.ops.lock().await;
        let response = self.inner.api.social_login(code).await?;
        let user = self.resolve_sign_in(response, SignIn::Google).await?;
        Ok(self.sign_in(user))
    }

    /// Create an account and sign in.
    ///
    /// When the registration response does not carry both a token and a user,
    /// an automatic login with the same email and password is attempted.
    ///
    /// # Errors
    ///
    /// - the server message (or "Registration failed") if registration is rejected
    /// - [`ClientError::AutoLoginFailed`] if the automatic login fails in any way
    /// - transport errors from the registration call itself
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<User, ClientError> {
        let _guard = self.inner.ops.lock().await;
        let response = self.inner.api.register(credentials).await?;

        if !response.is_success() {
            return Err(ClientError::Auth(response.message_or("Registration failed")));
        }

        if let Some(AuthPayload {
            access_token: Some(_),
            user: Some(user),
        }) = response.data
        {
            info!("Registration returned a session");
            return Ok(self.sign_in(user));
        }

        debug!("Registration returned no session, logging in");
        let auto_login = async {
            let response = self.inner.api.login(&credentials.to_login()).await?;
            self.resolve_sign_in(response, SignIn::Password).await
        };

        match auto_login.await {
            Ok(user) => Ok(self.sign_in(user)),
            Err(e) => {
                warn!(error = %e, "Auto-login after registration failed");
                Err(ClientError::AutoLoginFailed)
            }
        }
    }

    /// Sign out locally.
    pub fn logout(&self) {
        self.inner.api.logout();
        self.replace_user(None);
        error::clear_sentry_user();
        info!("Signed out");
    }

    /// Overwrite the user without any validation.
    pub fn set_user_directly(&self, user: User) {
        debug!(user_id = %user.id, provisional = user.is_provisional(), "User set directly");
        self.replace_user(Some(user));
    }

    /// Turn a sign-in response into a user, fetching it when not embedded.
    async fn resolve_sign_in(
        &self,
        response: ApiResponse<AuthPayload>,
        kind: SignIn,
    ) -> Result<User, ClientError> {
        let accepted = response.is_success()
            && response
                .data
                .as_ref()
                .is_some_and(|d| d.access_token.is_some());

        if !accepted {
            return Err(ClientError::Auth(response.message_or(kind.rejected_message())));
        }

        if let Some(user) = response.data.and_then(|d| d.user) {
            return Ok(user);
        }

        self.inner
            .api
            .current_user()
            .await?
            .into_user()
            .ok_or_else(|| ClientError::Auth(kind.user_fetch_message().to_string()))
    }

    fn sign_in(&self, user: User) -> User {
        info!(user_id = %user.id, "Signed in");
        error::set_sentry_user(&user.id, Some(user.email.as_str()));
        self.replace_user(Some(user.clone()));
        user
    }

    fn replace_user(&self, user: Option<User>) {
        self.inner.state.send_modify(|state| state.user = user);
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_modify(|state| state.loading = loading);
    }
}
