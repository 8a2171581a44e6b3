//! Application context shared by UI code.
//!
//! Owns the session and cart stores together with the collaborators they
//! talk to. Construct one at the top of the application and pass it (or its
//! stores) down explicitly.

use std::sync::Arc;

use crate::api::{AuthApi, CartApi, HttpApiClient};
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::oauth::OAuthRedirectHandler;
use crate::session::SessionStore;
use crate::storage::{FileStorage, TokenStorage};

/// Session store, cart store, and their collaborators.
///
/// Cheap to clone via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    session: SessionStore,
    cart: CartStore,
    auth_api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl Storefront {
    /// Assemble a context from explicit collaborators.
    #[must_use]
    pub fn new(
        auth_api: Arc<dyn AuthApi>,
        cart_api: Arc<dyn CartApi>,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = SessionStore::new(auth_api.clone(), storage.clone());
        let cart = CartStore::new(cart_api, notifier.clone());

        Self {
            inner: Arc::new(StorefrontInner {
                session,
                cart,
                auth_api,
                storage,
                notifier,
                navigator,
            }),
        }
    }

    /// Assemble a context talking HTTP to the configured API, with the token
    /// persisted to the configured storage file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(FileStorage::new(&config.storage_path));
        let client = Arc::new(HttpApiClient::new(config, storage.clone())?);

        Ok(Self::new(client.clone(), client, storage, notifier, navigator))
    }

    /// Run both startup checks (session validation and first cart load).
    pub async fn initialize(&self) {
        tokio::join!(self.inner.session.initialize(), self.inner.cart.initialize());
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// A fresh handler for one OAuth success redirect.
    #[must_use]
    pub fn redirect_handler(&self) -> OAuthRedirectHandler {
        OAuthRedirectHandler::new(
            self.inner.session.clone(),
            self.inner.auth_api.clone(),
            self.inner.storage.clone(),
            self.inner.notifier.clone(),
            self.inner.navigator.clone(),
        )
    }
}
