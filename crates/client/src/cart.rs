//! Cart store: the user's in-progress cart.
//!
//! Every mutation is one remote call whose response replaces the local cart
//! wholesale. Failures emit a destructive notification and are returned to
//! the caller; `refresh_cart` is the exception and only notifies.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, watch};
use tracing::{debug, instrument, warn};

use shopfront_core::{Cart, CartItemInput, CartItemRemoval, ProductId};

use crate::api::CartApi;
use crate::error::{self, ClientError};
use crate::notify::{Notification, Notifier};

/// Snapshot of the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    pub cart: Option<Cart>,
    /// True until the first refresh has finished.
    pub is_loading: bool,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart: None,
            is_loading: true,
        }
    }
}

/// Client-side cart state.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: Arc<dyn CartApi>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<CartState>,
    startup: OnceCell<()>,
    /// Serializes cart calls so server responses apply in call order.
    ops: Mutex<()>,
}

impl CartStore {
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                notifier,
                state: watch::Sender::new(CartState::default()),
                startup: OnceCell::new(),
                ops: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.inner.state.borrow().cart.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Units across all lines, zero when no cart is loaded.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.inner
            .state
            .borrow()
            .cart
            .as_ref()
            .map_or(0, Cart::item_count)
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Load the cart once at startup. Later calls are no-ops.
    pub async fn initialize(&self) {
        self.inner.startup.get_or_init(|| self.refresh_cart()).await;
    }

    /// Re-fetch the cart. Failures keep the previous cart and only notify.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) {
        let _guard = self.inner.ops.lock().await;

        match self.inner.api.get_cart().await {
            Ok(cart) => {
                debug!(items = cart.items.len(), "Cart loaded");
                self.replace_cart(cart);
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch cart");
                self.notify(Notification::error("Failed to load cart"));
            }
        }

        self.inner.state.send_modify(|state| state.is_loading = false);
    }

    /// Add `quantity` units of a product (edition) to the cart.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        edition_name: Option<String>,
    ) -> Result<Cart, ClientError> {
        let input = CartItemInput {
            product_id,
            quantity,
            edition_name,
        };

        let _guard = self.inner.ops.lock().await;
        let result = self.inner.api.add_item(&input).await;
        self.apply(result, Some("Item added to cart"), "Failed to add item to cart")
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        edition_name: Option<String>,
    ) -> Result<Cart, ClientError> {
        let input = CartItemInput {
            product_id,
            quantity,
            edition_name,
        };

        let _guard = self.inner.ops.lock().await;
        let result = self.inner.api.update_item(&input).await;
        self.apply(result, None, "Failed to update cart item")
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self))]
    pub async fn remove_cart_item(
        &self,
        product_id: ProductId,
        edition_name: Option<String>,
    ) -> Result<Cart, ClientError> {
        let removal = CartItemRemoval {
            product_id,
            edition_name,
        };

        let _guard = self.inner.ops.lock().await;
        let result = self.inner.api.remove_item(&removal).await;
        self.apply(result, Some("Item removed from cart"), "Failed to remove item from cart")
    }

    /// Empty the cart.
    ///
    /// On success the local cart is emptied without re-fetching: items are
    /// cleared and the total zeroed, every other field is kept.
    ///
    /// # Errors
    ///
    /// Returns the API error after notifying the user.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart, ClientError> {
        let _guard = self.inner.ops.lock().await;

        if let Err(e) = self.inner.api.clear_cart().await {
            return Err(self.fail(e, "Failed to clear cart"));
        }

        let mut cart = self.cart().unwrap_or_default();
        cart.clear_items();
        self.replace_cart(cart.clone());

        self.notify(Notification::success("Cart cleared"));
        Ok(cart)
    }

    fn apply(
        &self,
        result: Result<Cart, ClientError>,
        success: Option<&str>,
        failure: &str,
    ) -> Result<Cart, ClientError> {
        match result {
            Ok(cart) => {
                self.replace_cart(cart.clone());
                if let Some(message) = success {
                    self.notify(Notification::success(message));
                }
                Ok(cart)
            }
            Err(e) => Err(self.fail(e, failure)),
        }
    }

    fn fail(&self, error: ClientError, message: &str) -> ClientError {
        warn!(error = %error, "{message}");
        error::add_failure_breadcrumb("cart", message, &error);
        self.notify(Notification::error(message));
        error
    }

    fn replace_cart(&self, cart: Cart) {
        self.inner.state.send_modify(|state| state.cart = Some(cart));
    }

    fn notify(&self, notification: Notification) {
        self.inner.notifier.notify(notification);
    }
}
