//! Scripted API fakes shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use shopfront_core::{
    Cart, CartItem, CartItemInput, CartItemRemoval, LoginCredentials, Price, ProductId,
    RegisterCredentials, User, UserId,
};

use crate::api::{AccessToken, ApiResponse, AuthApi, AuthPayload, CartApi};
use crate::error::ClientError;

type Scripted<T> = Mutex<VecDeque<Result<T, ClientError>>>;

fn next<T>(queue: &Scripted<T>, what: &str) -> Result<T, ClientError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| {
            Err(ClientError::Api {
                status: 599,
                message: format!("no scripted {what} response"),
            })
        })
}

pub fn user(id: &str) -> User {
    User {
        id: UserId::new(id),
        email: format!("{id}@example.com"),
        name: format!("User {id}"),
        avatar: String::new(),
    }
}

pub fn auth_response(status: u16, token: Option<&str>, user: Option<User>) -> ApiResponse<AuthPayload> {
    ApiResponse::new(
        status,
        Some(AuthPayload {
            access_token: token.map(AccessToken::new),
            user,
        }),
        None,
    )
}

pub fn cart(lines: &[(&str, u32)], total_cents: i64) -> Cart {
    Cart {
        items: lines
            .iter()
            .map(|(product, quantity)| CartItem {
                product_id: ProductId::new(*product),
                quantity: *quantity,
                edition_name: None,
                details: serde_json::Map::new(),
            })
            .collect(),
        total_price: Price::from_cents(total_cents),
        ..Cart::default()
    }
}

// =============================================================================
// FakeAuthApi
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct AuthCalls {
    pub login_emails: Vec<String>,
    pub login_passwords: Vec<String>,
    pub register: usize,
    pub social_codes: Vec<String>,
    pub current_user: usize,
    pub logout: usize,
}

#[derive(Default)]
pub struct FakeAuthApi {
    login: Scripted<ApiResponse<AuthPayload>>,
    register: Scripted<ApiResponse<AuthPayload>>,
    social_login: Scripted<ApiResponse<AuthPayload>>,
    current_user: Scripted<ApiResponse<User>>,
    calls: Mutex<AuthCalls>,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: Result<ApiResponse<AuthPayload>, ClientError>) {
        self.login.lock().unwrap().push_back(result);
    }

    pub fn push_register(&self, result: Result<ApiResponse<AuthPayload>, ClientError>) {
        self.register.lock().unwrap().push_back(result);
    }

    pub fn push_social_login(&self, result: Result<ApiResponse<AuthPayload>, ClientError>) {
        self.social_login.lock().unwrap().push_back(result);
    }

    pub fn push_current_user(&self, result: Result<ApiResponse<User>, ClientError>) {
        self.current_user.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> AuthCalls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<ApiResponse<AuthPayload>, ClientError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.login_emails.push(credentials.email.to_string());
            calls.login_passwords.push(credentials.password.clone());
        }
        next(&self.login, "login")
    }

    async fn register(&self, _credentials: &RegisterCredentials) -> Result<ApiResponse<AuthPayload>, ClientError> {
        self.calls.lock().unwrap().register += 1;
        next(&self.register, "register")
    }

    async fn social_login(&self, code: &str) -> Result<ApiResponse<AuthPayload>, ClientError> {
        self.calls.lock().unwrap().social_codes.push(code.to_string());
        next(&self.social_login, "social login")
    }

    async fn current_user(&self) -> Result<ApiResponse<User>, ClientError> {
        self.calls.lock().unwrap().current_user += 1;
        // Yield so concurrent callers interleave like a real request would.
        tokio::task::yield_now().await;
        next(&self.current_user, "current user")
    }

    fn logout(&self) {
        self.calls.lock().unwrap().logout += 1;
    }
}

// =============================================================================
// FakeCartApi
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct CartCalls {
    pub get: usize,
    pub added: Vec<CartItemInput>,
    pub updated: Vec<CartItemInput>,
    pub removed: Vec<CartItemRemoval>,
    pub cleared: usize,
}

#[derive(Default)]
pub struct FakeCartApi {
    get: Scripted<Cart>,
    add: Scripted<Cart>,
    update: Scripted<Cart>,
    remove: Scripted<Cart>,
    clear: Scripted<()>,
    calls: Mutex<CartCalls>,
}

impl FakeCartApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_get(&self, result: Result<Cart, ClientError>) {
        self.get.lock().unwrap().push_back(result);
    }

    pub fn push_add(&self, result: Result<Cart, ClientError>) {
        self.add.lock().unwrap().push_back(result);
    }

    pub fn push_update(&self, result: Result<Cart, ClientError>) {
        self.update.lock().unwrap().push_back(result);
    }

    pub fn push_remove(&self, result: Result<Cart, ClientError>) {
        self.remove.lock().unwrap().push_back(result);
    }

    pub fn push_clear(&self, result: Result<(), ClientError>) {
        self.clear.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> CartCalls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartApi for FakeCartApi {
    async fn get_cart(&self) -> Result<Cart, ClientError> {
        self.calls.lock().unwrap().get += 1;
        tokio::task::yield_now().await;
        next(&self.get, "get cart")
    }

    async fn add_item(&self, input: &CartItemInput) -> Result<Cart, ClientError> {
        self.calls.lock().unwrap().added.push(input.clone());
        tokio::task::yield_now().await;
        next(&self.add, "add item")
    }

    async fn update_item(&self, input: &CartItemInput) -> Result<Cart, ClientError> {
        self.calls.lock().unwrap().updated.push(input.clone());
        next(&self.update, "update item")
    }

    async fn remove_item(&self, removal: &CartItemRemoval) -> Result<Cart, ClientError> {
        self.calls.lock().unwrap().removed.push(removal.clone());
        next(&self.remove, "remove item")
    }

    async fn clear_cart(&self) -> Result<(), ClientError> {
        self.calls.lock().unwrap().cleared += 1;
        next(&self.clear, "clear cart")
    }
}
