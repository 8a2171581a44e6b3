//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront auth login -e jane@example.com -p hunter2
//! shopfront auth register -n "Jane Doe" -e jane@example.com -p hunter2
//! shopfront auth google 4/0AX4XfWh...
//! shopfront auth whoami
//! shopfront auth logout
//! ```

use shopfront_client::Storefront;
use shopfront_core::{Email, LoginCredentials, RegisterCredentials, User};

use super::CommandError;

fn log_user(user: &User) {
    tracing::info!("Signed in as {} <{}>", user.name, user.email);
    tracing::info!("  ID: {}", user.id);
}

/// Sign in with email and password.
pub async fn login(storefront: &Storefront, email: &str, password: String) -> Result<(), CommandError> {
    let credentials = LoginCredentials::new(Email::parse(email)?, password);
    let user = storefront.session().login(&credentials).await?;
    log_user(&user);
    Ok(())
}

/// Create an account, then sign in with it.
pub async fn register(
    storefront: &Storefront,
    name: String,
    email: &str,
    password: String,
) -> Result<(), CommandError> {
    let credentials = RegisterCredentials::new(name, Email::parse(email)?, password);
    let user = storefront.session().register(&credentials).await?;
    log_user(&user);
    Ok(())
}

/// Exchange a Google authorization code for a session.
pub async fn google(storefront: &Storefront, code: &str) -> Result<(), CommandError> {
    let user = storefront.session().social_login(code).await?;
    log_user(&user);
    Ok(())
}

/// Sign out. Always succeeds, even when nobody was signed in.
pub fn logout(storefront: &Storefront) {
    storefront.session().logout();
    tracing::info!("Signed out");
}

/// Validate the stored token and show who it belongs to.
pub async fn whoami(storefront: &Storefront) {
    storefront.session().initialize().await;

    match storefront.session().user() {
        Some(user) => log_user(&user),
        None => tracing::info!("Not signed in"),
    }
}
