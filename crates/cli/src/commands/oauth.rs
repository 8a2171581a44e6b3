//! OAuth redirect commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront oauth complete 'https://shop.example.com/auth/google-success?access_token=...&user_id=...'
//! ```

use shopfront_client::Storefront;
use shopfront_client::navigation::History;
use shopfront_client::oauth::RedirectOutcome;
use url::Url;

use super::CommandError;

/// Process an OAuth success redirect URL.
///
/// Stores the token it carries and confirms the user with the API.
pub async fn complete(storefront: &Storefront, history: &History, url: &str) -> Result<(), CommandError> {
    let url = Url::parse(url)?;
    let outcome = storefront.redirect_handler().handle(&url).await;

    if let Some(path) = history.current() {
        tracing::debug!("Redirected to {path}");
    }

    match outcome {
        Some(RedirectOutcome::SignedIn(user)) => {
            tracing::info!("Signed in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Some(RedirectOutcome::MissingToken) => Err(CommandError::Redirect(
            "Redirect URL carries no access token".to_owned(),
        )),
        Some(RedirectOutcome::Failed(message)) => Err(CommandError::Redirect(message)),
        None => Ok(()),
    }
}
