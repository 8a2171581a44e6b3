//! Shopfront CLI - Drive a storefront account from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is kept in SHOPFRONT_STORAGE_PATH between runs)
//! shopfront auth login -e jane@example.com -p hunter2
//!
//! # Add two signed copies of a product, then look at the cart
//! shopfront cart add 64f1c0 -q 2 --edition Signed
//! shopfront cart show
//!
//! # Finish a Google sign-in from the success redirect URL
//! shopfront oauth complete 'https://shop.example.com/auth/google-success?access_token=...'
//! ```
//!
//! # Commands
//!
//! - `auth` - Sign in, register, sign out, show the current user
//! - `cart` - Show and change the cart
//! - `oauth complete` - Process an OAuth success redirect

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_client::config::ClientConfig;
use shopfront_client::navigation::History;
use shopfront_client::notify::TracingNotifier;
use shopfront_client::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Complete OAuth sign-in flows
    Oauth {
        #[command(subcommand)]
        action: OauthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign in with a Google authorization code
    Google {
        /// Authorization code returned by Google
        code: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add units of a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Edition name (e.g. "Signed")
        #[arg(long)]
        edition: Option<String>,
    },
    /// Set the quantity of a line
    Update {
        product_id: String,

        #[arg(short, long)]
        quantity: u32,

        #[arg(long)]
        edition: Option<String>,
    },
    /// Remove a line
    Remove {
        product_id: String,

        #[arg(long)]
        edition: Option<String>,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum OauthAction {
    /// Process the success redirect URL the browser landed on
    Complete {
        /// Full redirect URL, including its query string
        url: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration first (needed for Sentry init)
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_client=info,shopfront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CommandError> {
    let history = Arc::new(History::new());
    let storefront = Storefront::from_config(config, Arc::new(TracingNotifier), history.clone())?;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&storefront, &email, password).await?;
            }
            AuthAction::Register {
                name,
                email,
                password,
            } => commands::auth::register(&storefront, name, &email, password).await?,
            AuthAction::Google { code } => commands::auth::google(&storefront, &code).await?,
            AuthAction::Logout => commands::auth::logout(&storefront),
            AuthAction::Whoami => commands::auth::whoami(&storefront).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add {
                product_id,
                quantity,
                edition,
            } => commands::cart::add(&storefront, product_id, quantity, edition).await?,
            CartAction::Update {
                product_id,
                quantity,
                edition,
            } => commands::cart::update(&storefront, product_id, quantity, edition).await?,
            CartAction::Remove {
                product_id,
                edition,
            } => commands::cart::remove(&storefront, product_id, edition).await?,
            CartAction::Clear => commands::cart::clear(&storefront).await?,
        },
        Commands::Oauth { action } => match action {
            OauthAction::Complete { url } => {
                commands::oauth::complete(&storefront, &history, &url).await?;
            }
        },
    }
    Ok(())
}
