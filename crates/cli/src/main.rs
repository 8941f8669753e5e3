//! QKart CLI - Shop from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search the catalog
//! qkart products
//! qkart products --search shoes
//!
//! # Search as you type (one query per line)
//! qkart browse
//!
//! # Account
//! qkart register -u crio.do -p learnbydoing -c learnbydoing
//! qkart login -u crio.do -p learnbydoing
//!
//! # Cart
//! qkart cart add BW0jAAeDJmlZCF8i --qty 2
//! qkart cart set BW0jAAeDJmlZCF8i 3
//! qkart cart show
//!
//! # Addresses and checkout
//! qkart address add "No 12, 4th Cross, Indiranagar, Bengaluru"
//! qkart address list
//! qkart checkout --address rtmY2ppCpdcDSRFz
//! ```
//!
//! # Environment Variables
//!
//! See `qkart_client::config` for the full list. `RUST_LOG` controls log
//! output, which goes to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use qkart_client::{ApiClient, ClientConfig, FileSessionStore, Storefront};
use qkart_core::Quantity;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use error::CliError;

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search the catalog
    Products {
        /// Only show products whose name or category matches
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Search as you type: each stdin line is a new query
    Browse,
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage shipping addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place the order for the current cart
    Checkout {
        /// Address to ship to
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user and wallet balance
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with totals
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: String,

        /// How many to add
        #[arg(short, long, default_value = "1", value_parser = parse_quantity)]
        qty: Quantity,

        /// Refuse if the product is already in the cart
        #[arg(long)]
        no_duplicates: bool,
    },
    /// Set a product's quantity (0 or less removes it)
    Set {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        product_id: String,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        /// Full address text
        address: String,
    },
    /// Delete a saved address
    Delete {
        /// Address ID
        address_id: String,
    },
}

fn parse_quantity(s: &str) -> Result<Quantity, String> {
    s.parse::<u32>()
        .ok()
        .and_then(Quantity::new)
        .ok_or_else(|| format!("'{s}' is not a quantity of at least 1"))
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::failure(&CliError::from(e));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_cli=info,qkart_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::debug!(error = ?e, "Command failed");
        output::failure(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CliError> {
    let api = ApiClient::new(config)?;
    let store = FileSessionStore::new(&config.session_file);
    let mut storefront = Storefront::new(api, store)?;

    match cli.command {
        Commands::Products { search } => {
            commands::catalog::list(&storefront, search.as_deref()).await?;
        }
        Commands::Browse => commands::catalog::browse(&storefront, config).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add {
                product_id,
                qty,
                no_duplicates,
            } => commands::cart::add(&storefront, &product_id, qty, no_duplicates).await?,
            CartAction::Set { product_id, qty } => {
                commands::cart::set(&storefront, &product_id, qty).await?;
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&storefront, &product_id).await?;
            }
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&mut storefront).await?,
            AddressAction::Add { address } => {
                commands::address::add(&mut storefront, &address).await?;
            }
            AddressAction::Delete { address_id } => {
                commands::address::delete(&mut storefront, &address_id).await?;
            }
        },
        Commands::Checkout { address } => {
            commands::checkout::run(&mut storefront, address.as_deref()).await?;
        }
        Commands::Register {
            username,
            password,
            confirm,
        } => commands::account::register(&storefront, &username, &password, &confirm).await?,
        Commands::Login { username, password } => {
            commands::account::login(&mut storefront, &username, &password).await?;
        }
        Commands::Logout => commands::account::logout(&mut storefront)?,
        Commands::Whoami => commands::account::whoami(&storefront),
    }
    Ok(())
}
