//! Kkomi CLI - Terminal front end for the storefront and admin console.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in KKOMI_STATE_PATH)
//! kkomi login -e siti@kkomi.id
//!
//! # Browse and shop
//! kkomi products --search melon
//! kkomi shop
//!
//! # Admin console
//! kkomi admin stats
//! kkomi admin create --name "Melon Juice" --price 20000 --stock 10
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - Session management
//! - `products` - List the catalog
//! - `shop` - Interactive cart and checkout
//! - `admin` - Products, order report and dashboard statistics

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kkomi_core::{OrderId, ProductId};
use kkomi_storefront::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::admin::ProductFields;

#[derive(Parser)]
#[command(name = "kkomi")]
#[command(author, version, about = "Kkomi storefront and admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session
    Login {
        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create a customer account
    Register {
        /// Display name (prompted if omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// End the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List products
    Products {
        /// Search by name
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Interactive shopping session
    Shop,
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List products
    Products,
    /// Show the order report
    Orders {
        /// Show one order in detail
        #[arg(short, long)]
        detail: Option<i64>,
    },
    /// Show dashboard statistics
    Stats,
    /// Create a product
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update a product
    Update {
        /// Product id
        id: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    price: Option<String>,

    #[arg(long)]
    stock: Option<String>,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

impl From<FieldArgs> for ProductFields {
    fn from(args: FieldArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
            image: args.image,
        }
    }
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

/// Errors and warnings become Sentry events; info and debug become
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kkomi=info,kkomi_storefront=info,kkomi_admin=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { email } => commands::auth::login(config, email).await?,
        Commands::Register { name, email } => {
            commands::auth::register(config, name, email).await?;
        }
        Commands::Logout => commands::auth::logout(config).await?,
        Commands::Whoami => commands::auth::whoami(config)?,
        Commands::Products {
            search,
            page,
            category,
        } => commands::catalog::products(config, search, page, category).await?,
        Commands::Shop => commands::shop::run(config).await?,
        Commands::Admin { action } => match action {
            AdminAction::Products => commands::admin::products(config).await?,
            AdminAction::Orders { detail } => {
                commands::admin::orders(config, detail.map(OrderId::new)).await?;
            }
            AdminAction::Stats => commands::admin::stats(config).await?,
            AdminAction::Create { fields } => {
                commands::admin::create(config, fields.into()).await?;
            }
            AdminAction::Update { id, fields } => {
                commands::admin::update(config, ProductId::new(id), fields.into()).await?;
            }
            AdminAction::Delete { id, yes } => {
                commands::admin::delete(config, ProductId::new(id), yes).await?;
            }
        },
    }
    Ok(())
}
