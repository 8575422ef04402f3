//! Pocketshop CLI - cart, wishlist, and account state on local disk.
//!
//! # Usage
//!
//! ```bash
//! # Add two mugs to the cart
//! pocketshop cart add --id 1 --name "Mug" --price 12.50 -q 2
//!
//! # Add a product from a catalog JSON record
//! pocketshop cart add-json product.json
//!
//! # Show the cart with totals
//! pocketshop cart show
//!
//! # Sign in (any credentials are accepted)
//! pocketshop account login -e jane@shop.test -p secret
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and change the cart
//! - `wishlist` - Show and change the wishlist
//! - `account` - Mock sign-in, registration, and sign-out
//! - `offline` - Inspect the pending action queue

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::{AccountAction, CartAction, CommandError, WishlistAction};
use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "pocketshop")]
#[command(author, version, about = "Pocketshop cart and wishlist tools")]
struct Cli {
    /// Directory holding saved state (overrides `POCKETSHOP_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show and change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Mock account session
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Show queued offline actions
    Offline,
}

/// Initialize tracing on stderr so stdout stays clean for command output.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocketshop_cart=info,pocketshop_cli=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &CliConfig) -> Result<(), CommandError> {
    let state = commands::open_state(config).await?;

    match command {
        Commands::Cart { action } => commands::cart::run(&state, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&state, action).await?,
        Commands::Account { action } => commands::account::run(&state, action).await?,
        Commands::Offline => output::pending_actions(&state.offline().pending().await),
    }

    Ok(())
}
