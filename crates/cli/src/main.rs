//! Aiaxcart CLI - database and shop management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! ax-cli migrate
//!
//! # Create a back-office admin (password from AIAXCART_ADMIN_PASSWORD if -p is omitted)
//! ax-cli admin create -e admin@example.com -n "Admin Name" -p 'long passphrase'
//!
//! # Seed products and stock from YAML
//! ax-cli seed catalog crates/cli/seed/catalog.yaml
//!
//! # Export every collection as JSON
//! ax-cli export ./backup
//! ```
//!
//! Every command reads `AIAXCART_DATABASE_URL` (or `--database-url`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "ax-cli")]
#[command(author, version, about = "Aiaxcart CLI tools")]
struct Cli {
    /// `SQLite` database URL
    #[arg(
        long,
        global = true,
        env = "AIAXCART_DATABASE_URL",
        default_value = "sqlite:aiaxcart.db?mode=rwc",
        hide_env_values = true
    )]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Write every collection to `<dir>/<collection>.json`
    Export {
        /// Output directory, created if missing
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (min 8 characters)
        #[arg(short, long, env = "AIAXCART_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed products and optional stock from a YAML file
    Catalog {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = SecretString::from(cli.database_url);

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&database_url, &email, &name, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&database_url, &file).await?,
        },
        Commands::Export { dir } => commands::export::run(&database_url, &dir).await?,
    }
    Ok(())
}
