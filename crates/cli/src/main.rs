//! Storehouse CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sh-cli migrate
//!
//! # Create an admin account
//! sh-cli user create -e admin@example.com -p 'Adm1n!pass' -r admin
//!
//! # Promote or demote an existing account
//! sh-cli user set-role -e shopper@example.com -r admin
//!
//! # Replace a forgotten password
//! sh-cli user reset-password -e shopper@example.com -p 'N3w!password'
//!
//! # Load demo categories and products
//! sh-cli seed catalog
//! ```
//!
//! All commands read `DATABASE_URL` from the environment (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sh-cli")]
#[command(author, version, about = "Storehouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database with demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (must satisfy the password policy)
        #[arg(short, long)]
        password: String,

        /// Given name
        #[arg(long)]
        first_name: Option<String>,

        /// Family name
        #[arg(long)]
        last_name: Option<String>,

        /// Role (`admin` or `customer`)
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
    /// Change the role of an existing user
    SetRole {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin` or `customer`)
        #[arg(short, long)]
        role: String,
    },
    /// Replace the password of an existing user
    ResetPassword {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New password (must satisfy the password policy)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert demo categories and products (skips what already exists)
    Catalog,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                first_name,
                last_name,
                role,
            } => {
                let account = commands::user::NewAccount {
                    email: &email,
                    password: &password,
                    first_name: first_name.as_deref(),
                    last_name: last_name.as_deref(),
                    role: &role,
                };
                commands::user::create(&account).await?;
            }
            UserAction::SetRole { email, role } => {
                commands::user::set_role(&email, &role).await?;
            }
            UserAction::ResetPassword { email, password } => {
                commands::user::reset_password(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog => commands::seed::catalog().await?,
        },
    }
    Ok(())
}
