use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tekstitv_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tekstitv")]
#[command(author, version, about = "A terminal teletext (Teksti-TV) reader")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Fetch one page and print it to stdout
    Page {
        /// 3-digit page number (100-999)
        number: String,
        /// Subpage to fetch
        #[arg(short, long, default_value_t = 1)]
        subpage: u16,
    },
    /// Manage favorite pages
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Print the configuration file path
    ConfigPath,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite pages
    List,
    /// Add a page to favorites
    Add { number: String },
    /// Remove a page from favorites
    Remove { number: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Page { number, subpage }) => {
            commands::page::run(&config, &number, subpage).await
        }
        Some(Commands::Favorites { action }) => match action {
            FavoritesAction::List => commands::favorites::list(&config),
            FavoritesAction::Add { number } => commands::favorites::add(&config, &number),
            FavoritesAction::Remove { number } => commands::favorites::remove(&config, &number),
        },
        Some(Commands::ConfigPath) => {
            println!("{}", AppConfig::config_path().display());
            Ok(())
        }
    }
}
