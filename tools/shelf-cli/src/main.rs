//! Shelf CLI - Browse the bookshelf catalog from the terminal.
//!
//! Commands:
//! - `shelf browse` - List books for a filter, sort and page selection
//! - `shelf categories` - Show the category tree
//! - `shelf price-range` - Show the price slider bounds and histogram
//! - `shelf config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BrowseArgs, CategoriesArgs, ConfigArgs, PriceRangeArgs};

/// Shelf CLI - Browse the bookshelf catalog
#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books
    Browse(BrowseArgs),

    /// Show the category tree
    Categories(CategoriesArgs),

    /// Show price slider bounds
    PriceRange(PriceRangeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    logging::init(&ctx.config.log, cli.verbose);
    tracing::debug!(config = ?ctx.config_path, base_url = %ctx.config.api.base_url, "configuration loaded");

    // Execute command
    let result = match cli.command {
        Commands::Browse(args) => commands::browse::run(args, &ctx).await,
        Commands::Categories(args) => commands::categories::run(args, &ctx).await,
        Commands::PriceRange(args) => commands::price_range::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
