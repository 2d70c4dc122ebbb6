//! Rangaayan AI CLI — the main entry point.
//!
//! Commands:
//! - `serve`        — Start the HTTP API server
//! - `price`        — Suggest a price for a product
//! - `demand`       — Analyze demand for a product
//! - `describe`     — Write a one-line product description
//! - `detect`       — Detect products in a photo
//! - `competitors`  — Show competitor listings and prices
//! - `categories`   — List detection categories
//! - `config`       — Show, locate, validate, or create the config file
//! - `doctor`       — Diagnose setup

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "rangaayan",
    about = "Rangaayan AI — market intelligence for rural Indian sellers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Suggest an optimal selling price
    Price {
        /// Product name
        product: String,

        /// Production cost per unit in INR
        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        quality: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Print progress while the analysis runs
        #[arg(short, long)]
        stream: bool,
    },

    /// Analyze market demand
    Demand {
        /// Product name
        product: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Print progress while the analysis runs
        #[arg(short, long)]
        stream: bool,
    },

    /// Write a one-line product description
    Describe {
        /// Product name
        product: String,

        #[arg(long)]
        category: Option<String>,
    },

    /// Detect and categorize products in an image
    Detect {
        /// Path to a JPEG or PNG photo
        image: PathBuf,
    },

    /// Show competitor listings and prices
    Competitors {
        /// Product name
        product: String,
    },

    /// List product detection categories
    Categories,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Price {
            product,
            cost,
            category,
            quality,
            location,
            stream,
        } => {
            let request = rangaayan_services::PricingRequest {
                product_name: product,
                cost_price: cost,
                category,
                quality,
                location,
            };
            commands::analyze::price(request, stream).await?
        }
        Commands::Demand {
            product,
            category,
            location,
            stream,
        } => {
            let request = rangaayan_services::DemandRequest {
                product_name: product,
                category,
                location,
            };
            commands::analyze::demand(request, stream).await?
        }
        Commands::Describe { product, category } => {
            commands::analyze::describe(rangaayan_services::DescribeRequest {
                product_name: product,
                category,
            })
            .await?
        }
        Commands::Detect { image } => commands::analyze::detect(&image).await?,
        Commands::Competitors { product } => commands::analyze::competitors(product).await?,
        Commands::Categories => commands::analyze::categories(),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Init => commands::config_cmd::init().await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
