//! Satchel CLI - Offline catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate the bundled catalog
//! satchel-cli catalog check
//!
//! # Validate a catalog file
//! satchel-cli catalog check data/catalog.json
//!
//! # List totes and clutches under $300
//! satchel-cli catalog list --categories tote,clutch --max 300
//! ```
//!
//! # Commands
//!
//! - `catalog check` - Load a catalog and report its facets
//! - `catalog list` - Print the products that pass a filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use satchel_core::{Brand, Category};

mod commands;

#[derive(Parser)]
#[command(name = "satchel-cli")]
#[command(author, version, about = "Satchel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect product catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Load a catalog and report what it contains
    Check {
        /// Catalog JSON file (defaults to the bundled catalog)
        path: Option<PathBuf>,
    },
    /// List products passing a filter
    List {
        /// Catalog JSON file (defaults to the bundled catalog)
        path: Option<PathBuf>,

        /// Comma-separated categories (e.g. `tote,clutch`)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<Category>,

        /// Comma-separated brands (e.g. `ChicVogue,Elegante`)
        #[arg(long, value_delimiter = ',')]
        brands: Vec<Brand>,

        /// Minimum price, inclusive
        #[arg(long)]
        min: Option<Decimal>,

        /// Maximum price, inclusive (defaults to the catalog maximum)
        #[arg(long)]
        max: Option<Decimal>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::catalog::CatalogCommandError> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Check { path } => {
                let report = commands::catalog::check(path.as_deref())?;
                commands::catalog::print_report(&report);
            }
            CatalogAction::List {
                path,
                categories,
                brands,
                min,
                max,
            } => {
                let filter = commands::catalog::ListFilter {
                    categories,
                    brands,
                    min,
                    max,
                };
                let lines = commands::catalog::list(path.as_deref(), &filter)?;
                commands::catalog::print_lines(&lines);
            }
        },
    }
    Ok(())
}
