//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! satchel-cli catalog check path/to/catalog.json
//! satchel-cli catalog list --brands luxecarry --min 100
//! ```
//!
//! Without a path both commands use the catalog bundled with the storefront.

use std::collections::BTreeSet;
use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;

use satchel_core::{Brand, Category};
use satchel_storefront::catalog::{
    Catalog, CatalogError, Facets, FilterCriteria, PriceRange, filter,
};

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    /// The catalog could not be loaded.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// The price bounds are inverted.
    #[error("Invalid price range: min {min} is greater than max {max}")]
    InvertedRange { min: Decimal, max: Decimal },
}

/// Summary of a loaded catalog.
#[derive(Debug)]
pub struct CatalogReport {
    pub products: usize,
    pub facets: Facets,
}

/// Filter options for `catalog list`.
#[derive(Debug, Default)]
pub struct ListFilter {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl ListFilter {
    /// Criteria for `catalog`, defaulting the price range to the full catalog.
    fn criteria(&self, catalog: &Catalog) -> Result<FilterCriteria, CatalogCommandError> {
        let min = self.min.unwrap_or(Decimal::ZERO);
        let max = self.max.unwrap_or_else(|| catalog.max_price());
        if min > max {
            return Err(CatalogCommandError::InvertedRange { min, max });
        }

        Ok(FilterCriteria {
            categories: self.categories.iter().copied().collect::<BTreeSet<_>>(),
            brands: self.brands.iter().copied().collect::<BTreeSet<_>>(),
            price: PriceRange::new(min, max),
        })
    }
}

fn load(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading catalog");
            Catalog::from_path(path)
        }
        None => {
            tracing::info!("Loading bundled catalog");
            Catalog::bundled()
        }
    }
}

/// Load and validate a catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is malformed, or contains
/// duplicate or empty product ids.
pub fn check(path: Option<&Path>) -> Result<CatalogReport, CatalogCommandError> {
    let catalog = load(path)?;
    Ok(CatalogReport {
        products: catalog.len(),
        facets: catalog.facets(),
    })
}

/// Product lines passing `filter`, formatted for display.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the price range is
/// inverted.
pub fn list(
    path: Option<&Path>,
    options: &ListFilter,
) -> Result<Vec<String>, CatalogCommandError> {
    let catalog = load(path)?;
    let criteria = options.criteria(&catalog)?;

    let lines = filter(catalog.products(), &criteria)
        .into_iter()
        .map(|product| {
            format!(
                "{:<6} {:<28} {:<10} {:<10} ${}",
                product.id.as_str(),
                product.name,
                product.category.as_str(),
                product.brand.as_str(),
                product.price
            )
        })
        .collect();
    Ok(lines)
}

/// Print a catalog report to stdout.
#[allow(clippy::print_stdout)]
pub fn print_report(report: &CatalogReport) {
    let join = |items: Vec<String>| items.join(", ");

    println!("Catalog OK: {} products", report.products);
    println!(
        "  categories: {}",
        join(report.facets.categories.iter().map(ToString::to_string).collect())
    );
    println!(
        "  brands:     {}",
        join(report.facets.brands.iter().map(ToString::to_string).collect())
    );
    println!("  max price:  ${}", report.facets.max_price);
}

/// Print listed products to stdout.
#[allow(clippy::print_stdout)]
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
    println!("{} products", lines.len());
}
