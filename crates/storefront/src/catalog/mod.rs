//! Catalog store.
//!
//! The catalog is an immutable, ordered list of products loaded once at
//! start-up, either from `STOREFRONT_CATALOG_PATH` or from the bundled
//! `data/catalog.json`. Everything else in the storefront refers to products
//! by [`ProductId`] and resolves them here.

pub mod filter;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use satchel_core::{Brand, Category, Price, ProductId};

pub use filter::{FilterCriteria, PriceRange, filter};

/// Catalog bundled with the binary.
const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.json");

/// Number of distinct filter criteria kept in the result cache.
const FILTER_CACHE_CAPACITY: u64 = 256;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog JSON is malformed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an identifier.
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// A product has an empty identifier.
    #[error("product at position {0} has an empty id")]
    EmptyId(usize),
}

/// A purchasable bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub image_hint: String,
    #[serde(alias = "type")]
    pub category: Category,
    pub brand: Brand,
}

/// The read-only product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products, rejecting empty or duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyId`] or [`CatalogError::DuplicateId`].
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId(position));
            }
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from JSON (an array of products).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog bundled with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data is corrupt.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Highest product price, or zero for an empty catalog.
    #[must_use]
    pub fn max_price(&self) -> Decimal {
        self.products
            .iter()
            .map(|product| product.price.amount())
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Distinct categories and brands in order of first appearance.
    #[must_use]
    pub fn facets(&self) -> Facets {
        let mut categories = Vec::new();
        let mut brands = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
            if !brands.contains(&product.brand) {
                brands.push(product.brand);
            }
        }
        Facets {
            categories,
            brands,
            max_price: self.max_price(),
        }
    }
}

/// Filter options offered by the catalog sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub max_price: Decimal,
}

/// Shared catalog plus a criteria-keyed cache of filter results.
///
/// Cheaply cloneable; clones share the cache.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<Catalog>,
    filtered: Cache<FilterCriteria, Arc<[usize]>>,
}

impl CatalogService {
    /// Wrap a loaded catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            filtered: Cache::new(FILTER_CACHE_CAPACITY),
        }
    }

    /// The underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Products matching `criteria`, in catalog order.
    ///
    /// Repeated criteria are served from the cache.
    pub async fn search(&self, criteria: &FilterCriteria) -> Vec<&Product> {
        let catalog = Arc::clone(&self.catalog);
        let positions = self
            .filtered
            .get_with_by_ref(criteria, async move {
                tracing::debug!(?criteria, "filter cache miss");
                catalog
                    .products()
                    .iter()
                    .enumerate()
                    .filter(|(_, product)| criteria.matches(product))
                    .map(|(position, _)| position)
                    .collect::<Vec<_>>()
                    .into()
            })
            .await;

        positions
            .iter()
            .filter_map(|&position| self.catalog.products().get(position))
            .collect()
    }
}
