//! Catalog filter engine.
//!
//! A product passes when its category is selected (or no category is),
//! its brand is selected (or no brand is), and its price lies inside the
//! inclusive price range. Filtering never reorders the catalog.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use satchel_core::{Brand, Category};

use super::Product;

/// Inclusive price bounds.
///
/// A range whose `min` exceeds its `max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `amount` lies within the range.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min <= amount && amount <= self.max
    }
}

/// User-selected category, brand and price constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub categories: BTreeSet<Category>,
    pub brands: BTreeSet<Brand>,
    pub price: PriceRange,
}

impl FilterCriteria {
    /// No category or brand restriction, prices from zero to `max_price`.
    ///
    /// This is also the state the sidebar's "Clear" action returns to.
    #[must_use]
    pub const fn unrestricted(max_price: Decimal) -> Self {
        Self {
            categories: BTreeSet::new(),
            brands: BTreeSet::new(),
            price: PriceRange::new(Decimal::ZERO, max_price),
        }
    }

    /// Select `category` if it is not selected, deselect it otherwise.
    #[must_use]
    pub fn toggle_category(mut self, category: Category) -> Self {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
        self
    }

    /// Select `brand` if it is not selected, deselect it otherwise.
    #[must_use]
    pub fn toggle_brand(mut self, brand: Brand) -> Self {
        if !self.brands.remove(&brand) {
            self.brands.insert(brand);
        }
        self
    }

    /// Replace the price range.
    #[must_use]
    pub fn with_price_range(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    /// Whether a single product satisfies every constraint.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_match =
            self.categories.is_empty() || self.categories.contains(&product.category);
        let brand_match = self.brands.is_empty() || self.brands.contains(&product.brand);
        category_match && brand_match && self.price.contains(product.price.amount())
    }
}

/// Products satisfying `criteria`, in their original order.
///
/// An empty result is a valid "no matches" state.
#[must_use]
pub fn filter<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| criteria.matches(product))
        .collect()
}
