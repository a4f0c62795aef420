//! Product route handlers.

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use satchel_core::ProductId;

use crate::catalog::{Catalog, Facets, FilterCriteria, PriceRange, Product};
use crate::error::{AppError, Result};
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Query parameters for the product list.
///
/// Categories and brands are comma-separated display names; an absent or
/// empty list does not restrict. Missing price bounds default to the full
/// catalog range.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl ProductQuery {
    /// Turn the raw query into filter criteria.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown category or brand, or
    /// a price that is not a number.
    pub fn criteria(&self, catalog: &Catalog) -> Result<FilterCriteria> {
        let max_price = catalog.max_price();
        let min = parse_price("min", self.min.as_deref())?.unwrap_or(Decimal::ZERO);
        let max = parse_price("max", self.max.as_deref())?.unwrap_or(max_price);

        Ok(FilterCriteria {
            categories: parse_list(self.categories.as_deref())?,
            brands: parse_list(self.brands.as_deref())?,
            price: PriceRange::new(min, max),
        })
    }
}

fn parse_list<T>(raw: Option<&str>) -> Result<BTreeSet<T>>
where
    T: FromStr + Ord,
    T::Err: std::fmt::Display,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.parse().map_err(|e: T::Err| AppError::BadRequest(e.to_string())))
        .collect()
}

fn parse_price(name: &str, raw: Option<&str>) -> Result<Option<Decimal>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Decimal::from_str(value)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{name} must be a number"))),
        None => Ok(None),
    }
}

/// Look up a product or answer 404.
pub(crate) fn find_product<'a>(catalog: &'a Catalog, id: &ProductId) -> Result<&'a Product> {
    catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Resolve ids against the catalog, skipping products that no longer exist.
pub(crate) fn resolve_ids(catalog: &Catalog, ids: &[ProductId]) -> Vec<Product> {
    ids.iter()
        .filter_map(|id| catalog.get(id))
        .cloned()
        .collect()
}

/// Product list response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub total: usize,
}

/// Product detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub in_wishlist: bool,
}

/// Filtered product list.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>> {
    let catalog = state.catalog();
    let criteria = query.criteria(catalog.catalog())?;
    let products: Vec<Product> = catalog.search(&criteria).await.into_iter().cloned().collect();

    Ok(Json(ProductList {
        total: products.len(),
        products,
    }))
}

/// Categories, brands and price ceiling for the filter sidebar.
#[instrument(skip(state))]
pub async fn facets(State(state): State<AppState>) -> Json<Facets> {
    Json(state.catalog().catalog().facets())
}

/// Product detail. Viewing a product records it in the browsing history.
#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = find_product(state.catalog().catalog(), &id)?;
    let in_wishlist = shopper.with_store(|store| {
        store.add_to_history(&product.id);
        store.is_in_wishlist(&product.id)
    });

    Ok(Json(ProductDetail {
        product: product.clone(),
        in_wishlist,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use satchel_core::{Brand, Category};

    use super::*;
    use crate::catalog::tests::product;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("a", Category::Tote, Brand::ChicVogue, 10_000),
            product("b", Category::Clutch, Brand::Elegante, 25_000),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_query_is_unrestricted() {
        let criteria = ProductQuery::default().criteria(&catalog()).unwrap();
        assert_eq!(criteria, FilterCriteria::unrestricted(Decimal::from(250)));
    }

    #[test]
    fn test_lists_are_parsed_case_insensitively() {
        let query = ProductQuery {
            categories: Some("tote, Clutch,".to_string()),
            brands: Some("elegante".to_string()),
            ..ProductQuery::default()
        };
        let criteria = query.criteria(&catalog()).unwrap();
        assert_eq!(
            criteria.categories,
            BTreeSet::from([Category::Tote, Category::Clutch])
        );
        assert_eq!(criteria.brands, BTreeSet::from([Brand::Elegante]));
    }

    #[test]
    fn test_unknown_category_is_bad_request() {
        let query = ProductQuery {
            categories: Some("Duffel".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(
            query.criteria(&catalog()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_price_bounds() {
        let query = ProductQuery {
            min: Some("50".to_string()),
            max: Some("120.5".to_string()),
            ..ProductQuery::default()
        };
        let criteria = query.criteria(&catalog()).unwrap();
        assert_eq!(
            criteria.price,
            PriceRange::new(Decimal::from(50), Decimal::new(1205, 1))
        );

        let bad = ProductQuery {
            max: Some("lots".to_string()),
            ..ProductQuery::default()
        };
        assert!(bad.criteria(&catalog()).is_err());
    }

    #[test]
    fn test_resolve_ids_skips_unknown() {
        let resolved = resolve_ids(&catalog(), &[ProductId::new("b"), ProductId::new("gone")]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id.as_str(), "b");
    }
}
