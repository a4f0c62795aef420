//! Shopping cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use satchel_core::ProductId;

use crate::catalog::{Catalog, Product};

/// One product in the cart and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart lines, at most one per product, each with a positive quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `id` in the cart (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| &line.product_id == id)
            .map_or(0, |line| line.quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Add one unit of `id`, creating the line if needed.
    pub fn add(&mut self, id: &ProductId) {
        match self.lines.iter_mut().find(|line| &line.product_id == id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product_id: id.clone(),
                quantity: 1,
            }),
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != id);
        self.lines.len() != before
    }

    /// Set the quantity of an existing line; zero or less removes it.
    ///
    /// Returns whether the cart changed. Setting a quantity for a product
    /// that is not in the cart does nothing.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|line| &line.product_id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines resolved against the catalog.
    ///
    /// Lines whose product is no longer in the catalog are skipped.
    #[must_use]
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Vec<(&'a Product, u32)> {
        self.lines
            .iter()
            .filter_map(|line| match catalog.get(&line.product_id) {
                Some(product) => Some((product, line.quantity)),
                None => {
                    tracing::warn!(
                        product_id = %line.product_id,
                        "cart line references unknown product"
                    );
                    None
                }
            })
            .collect()
    }

    /// Sum of quantity × current catalog price over all lines.
    #[must_use]
    pub fn total(&self, catalog: &Catalog) -> Decimal {
        self.resolve(catalog)
            .into_iter()
            .map(|(product, quantity)| product.price.times(quantity))
            .sum()
    }
}

impl From<Vec<CartLine>> for Cart {
    /// Normalise persisted lines: merge duplicates and drop empty lines.
    fn from(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart
                .lines
                .iter_mut()
                .find(|existing| existing.product_id == line.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
