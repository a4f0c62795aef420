//! Checkout form validation and mock order placement.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use satchel_core::{DeliveryOption, Email, OrderStatus, PaymentMethod, ProductId};

use crate::catalog::Catalog;
use crate::models::order::generate_order_id;
use crate::models::{Order, OrderItem};
use crate::store::{Notice, StateStorage, StateStore};

/// Country preselected on the checkout form.
pub const DEFAULT_COUNTRY: &str = "United States";

static EXPIRY_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").ok());

/// Field name → message for every invalid field.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Errors that prevent an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more form fields are invalid.
    #[error("invalid checkout form ({} fields)", .0.len())]
    Invalid(FieldErrors),
}

/// Checkout form as submitted by the shopper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub delivery_option: DeliveryOption,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub cvc: Option<String>,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_owned()
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            name: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: default_country(),
            delivery_option: DeliveryOption::default(),
            payment_method: PaymentMethod::default(),
            card_name: None,
            card_number: None,
            expiry_date: None,
            cvc: None,
        }
    }
}

impl CheckoutForm {
    /// Check every field, collecting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the map of invalid fields when any field fails.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if Email::parse(&self.email).is_err() {
            errors.insert("email", "Invalid email address".to_owned());
        }
        min_length(&mut errors, "name", &self.name, 2);
        min_length(&mut errors, "address", &self.address, 5);
        min_length(&mut errors, "city", &self.city, 2);
        min_length(&mut errors, "postalCode", &self.postal_code, 4);
        min_length(&mut errors, "country", &self.country, 2);

        if self.payment_method == PaymentMethod::Card {
            self.validate_card(&mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_card(&self, errors: &mut FieldErrors) {
        let card_name = self.card_name.as_deref().unwrap_or_default();
        if card_name.trim().chars().count() < 2 {
            errors.insert("cardName", "Name on card is required".to_owned());
        }

        if !is_digits(self.card_number.as_deref(), 16) {
            errors.insert("cardNumber", "Card number must be 16 digits".to_owned());
        }

        let expiry_ok = match (self.expiry_date.as_deref(), EXPIRY_RE.as_ref()) {
            (Some(expiry), Some(re)) => re.is_match(expiry),
            _ => false,
        };
        if !expiry_ok {
            errors.insert("expiryDate", "Invalid format (MM/YY)".to_owned());
        }

        if !is_digits(self.cvc.as_deref(), 3) {
            errors.insert("cvc", "CVC must be 3 digits".to_owned());
        }
    }
}

fn min_length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.insert(field, format!("Must contain at least {min} characters"));
    }
}

fn is_digits(value: Option<&str>, len: usize) -> bool {
    value.is_some_and(|v| v.len() == len && v.bytes().all(|b| b.is_ascii_digit()))
}

/// One priced line of the order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Amounts shown next to the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Price the shopper's cart for the given delivery option.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when no cart line refers to a
/// product still in the catalog.
pub fn checkout_summary<S: StateStorage>(
    store: &StateStore<S>,
    catalog: &Catalog,
    delivery: DeliveryOption,
) -> Result<CheckoutSummary, CheckoutError> {
    let resolved = store.cart().resolve(catalog);
    if resolved.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let lines: Vec<SummaryLine> = resolved
        .into_iter()
        .map(|(product, quantity)| SummaryLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            line_total: product.price.times(quantity),
        })
        .collect();
    let subtotal = lines.iter().map(|line| line.line_total).sum::<Decimal>();
    let delivery_fee = delivery.fee();

    Ok(CheckoutSummary {
        lines,
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    })
}

/// Validate the form and place a mock order, emptying the cart.
///
/// Nothing is charged or stored; the returned order exists only for the
/// confirmation page.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] before looking at the form, or
/// [`CheckoutError::Invalid`] with every bad field. The cart is untouched
/// on error.
pub fn place_order<S: StateStorage>(
    store: &mut StateStore<S>,
    catalog: &Catalog,
    form: &CheckoutForm,
) -> Result<Order, CheckoutError> {
    let summary = checkout_summary(store, catalog, form.delivery_option)?;
    form.validate().map_err(CheckoutError::Invalid)?;

    let items = store
        .cart()
        .resolve(catalog)
        .into_iter()
        .map(|(product, quantity)| OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        })
        .collect();

    let order = Order {
        id: generate_order_id(),
        date: Utc::now().date_naive(),
        items,
        total: summary.total,
        status: OrderStatus::Processing,
        delivery_option: form.delivery_option,
    };
    store.clear_cart();

    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        payment_method = %form.payment_method,
        "order placed"
    );
    Ok(order)
}

/// Notice shown once an order is placed.
#[must_use]
pub fn order_placed_notice() -> Notice {
    Notice::info(
        "Order Placed!",
        "Thank you for your purchase. We are processing your order.",
    )
}
