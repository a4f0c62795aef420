//! Mock orders.
//!
//! Orders are fabricated at checkout for display only; nothing is stored.
//! Signed-in shoppers see a fixed sample order history priced from the
//! catalog.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;

use satchel_core::{DeliveryOption, OrderId, OrderStatus, Price, ProductId};

use crate::catalog::Catalog;

/// Prefix shared by every fabricated order id.
pub const ORDER_ID_PREFIX: &str = "ORD-";

/// Generate an order id of the form `ORD-NNNNN`.
#[must_use]
pub fn generate_order_id() -> OrderId {
    let number: u32 = rand::rng().random_range(10_000..100_000);
    OrderId::new(format!("{ORDER_ID_PREFIX}{number}"))
}

struct SampleOrder {
    id: &'static str,
    date: (i32, u32, u32),
    status: OrderStatus,
    delivery_option: DeliveryOption,
    items: &'static [(&'static str, u32)],
}

/// Most recent first.
const SAMPLE_ORDERS: [SampleOrder; 3] = [
    SampleOrder {
        id: "ORD-61922",
        date: (2026, 6, 1),
        status: OrderStatus::Processing,
        delivery_option: DeliveryOption::Standard,
        items: &[("7", 2)],
    },
    SampleOrder {
        id: "ORD-60457",
        date: (2026, 5, 14),
        status: OrderStatus::Shipped,
        delivery_option: DeliveryOption::Express,
        items: &[("3", 1)],
    },
    SampleOrder {
        id: "ORD-58213",
        date: (2026, 3, 2),
        status: OrderStatus::Delivered,
        delivery_option: DeliveryOption::Standard,
        items: &[("1", 1), ("4", 1)],
    },
];

impl SampleOrder {
    /// `None` when none of the items is in `catalog`.
    fn price(&self, catalog: &Catalog) -> Option<Order> {
        let items: Vec<OrderItem> = self
            .items
            .iter()
            .filter_map(|&(id, quantity)| {
                let product = catalog.get(&ProductId::new(id))?;
                Some(OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity,
                })
            })
            .collect();
        if items.is_empty() {
            return None;
        }

        let (year, month, day) = self.date;
        let subtotal = items
            .iter()
            .map(|item| item.unit_price.times(item.quantity))
            .sum::<Decimal>();
        Some(Order {
            id: OrderId::new(self.id),
            date: NaiveDate::from_ymd_opt(year, month, day)?,
            items,
            total: subtotal + self.delivery_option.fee(),
            status: self.status,
            delivery_option: self.delivery_option,
        })
    }
}

/// The signed-in shopper's order history, most recent first.
///
/// Samples whose products have all left the catalog are dropped, so the
/// list may be empty.
#[must_use]
pub fn order_history(catalog: &Catalog) -> Vec<Order> {
    SAMPLE_ORDERS
        .iter()
        .filter_map(|sample| sample.price(catalog))
        .collect()
}

/// A line of a placed order, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

/// A placed (mock) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub date: NaiveDate,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub delivery_option: DeliveryOption,
}

impl Order {
    /// Placeholder shown when an order page is opened by id.
    ///
    /// Only fabricated ids (`ORD-…`) resolve; anything else is unknown.
    #[must_use]
    pub fn placeholder(id: &str) -> Option<Self> {
        if !id.starts_with(ORDER_ID_PREFIX) {
            return None;
        }
        Some(Self {
            id: OrderId::new(id),
            date: Utc::now().date_naive(),
            items: Vec::new(),
            total: Decimal::ZERO,
            status: OrderStatus::Processing,
            delivery_option: DeliveryOption::Standard,
        })
    }

    /// Percentage of the tracking timeline completed (0 for cancelled orders).
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        match self.status.timeline_position() {
            Some(position) => {
                let steps = OrderStatus::TIMELINE.len();
                u8::try_from((position + 1) * 100 / steps).unwrap_or(100)
            }
            None => 0,
        }
    }
}
