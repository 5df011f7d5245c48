use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PcaError;

/// Order header as stored by the ordering front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Internal identifier (UUID).
    pub id: String,
    /// Externally visible order number, e.g. "20240007".
    pub order_no: String,
    /// Date the order was placed (sales date on export).
    pub order_date: NaiveDate,
    /// Requested delivery date.
    pub delivery_date: Option<NaiveDate>,
    /// Customer (得意先) code.
    pub customer_code: String,
    /// Customer display name.
    pub customer_name: Option<String>,
    /// Department (部門) code.
    pub department_code: String,
    /// Staff (担当者) code.
    pub staff_code: String,
    /// Sum of all detail amounts.
    pub total_amount: Decimal,
    /// Sum of per-line tax.
    pub tax_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Wire code as stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrderStatus {
    type Err = PcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(PcaError::Validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// One product line of an order. Owned by exactly one [`Order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: String,
    /// Id of the owning order.
    pub order_id: String,
    pub product_code: String,
    pub product_name: Option<String>,
    /// Ordered quantity, may be fractional (e.g. 1.5 kg).
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Line amount, fixed at creation to `quantity * unit_price`.
    pub amount: Decimal,
    /// Tax rate in percent (e.g. 10 or 8).
    pub tax_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Product master entry, read-only reference data for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    /// Unit of measure (e.g. "kg", "個").
    pub unit: String,
    /// List price.
    pub price: Decimal,
    /// Unit cost.
    pub cost: Decimal,
}

impl Product {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        price: Decimal,
        cost: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            price,
            cost,
        }
    }

    /// Profit per unit at list price.
    pub fn gross_margin(&self) -> Decimal {
        self.price.saturating_sub(self.cost)
    }

    /// Markup over cost in percent. Zero when the cost is zero or the ratio
    /// falls outside the `Decimal` range.
    pub fn markup_rate(&self) -> Decimal {
        self.gross_margin()
            .checked_div(self.cost)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Lookup of product master data by product code.
pub trait ProductLookup {
    fn find_product(&self, code: &str) -> Option<&Product>;
}

impl ProductLookup for [Product] {
    fn find_product(&self, code: &str) -> Option<&Product> {
        self.iter().find(|p| p.code == code)
    }
}

impl ProductLookup for Vec<Product> {
    fn find_product(&self, code: &str) -> Option<&Product> {
        self.as_slice().find_product(code)
    }
}

impl ProductLookup for HashMap<String, Product> {
    fn find_product(&self, code: &str) -> Option<&Product> {
        self.get(code)
    }
}

/// Product master indexed by code.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product, keyed by its code.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.code.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for ProductCatalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for product in iter {
            catalog.insert(product);
        }
        catalog
    }
}

impl ProductLookup for ProductCatalog {
    fn find_product(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }
}

/// An order header together with the details it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

/// Header totals derived from a set of details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of line amounts.
    pub total_amount: Decimal,
    /// Sum of per-line tax.
    pub tax_amount: Decimal,
}

/// Tax split of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTax {
    /// `floor(amount * rate / 100)`.
    pub tax: Decimal,
    /// `amount - tax`.
    pub net: Decimal,
}
