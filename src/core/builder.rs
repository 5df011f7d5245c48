use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::error::{PcaError, validation_failure};
use super::types::*;
use super::validation;

/// Standard consumption tax rate applied when a line sets none.
pub const STANDARD_TAX_RATE: Decimal = dec!(10);

/// Builder for an order header and the details it owns.
///
/// Line amounts, header totals, ids and timestamps are computed on build.
///
/// ```
/// use pca_export::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let placed = OrderBuilder::new("20240001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "REST001")
///     .customer_name("レストラン田中")
///     .department_code("10")
///     .staff_code("7")
///     .add_detail(OrderDetailBuilder::new("V001", dec!(10), dec!(150)).product_name("キャベツ"))
///     .add_detail(OrderDetailBuilder::new("M001", dec!(1), dec!(2800)).product_name("牛肉"))
///     .build()
///     .unwrap();
///
/// assert_eq!(placed.order.total_amount, dec!(4300));
/// assert_eq!(placed.order.tax_amount, dec!(430));
/// ```
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: Option<String>,
    order_no: String,
    order_date: NaiveDate,
    delivery_date: Option<NaiveDate>,
    customer_code: String,
    customer_name: Option<String>,
    department_code: String,
    staff_code: String,
    status: OrderStatus,
    details: Vec<OrderDetailBuilder>,
}

impl OrderBuilder {
    pub fn new(
        order_no: impl Into<String>,
        order_date: NaiveDate,
        customer_code: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            order_no: order_no.into(),
            order_date,
            delivery_date: None,
            customer_code: customer_code.into(),
            customer_name: None,
            department_code: String::new(),
            staff_code: String::new(),
            status: OrderStatus::Pending,
            details: Vec::new(),
        }
    }

    /// Use a fixed id instead of a generated UUID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn department_code(mut self, code: impl Into<String>) -> Self {
        self.department_code = code.into();
        self
    }

    pub fn staff_code(mut self, code: impl Into<String>) -> Self {
        self.staff_code = code.into();
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn add_detail(mut self, detail: OrderDetailBuilder) -> Self {
        self.details.push(detail);
        self
    }

    /// Build the order, calculating amounts and running validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<PlacedOrder, PcaError> {
        if self.details.is_empty() {
            return Err(PcaError::Builder(
                "at least one order detail is required".into(),
            ));
        }
        if self.details.len() > 10_000 {
            return Err(PcaError::Builder(
                "order cannot have more than 10,000 details".into(),
            ));
        }

        let placed = self.assemble();
        let errors = validation::validate_order(&placed.order, &placed.details);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(placed)
    }

    /// Build without validation. Orders without details are allowed.
    pub fn build_unchecked(self) -> PlacedOrder {
        self.assemble()
    }

    fn assemble(self) -> PlacedOrder {
        let now = Utc::now();
        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let details: Vec<OrderDetail> = self
            .details
            .into_iter()
            .map(|d| d.into_detail(&id, now))
            .collect();
        let totals = validation::calculate_totals(&details);

        let order = Order {
            id,
            order_no: self.order_no,
            order_date: self.order_date,
            delivery_date: self.delivery_date,
            customer_code: self.customer_code,
            customer_name: self.customer_name,
            department_code: self.department_code,
            staff_code: self.staff_code,
            total_amount: totals.total_amount,
            tax_amount: totals.tax_amount,
            status: self.status,
            created_at: now,
            updated_at: now,
        };

        PlacedOrder { order, details }
    }
}

/// Builder for one order line.
#[derive(Debug, Clone)]
pub struct OrderDetailBuilder {
    product_code: String,
    product_name: Option<String>,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
}

impl OrderDetailBuilder {
    pub fn new(product_code: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_code: product_code.into(),
            product_name: None,
            quantity,
            unit_price,
            tax_rate: STANDARD_TAX_RATE,
        }
    }

    /// A cart line for `product`, priced at its list price.
    pub fn from_product(product: &Product, quantity: Decimal) -> Self {
        Self::new(product.code.clone(), quantity, product.price).product_name(product.name.clone())
    }

    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    fn into_detail(self, order_id: &str, now: chrono::DateTime<Utc>) -> OrderDetail {
        OrderDetail {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            amount: validation::line_amount(self.quantity, self.unit_price),
            product_code: self.product_code,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
            created_at: now,
        }
    }
}
