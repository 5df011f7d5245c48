use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::*;

/// Largest line amount the 11-digit amount fields of the export can carry.
pub const MAX_LINE_AMOUNT: Decimal = dec!(99999999999);

/// Split a line amount into tax and net.
///
/// Tax is `floor(amount * rate / 100)`, rounding toward negative infinity
/// for negative amounts as well. The accounting side sums these per-line
/// values, so no other rounding mode may be used here. Products beyond the
/// `Decimal` range saturate instead of panicking.
pub fn line_tax(amount: Decimal, tax_rate: Decimal) -> LineTax {
    let tax = (amount.saturating_mul(tax_rate) / dec!(100)).floor();
    LineTax {
        tax,
        net: amount.saturating_sub(tax),
    }
}

/// Line amount for a quantity and unit price, saturating at the `Decimal`
/// range.
pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity.saturating_mul(unit_price).normalize()
}

/// Calculate header totals from the details of an order.
pub fn calculate_totals(details: &[OrderDetail]) -> OrderTotals {
    details
        .iter()
        .fold(OrderTotals::default(), |acc, d| OrderTotals {
            total_amount: acc.total_amount.saturating_add(d.amount),
            tax_amount: acc
                .tax_amount
                .saturating_add(line_tax(d.amount, d.tax_rate).tax),
        })
}

/// Validate an order header against its details.
/// Returns all validation errors found (not just the first).
pub fn validate_order(order: &Order, details: &[OrderDetail]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if order.order_no.trim().is_empty() {
        errors.push(ValidationError::new(
            "order_no",
            "order number must not be empty",
        ));
    }
    if order.customer_code.trim().is_empty() {
        errors.push(ValidationError::new(
            "customer_code",
            "customer code must not be empty",
        ));
    }
    if let Some(delivery) = order.delivery_date {
        if delivery < order.order_date {
            errors.push(ValidationError::new(
                "delivery_date",
                format!(
                    "delivery date {delivery} is before order date {}",
                    order.order_date
                ),
            ));
        }
    }

    for (i, d) in details.iter().enumerate() {
        validate_detail(order, d, i, &mut errors);
    }

    let totals = calculate_totals(details);
    if totals.total_amount != order.total_amount {
        errors.push(ValidationError::new(
            "total_amount",
            format!(
                "total amount {} does not match sum of line amounts {}",
                order.total_amount, totals.total_amount
            ),
        ));
    }
    if totals.tax_amount != order.tax_amount {
        errors.push(ValidationError::new(
            "tax_amount",
            format!(
                "tax amount {} does not match sum of line tax {}",
                order.tax_amount, totals.tax_amount
            ),
        ));
    }

    errors
}

fn validate_detail(
    order: &Order,
    detail: &OrderDetail,
    index: usize,
    errors: &mut Vec<ValidationError>,
) {
    let path = |field: &str| format!("details[{index}].{field}");

    if detail.order_id != order.id {
        errors.push(ValidationError::new(
            path("order_id"),
            format!(
                "detail belongs to order '{}', not '{}'",
                detail.order_id, order.id
            ),
        ));
    }
    if detail.product_code.trim().is_empty() {
        errors.push(ValidationError::new(
            path("product_code"),
            "product code must not be empty",
        ));
    }
    if detail.quantity.is_zero() {
        errors.push(ValidationError::new(
            path("quantity"),
            "quantity must not be zero",
        ));
    }
    if detail.tax_rate.is_sign_negative() {
        errors.push(ValidationError::new(
            path("tax_rate"),
            format!("tax rate {} must not be negative", detail.tax_rate),
        ));
    }
    let expected = line_amount(detail.quantity, detail.unit_price);
    if detail.amount != expected {
        errors.push(ValidationError::new(
            path("amount"),
            format!(
                "line amount {} does not equal quantity {} x unit price {}",
                detail.amount, detail.quantity, detail.unit_price
            ),
        ));
    }
    if detail.amount.abs() > MAX_LINE_AMOUNT {
        errors.push(ValidationError::new(
            path("amount"),
            format!(
                "line amount {} exceeds {MAX_LINE_AMOUNT}",
                detail.amount
            ),
        ));
    }
}
