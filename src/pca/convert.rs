//! Order → PCA sales detail conversion.

use rust_decimal::Decimal;

use super::PcaConfig;
use super::record::{FieldValue, PcaRecord};
use super::schema::{FIELDS, Field};
use crate::core::{Order, OrderDetail, OrderStatus, Product, ProductLookup, line_tax};

/// Convert an order into one sales detail record per detail, in the order
/// of `details`, using the default [`PcaConfig`].
///
/// Products missing from `products` are exported with zero cost and zero
/// standard price; the resulting gross profit equals the line amount.
pub fn convert_order<P: ProductLookup + ?Sized>(
    order: &Order,
    details: &[OrderDetail],
    products: &P,
) -> Vec<PcaRecord> {
    convert_order_with(order, details, products, &PcaConfig::default())
}

/// Like [`convert_order`], with explicit configuration.
pub fn convert_order_with<P: ProductLookup + ?Sized>(
    order: &Order,
    details: &[OrderDetail],
    products: &P,
    config: &PcaConfig,
) -> Vec<PcaRecord> {
    details
        .iter()
        .map(|detail| detail_to_record(order, detail, products, config))
        .collect()
}

/// Per-line figures that depend on the product master.
struct LineFigures {
    tax: Decimal,
    unit_cost: Decimal,
    cost_amount: Decimal,
    gross_profit: Decimal,
    standard_price: Decimal,
}

fn line_figures(detail: &OrderDetail, product: Option<&Product>) -> LineFigures {
    let unit_cost = product.map_or(Decimal::ZERO, |p| p.cost);
    let cost_amount = unit_cost.saturating_mul(detail.quantity);
    LineFigures {
        tax: line_tax(detail.amount, detail.tax_rate).tax,
        unit_cost,
        cost_amount,
        gross_profit: detail.amount.saturating_sub(cost_amount),
        standard_price: product.map_or(Decimal::ZERO, |p| p.price),
    }
}

fn detail_to_record<P: ProductLookup + ?Sized>(
    order: &Order,
    detail: &OrderDetail,
    products: &P,
    config: &PcaConfig,
) -> PcaRecord {
    let product = products.find_product(&detail.product_code);
    if product.is_none() {
        tracing::debug!(
            order_no = %order.order_no,
            product_code = %detail.product_code,
            "product not in master, exporting zero cost"
        );
    }
    let figures = line_figures(detail, product);
    let unit = product.map_or("", |p| p.unit.as_str());
    let product_name = detail.product_name.as_deref().unwrap_or("");
    let billing_date = match order.status {
        OrderStatus::Completed => Some(order.order_date),
        OrderStatus::Pending | OrderStatus::Cancelled => None,
    };

    let values = FIELDS
        .iter()
        .map(|spec| {
            let value = match spec.field {
                Field::SlipType => FieldValue::Flag(&config.slip_type_code),
                Field::SalesDate => FieldValue::Date(Some(order.order_date)),
                Field::BillingDate => FieldValue::Date(billing_date),
                Field::SlipNo => FieldValue::Code(&order.order_no),
                Field::CustomerCode | Field::BillToCode => {
                    FieldValue::Code(&order.customer_code)
                }
                Field::CustomerName => {
                    FieldValue::Text(order.customer_name.as_deref().unwrap_or(""))
                }
                Field::DepartmentCode => FieldValue::Code(&order.department_code),
                Field::StaffCode => FieldValue::Code(&order.staff_code),
                Field::ProductCode => FieldValue::Code(&detail.product_code),
                Field::ProductName | Field::ProductName2 => FieldValue::Text(product_name),
                Field::Unit => FieldValue::Text(unit),
                Field::Quantity => FieldValue::Number(detail.quantity),
                Field::UnitPrice | Field::SellingUnitPrice => {
                    FieldValue::Number(detail.unit_price)
                }
                Field::SalesAmount | Field::SellingAmount => FieldValue::Number(detail.amount),
                Field::UnitCost => FieldValue::Number(figures.unit_cost),
                Field::CostAmount => FieldValue::Number(figures.cost_amount),
                Field::GrossProfit => FieldValue::Number(figures.gross_profit),
                Field::ExclusiveTax | Field::SlipTax => FieldValue::Number(figures.tax),
                Field::StandardPrice => FieldValue::Number(figures.standard_price),
                Field::TaxRate | Field::CostTaxRate => FieldValue::Number(detail.tax_rate),
                Field::TaxCategory => FieldValue::Flag(&config.tax_category_code),

                // Unused codes still carry their zero padding.
                Field::ShipToCode
                | Field::MemoCode
                | Field::WarehouseCode
                | Field::SettlementCompanyCode
                | Field::SettlementMemoCode => FieldValue::Code(""),

                Field::SettlementDate => FieldValue::Date(None),

                Field::PackSize
                | Field::CaseCount
                | Field::InclusiveTax
                | Field::ProductItem1
                | Field::ProductItem2
                | Field::ProductItem3
                | Field::SalesItem1
                | Field::SalesItem2
                | Field::SalesItem3
                | Field::SettlementFee
                | Field::FeeExclusiveTax
                | Field::FeeInclusiveTax
                | Field::FeeTaxRate => FieldValue::Number(Decimal::ZERO),

                Field::MasterKind
                | Field::LineKind
                | Field::TaxInclusion
                | Field::SimultaneousReceipt
                | Field::FormulaCode
                | Field::DataKind
                | Field::UnitKind
                | Field::FeeTaxCategory
                | Field::FeeTaxInclusion
                | Field::SalesTaxType
                | Field::CostTaxInclusion
                | Field::CostTaxType => FieldValue::Flag("0"),

                Field::ShipToName
                | Field::ContactName
                | Field::MemoName
                | Field::CategoryCode
                | Field::SlipCategory
                | Field::Remarks
                | Field::ModelNumber
                | Field::Color
                | Field::Size
                | Field::ProjectCode
                | Field::SlipNo2
                | Field::LotNo
                | Field::SettlementCompanyName
                | Field::SettlementMemoName => FieldValue::Blank,
            };
            value.render(spec)
        })
        .collect();

    PcaRecord { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderBuilder, OrderDetailBuilder, PlacedOrder};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn placed(status: OrderStatus) -> PlacedOrder {
        OrderBuilder::new("20240001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "REST001")
            .customer_name("レストラン田中")
            .department_code("10")
            .staff_code("7")
            .status(status)
            .add_detail(OrderDetailBuilder::new("M001", dec!(1), dec!(2800)).product_name("牛肉"))
            .build()
            .unwrap()
    }

    #[test]
    fn billing_date_only_when_completed() {
        let p = placed(OrderStatus::Completed);
        let records = convert_order(&p.order, &p.details, &Vec::<Product>::new());
        let r = &records[0];
        assert_eq!(r.get(Field::SalesDate), "20240115");
        assert_eq!(r.get(Field::BillingDate), "20240115");

        for status in [OrderStatus::Pending, OrderStatus::Cancelled] {
            let p = placed(status);
            let records = convert_order(&p.order, &p.details, &Vec::<Product>::new());
            assert_eq!(records[0].get(Field::BillingDate), "0");
        }
    }

    #[test]
    fn codes_are_padded() {
        let p = placed(OrderStatus::Pending);
        let records = convert_order(&p.order, &p.details, &Vec::<Product>::new());
        let r = &records[0];
        assert_eq!(r.get(Field::SlipNo), "20240001");
        assert_eq!(r.get(Field::CustomerCode), "000000REST001");
        assert_eq!(r.get(Field::BillToCode), "000000REST001");
        assert_eq!(r.get(Field::DepartmentCode), "000010");
        assert_eq!(r.get(Field::StaffCode), "0000000000007");
        assert_eq!(r.get(Field::ProductCode), "000000000M001");
        assert_eq!(r.get(Field::ShipToCode), "0000000000000");
        assert_eq!(r.get(Field::CategoryCode), "");
    }

    #[test]
    fn cost_from_product_master() {
        let p = placed(OrderStatus::Pending);
        let products = vec![Product::new("M001", "牛肉", "kg", dec!(3000), dec!(2000))];
        let records = convert_order(&p.order, &p.details, &products);
        let r = &records[0];
        assert_eq!(r.get(Field::Unit), "kg");
        assert_eq!(r.get(Field::UnitCost), "2000");
        assert_eq!(r.get(Field::CostAmount), "2000");
        assert_eq!(r.get(Field::GrossProfit), "800");
        assert_eq!(r.get(Field::StandardPrice), "3000");
        assert_eq!(r.get(Field::ExclusiveTax), "280");
        assert_eq!(r.get(Field::SlipTax), "280");
    }

    struct CountingLookup {
        products: Vec<Product>,
        calls: std::cell::Cell<usize>,
    }

    impl ProductLookup for CountingLookup {
        fn find_product(&self, code: &str) -> Option<&Product> {
            self.calls.set(self.calls.get() + 1);
            self.products.find_product(code)
        }
    }

    #[test]
    fn one_lookup_per_detail() {
        let p = placed(OrderStatus::Pending);
        let lookup = CountingLookup {
            products: vec![Product::new("M001", "牛肉", "kg", dec!(3000), dec!(2000))],
            calls: std::cell::Cell::new(0),
        };
        let records = convert_order(&p.order, &p.details, &lookup);
        assert_eq!(records[0].get(Field::Unit), "kg");
        assert_eq!(lookup.calls.get(), p.details.len());
    }

    #[test]
    fn tax_category_from_config() {
        let p = placed(OrderStatus::Pending);
        let config = PcaConfig {
            tax_category_code: "1".into(),
            ..Default::default()
        };
        let records = convert_order_with(&p.order, &p.details, &Vec::<Product>::new(), &config);
        let r = &records[0];
        assert_eq!(r.get(Field::TaxCategory), "1");
    }
}
