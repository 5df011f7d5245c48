//! PCA 商魂・商管 sales detail (売上明細) export.
//!
//! Converts orders into the fixed 72-field layout the PCA accounting import
//! expects, one record per order line, and writes them as CSV.
//!
//! # Example
//!
//! ```ignore
//! use pca_export::pca::*;
//!
//! let config = PcaConfigBuilder::new().bom(true).build();
//! let export = export_order(&placed.order, &placed.details, &catalog, &config)?;
//! std::fs::write(&export.filename, export.content)?;
//! ```

mod convert;
mod csv_export;
mod record;
mod schema;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{
    Order, OrderDetail, OrderStatus, PcaError, PlacedOrder, ProductLookup, ValidationError,
    validate_order,
};

pub use convert::{convert_order, convert_order_with};
pub use csv_export::{from_csv, to_csv, to_csv_with};
pub use record::{PcaRecord, format_date, format_number, pad_code, truncate_chars};
pub use schema::{
    FIELD_COUNT, FIELDS, Field, FieldKind, FieldSpec, SCHEMA_VERSION, check_widths, header_names,
};

/// Line terminator between CSV rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Configuration for PCA export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaConfig {
    /// 伝区: "0" credit sale (掛売).
    pub slip_type_code: String,
    /// 税区分: "2" standard rate.
    pub tax_category_code: String,
    pub line_ending: LineEnding,
    /// Prefix the file with a UTF-8 byte order mark.
    pub bom: bool,
    /// Include cancelled orders in bulk exports.
    pub include_cancelled: bool,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            slip_type_code: "0".into(),
            tax_category_code: "2".into(),
            line_ending: LineEnding::Lf,
            bom: false,
            include_cancelled: true,
        }
    }
}

/// Builder for [`PcaConfig`].
///
/// ```
/// use pca_export::pca::{LineEnding, PcaConfigBuilder};
///
/// let config = PcaConfigBuilder::new()
///     .line_ending(LineEnding::CrLf)
///     .include_cancelled(false)
///     .build();
/// assert_eq!(config.tax_category_code, "2");
/// ```
#[derive(Default)]
pub struct PcaConfigBuilder {
    config: PcaConfig,
}

impl PcaConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slip_type_code(mut self, code: impl Into<String>) -> Self {
        self.config.slip_type_code = code.into();
        self
    }

    pub fn tax_category_code(mut self, code: impl Into<String>) -> Self {
        self.config.tax_category_code = code.into();
        self
    }

    pub fn line_ending(mut self, ending: LineEnding) -> Self {
        self.config.line_ending = ending;
        self
    }

    pub fn bom(mut self, bom: bool) -> Self {
        self.config.bom = bom;
        self
    }

    pub fn include_cancelled(mut self, include: bool) -> Self {
        self.config.include_cancelled = include;
        self
    }

    pub fn build(self) -> PcaConfig {
        self.config
    }
}

/// A generated export file.
#[derive(Debug, Clone)]
pub struct PcaExport {
    /// Suggested download name.
    pub filename: String,
    /// CSV content.
    pub content: String,
    /// Number of data rows.
    pub record_count: usize,
}

/// `PCA_<order_no>_<YYYY-MM-DD>.csv`, dated by the order date.
pub fn order_filename(order: &Order) -> String {
    format!(
        "PCA_{}_{}.csv",
        order.order_no,
        order.order_date.format("%Y-%m-%d")
    )
}

/// `PCA_ALL_ORDERS_<YYYY-MM-DD>.csv`, dated by the export date.
pub fn bulk_filename(export_date: NaiveDate) -> String {
    format!("PCA_ALL_ORDERS_{}.csv", export_date.format("%Y-%m-%d"))
}

/// Export a single order.
///
/// Fails only if a detail belongs to a different order. Other
/// inconsistencies (header totals, line amounts, over-wide values) are
/// logged and exported as stored.
pub fn export_order<P: ProductLookup + ?Sized>(
    order: &Order,
    details: &[OrderDetail],
    products: &P,
    config: &PcaConfig,
) -> Result<PcaExport, PcaError> {
    check_ownership(order, details)?;
    let records = convert_checked(order, details, products, config);

    let export = PcaExport {
        filename: order_filename(order),
        content: to_csv_with(&records, config),
        record_count: records.len(),
    };
    tracing::info!(
        order_no = %order.order_no,
        records = export.record_count,
        filename = %export.filename,
        "exported order"
    );
    Ok(export)
}

/// Export several orders into one file, in the given order.
pub fn export_orders<P: ProductLookup + ?Sized>(
    orders: &[PlacedOrder],
    products: &P,
    export_date: NaiveDate,
    config: &PcaConfig,
) -> Result<PcaExport, PcaError> {
    let mut records = Vec::new();
    let mut exported = 0usize;
    for placed in orders {
        if placed.order.status == OrderStatus::Cancelled && !config.include_cancelled {
            continue;
        }
        check_ownership(&placed.order, &placed.details)?;
        records.extend(convert_checked(
            &placed.order,
            &placed.details,
            products,
            config,
        ));
        exported += 1;
    }

    let export = PcaExport {
        filename: bulk_filename(export_date),
        content: to_csv_with(&records, config),
        record_count: records.len(),
    };
    tracing::info!(
        orders = exported,
        skipped = orders.len() - exported,
        records = export.record_count,
        filename = %export.filename,
        "exported orders"
    );
    Ok(export)
}

fn check_ownership(order: &Order, details: &[OrderDetail]) -> Result<(), PcaError> {
    match details.iter().find(|d| d.order_id != order.id) {
        Some(d) => Err(PcaError::Validation(format!(
            "detail {} belongs to order '{}', not '{}' ({})",
            d.id, d.order_id, order.id, order.order_no
        ))),
        None => Ok(()),
    }
}

fn convert_checked<P: ProductLookup + ?Sized>(
    order: &Order,
    details: &[OrderDetail],
    products: &P,
    config: &PcaConfig,
) -> Vec<PcaRecord> {
    log_issues(order, "order", &validate_order(order, details));
    let records = convert_order_with(order, details, products, config);
    log_issues(order, "width", &check_widths(&records));
    records
}

fn log_issues(order: &Order, check: &str, issues: &[ValidationError]) {
    for issue in issues {
        tracing::warn!(
            order_no = %order.order_no,
            check,
            field = %issue.field,
            "{}",
            issue.message
        );
    }
}
