//! # pca-export
//!
//! Order export for the PCA 商魂・商管 accounting series: converts orders
//! (header, line items, product master) into the fixed 72-field sales detail
//! layout, writes it as CSV, and allocates the `YYYYNNNN` order numbers those
//! records reference.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pca_export::core::*;
//! use pca_export::pca;
//! use rust_decimal_macros::dec;
//!
//! let allocator = OrderNumberAllocator::new(InMemorySequenceStore::new());
//! let number = allocator.allocate(2024).unwrap();
//! assert_eq!(number.as_str(), "20240001");
//!
//! let placed = OrderBuilder::new(number.as_str(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "REST001")
//!     .customer_name("レストラン田中")
//!     .add_detail(OrderDetailBuilder::new("M001", dec!(1), dec!(2800)).product_name("牛肉"))
//!     .build()
//!     .unwrap();
//!
//! let records = pca::convert_order(&placed.order, &placed.details, &Vec::<Product>::new());
//! assert_eq!(records[0].get(pca::Field::ExclusiveTax), "280");
//!
//! let csv = pca::to_csv(&records);
//! assert_eq!(csv.lines().count(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Order types, builders, validation, order numbering |
//! | `pca` (default) | PCA sales detail schema, conversion, CSV export/import |
//! | `sqlite` | SQLite-backed order number sequence store |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "pca")]
pub mod pca;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
