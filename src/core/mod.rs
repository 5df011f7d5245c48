//! Core order types, validation, and order numbering.
//!
//! This module provides the order model shared by the export side and the
//! allocator that issues `YYYYNNNN` order numbers from a per-year sequence.

mod builder;
mod error;
mod numbering;
mod sequence;
mod types;
mod validation;

pub use builder::*;
pub use error::*;
pub use numbering::*;
pub use sequence::*;
pub use types::*;
pub use validation::*;
