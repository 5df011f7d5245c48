use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::{PcaError, StoreError};
use super::sequence::SequenceStore;

/// Largest sequence that fits the 4-digit counter part of an order number.
pub const MAX_SEQUENCE: u64 = 9999;

/// How the allocator obtains numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Increment the per-year counter in the sequence store.
    Persistent,
    /// Never touch the store; issue random numbers (preview/demo setups).
    Demo,
}

/// What to do once a year's counter passes [`MAX_SEQUENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail the allocation. Keeps every number at 8 characters.
    Reject,
    /// Let the counter widen the number, e.g. "202410000".
    Widen,
}

/// Configuration for [`OrderNumberAllocator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    pub mode: AllocationMode,
    pub overflow: OverflowPolicy,
    /// Issue a random number instead of failing when the store is
    /// unreachable ([`StoreError::Unavailable`]). Other store errors always fail.
    pub fallback_on_store_error: bool,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            mode: AllocationMode::Persistent,
            overflow: OverflowPolicy::Reject,
            fallback_on_store_error: true,
        }
    }
}

/// Builder for [`AllocatorConfig`].
///
/// ```
/// use pca_export::core::{AllocatorConfigBuilder, OverflowPolicy};
///
/// let config = AllocatorConfigBuilder::new()
///     .overflow(OverflowPolicy::Widen)
///     .fallback_on_store_error(false)
///     .build();
/// assert!(!config.fallback_on_store_error);
/// ```
#[derive(Default)]
pub struct AllocatorConfigBuilder {
    config: AllocatorConfig,
}

impl AllocatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: AllocationMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Shorthand for [`AllocationMode::Demo`].
    pub fn demo(self) -> Self {
        self.mode(AllocationMode::Demo)
    }

    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow = policy;
        self
    }

    pub fn fallback_on_store_error(mut self, enabled: bool) -> Self {
        self.config.fallback_on_store_error = enabled;
        self
    }

    pub fn build(self) -> AllocatorConfig {
        self.config
    }
}

/// Where an order number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberSource {
    /// Issued from the store counter; unique within its year.
    Sequence,
    /// Random, because the store failed. Uniqueness is not guaranteed.
    Fallback,
    /// Random, because the allocator runs in demo mode.
    Demo,
}

/// An allocated order number such as "20240007".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber {
    value: String,
    year: i32,
    sequence: u64,
    source: NumberSource,
}

impl OrderNumber {
    fn new(year: i32, sequence: u64, source: NumberSource) -> Self {
        Self {
            value: format_order_number(year, sequence),
            year,
            sequence,
            source,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The counter part, without the year.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn source(&self) -> NumberSource {
        self.source
    }

    /// True when the number came from the store counter.
    pub fn is_sequenced(&self) -> bool {
        self.source == NumberSource::Sequence
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl FromStr for OrderNumber {
    type Err = PcaError;

    /// Parse "YYYYNNNN" (or a widened "YYYYNNNNN…") back into its parts.
    /// The source of a parsed number is always [`NumberSource::Sequence`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PcaError::Numbering(format!(
                "'{s}' is not an order number (expected at least 8 digits)"
            )));
        }
        let (year, sequence) = s.split_at(4);
        let year: i32 = year
            .parse()
            .map_err(|e| PcaError::Numbering(format!("invalid year in '{s}': {e}")))?;
        let sequence: u64 = sequence
            .parse()
            .map_err(|e| PcaError::Numbering(format!("invalid sequence in '{s}': {e}")))?;
        if format_order_number(year, sequence) != s {
            return Err(PcaError::Numbering(format!(
                "'{s}' is not in canonical YYYYNNNN form"
            )));
        }
        Ok(Self {
            value: s.to_string(),
            year,
            sequence,
            source: NumberSource::Sequence,
        })
    }
}

/// Format a year and counter as an order number: 4-digit year followed by
/// the counter zero-padded to 4 digits (wider counters are not cut).
pub fn format_order_number(year: i32, sequence: u64) -> String {
    format!("{year:04}{sequence:04}")
}

/// Hands out order numbers of the form `YYYYNNNN` from a [`SequenceStore`].
///
/// When the store is unreachable, the allocator degrades to a random counter (see
/// [`AllocatorConfig::fallback_on_store_error`]) and marks the result
/// [`NumberSource::Fallback`]. Safe to share between threads.
pub struct OrderNumberAllocator<S> {
    store: S,
    config: AllocatorConfig,
    rng: Mutex<StdRng>,
}

impl<S: SequenceStore> OrderNumberAllocator<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AllocatorConfig::default())
    }

    pub fn with_config(store: S, config: AllocatorConfig) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seed the random source used in demo and fallback mode.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate the next order number for `year`.
    pub fn allocate(&self, year: i32) -> Result<OrderNumber, PcaError> {
        if !(0..=9999).contains(&year) {
            return Err(PcaError::Numbering(format!(
                "year {year} does not fit the 4-digit year of an order number"
            )));
        }

        if self.config.mode == AllocationMode::Demo {
            return Ok(self.random_number(year, NumberSource::Demo));
        }

        let issued = match self.config.overflow {
            OverflowPolicy::Reject => self.store.increment_within(year, MAX_SEQUENCE),
            OverflowPolicy::Widen => self.store.increment(year).map(Some),
        };

        match issued {
            Ok(Some(sequence)) => {
                let number = OrderNumber::new(year, sequence, NumberSource::Sequence);
                tracing::debug!(year, sequence, order_no = %number, "allocated order number");
                Ok(number)
            }
            Ok(None) => Err(PcaError::Numbering(format!(
                "order numbers for {year} exhausted: counter is at the limit of {MAX_SEQUENCE}"
            ))),
            // Backend and corrupt-counter errors always reach the caller.
            Err(err @ StoreError::Unavailable(_)) if self.config.fallback_on_store_error => {
                let number = self.random_number(year, NumberSource::Fallback);
                tracing::warn!(
                    year,
                    error = %err,
                    order_no = %number,
                    "sequence store unavailable, issued non-unique fallback order number"
                );
                Ok(number)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Allocate for the fiscal year containing `date`.
    pub fn allocate_for(&self, date: NaiveDate) -> Result<OrderNumber, PcaError> {
        self.allocate(date.year())
    }

    /// Allocate for the current local calendar year.
    pub fn allocate_current(&self) -> Result<OrderNumber, PcaError> {
        self.allocate(chrono::Local::now().year())
    }

    fn random_number(&self, year: i32, source: NumberSource) -> OrderNumber {
        let sequence = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(1..=MAX_SEQUENCE)
        };
        OrderNumber::new(year, sequence, source)
    }
}
