use std::collections::BTreeMap;
use std::sync::Mutex;

use super::error::StoreError;

/// Persisted per-fiscal-year counters backing order numbers.
///
/// Implementations must make [`increment`](Self::increment) atomic: two
/// concurrent calls for the same year never return the same value.
pub trait SequenceStore: Send + Sync {
    /// Create the counter for `year` with value 1, or increment it by one,
    /// and return the new value.
    fn increment(&self, year: i32) -> Result<u64, StoreError>;

    /// Last issued value for `year`, if the counter exists.
    fn current(&self, year: i32) -> Result<Option<u64>, StoreError>;

    /// Like [`increment`](Self::increment), but leave the counter untouched
    /// and return `None` when the new value would exceed `max`.
    ///
    /// The default reads before it writes, so two callers racing at the
    /// limit may still consume one value past it. Stores that can check and
    /// increment in one step should override it.
    fn increment_within(&self, year: i32, max: u64) -> Result<Option<u64>, StoreError> {
        if self.current(year)?.is_some_and(|last| last >= max) {
            return Ok(None);
        }
        let next = self.increment(year)?;
        Ok((next <= max).then_some(next))
    }
}

impl<S: SequenceStore + ?Sized> SequenceStore for std::sync::Arc<S> {
    fn increment(&self, year: i32) -> Result<u64, StoreError> {
        (**self).increment(year)
    }

    fn current(&self, year: i32) -> Result<Option<u64>, StoreError> {
        (**self).current(year)
    }

    fn increment_within(&self, year: i32, max: u64) -> Result<Option<u64>, StoreError> {
        (**self).increment_within(year, max)
    }
}

/// Process-local store, one mutex over all years.
#[derive(Debug, Default)]
pub struct InMemorySequenceStore {
    counters: Mutex<BTreeMap<i32, u64>>,
}

impl InMemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a counter, e.g. to continue a sequence loaded from elsewhere.
    pub fn with_counter(self, year: i32, last_number: u64) -> Self {
        if let Ok(mut counters) = self.counters.lock() {
            counters.insert(year, last_number);
        }
        self
    }
}

impl SequenceStore for InMemorySequenceStore {
    fn increment(&self, year: i32) -> Result<u64, StoreError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let next = counters.get(&year).map_or(1, |last| last + 1);
        counters.insert(year, next);
        Ok(next)
    }

    fn increment_within(&self, year: i32, max: u64) -> Result<Option<u64>, StoreError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let next = counters.get(&year).map_or(1, |last| last + 1);
        if next > max {
            return Ok(None);
        }
        counters.insert(year, next);
        Ok(Some(next))
    }

    fn current(&self, year: i32) -> Result<Option<u64>, StoreError> {
        let counters = self
            .counters
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(counters.get(&year).copied())
    }
}
