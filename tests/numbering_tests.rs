#![cfg(feature = "core")]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use chrono::NaiveDate;
use pca_export::core::*;

/// Fails the first `failures` increments, then delegates.
struct FlakyStore {
    inner: InMemorySequenceStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    fn new(failures: usize) -> Self {
        Self {
            inner: InMemorySequenceStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl SequenceStore for FlakyStore {
    fn increment(&self, year: i32) -> Result<u64, StoreError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("network unreachable".into()));
        }
        self.inner.increment(year)
    }

    fn current(&self, year: i32) -> Result<Option<u64>, StoreError> {
        self.inner.current(year)
    }
}

/// Reachable, but every call fails with the error built by `make`.
struct FailingStore {
    make: fn() -> StoreError,
}

impl SequenceStore for FailingStore {
    fn increment(&self, _year: i32) -> Result<u64, StoreError> {
        Err((self.make)())
    }

    fn current(&self, _year: i32) -> Result<Option<u64>, StoreError> {
        Err((self.make)())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[test]
fn first_two_numbers_of_a_year() {
    let alloc = OrderNumberAllocator::new(InMemorySequenceStore::new());
    let first = alloc.allocate(2024).unwrap();
    let second = alloc.allocate(2024).unwrap();
    assert_eq!(first.as_str(), "20240001");
    assert_eq!(second.as_str(), "20240002");
    assert!(first.is_sequenced() && second.is_sequenced());
    assert_eq!(alloc.store().current(2024).unwrap(), Some(2));
}

#[test]
fn concurrent_allocations_are_distinct_and_contiguous() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let alloc = OrderNumberAllocator::new(InMemorySequenceStore::new());
    let per_thread: Vec<Vec<OrderNumber>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..PER_THREAD)
                        .map(|_| alloc.allocate(2024).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for numbers in &per_thread {
        assert!(
            numbers.windows(2).all(|w| w[0].sequence() < w[1].sequence()),
            "numbers within one caller must increase"
        );
    }

    let mut sequences: Vec<u64> = per_thread.iter().flatten().map(|n| n.sequence()).collect();
    let unique: HashSet<_> = per_thread.iter().flatten().map(|n| n.as_str().to_string()).collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);

    sequences.sort_unstable();
    let expected: Vec<u64> = (1..=(THREADS * PER_THREAD) as u64).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn allocators_sharing_a_store_share_the_counter() {
    let store = Arc::new(InMemorySequenceStore::new());
    let a = OrderNumberAllocator::new(Arc::clone(&store));
    let b = OrderNumberAllocator::new(Arc::clone(&store));
    assert_eq!(a.allocate(2024).unwrap().as_str(), "20240001");
    assert_eq!(b.allocate(2024).unwrap().as_str(), "20240002");
    assert_eq!(a.allocate(2024).unwrap().as_str(), "20240003");
    assert_eq!(store.current(2024).unwrap(), Some(3));
}

#[test]
fn degraded_mode_then_recovery() {
    init_tracing();
    let alloc = OrderNumberAllocator::new(FlakyStore::new(1)).with_seed(2024);

    let degraded = alloc.allocate(2024).unwrap();
    assert_eq!(degraded.source(), NumberSource::Fallback);
    assert_eq!(degraded.year(), 2024);
    assert_eq!(degraded.as_str().len(), 8);

    // the failed call did not consume a counter value
    let recovered = alloc.allocate(2024).unwrap();
    assert_eq!(recovered.source(), NumberSource::Sequence);
    assert_eq!(recovered.as_str(), "20240001");
}

#[test]
fn fallback_numbers_are_reproducible_with_seed() {
    let a = OrderNumberAllocator::new(FlakyStore::new(3)).with_seed(99);
    let b = OrderNumberAllocator::new(FlakyStore::new(3)).with_seed(99);
    for _ in 0..3 {
        assert_eq!(a.allocate(2024).unwrap(), b.allocate(2024).unwrap());
    }
}

#[test]
fn strict_mode_surfaces_store_errors() {
    let config = AllocatorConfigBuilder::new()
        .fallback_on_store_error(false)
        .build();
    let alloc = OrderNumberAllocator::with_config(FlakyStore::new(1), config);
    let err = alloc.allocate(2024).unwrap_err();
    assert!(matches!(err, PcaError::Store(StoreError::Unavailable(_))));
    assert!(err.to_string().contains("network unreachable"));
    assert_eq!(alloc.allocate(2024).unwrap().as_str(), "20240001");
}

#[test]
fn corrupt_counter_fails_despite_fallback() {
    let store = FailingStore {
        make: || StoreError::Corrupt { year: 2024, value: -5 },
    };
    let alloc = OrderNumberAllocator::new(store).with_seed(3);
    assert!(alloc.config().fallback_on_store_error);
    for _ in 0..2 {
        let err = alloc.allocate(2024).unwrap_err();
        assert!(matches!(
            err,
            PcaError::Store(StoreError::Corrupt { year: 2024, value: -5 })
        ));
    }
}

#[test]
fn backend_error_fails_despite_fallback() {
    let store = FailingStore {
        make: || StoreError::Backend("no such table: order_sequences".into()),
    };
    let config = AllocatorConfigBuilder::new()
        .overflow(OverflowPolicy::Widen)
        .build();
    let alloc = OrderNumberAllocator::with_config(store, config);
    let err = alloc.allocate(2024).unwrap_err();
    assert!(matches!(err, PcaError::Store(StoreError::Backend(_))));
}

#[test]
fn demo_mode_never_touches_store() {
    init_tracing();
    let config = AllocatorConfigBuilder::new().demo().build();
    let alloc = OrderNumberAllocator::with_config(InMemorySequenceStore::new(), config).with_seed(1);
    for _ in 0..20 {
        let n = alloc.allocate(2024).unwrap();
        assert_eq!(n.source(), NumberSource::Demo);
        assert!((1..=MAX_SEQUENCE).contains(&n.sequence()));
        assert!(n.as_str().starts_with("2024"));
    }
    assert_eq!(alloc.store().current(2024).unwrap(), None);
}

#[test]
fn overflow_policy_reject_keeps_eight_characters() {
    let store = InMemorySequenceStore::new().with_counter(2024, 9999);
    let alloc = OrderNumberAllocator::new(store);
    let err = alloc.allocate(2024).unwrap_err();
    assert!(matches!(err, PcaError::Numbering(_)));
    // other years are unaffected
    assert_eq!(alloc.allocate(2025).unwrap().as_str(), "20250001");
}

#[test]
fn rejected_overflow_consumes_no_counter_value() {
    let store = Arc::new(InMemorySequenceStore::new().with_counter(2024, 9999));
    let strict = OrderNumberAllocator::new(Arc::clone(&store));
    for _ in 0..3 {
        assert!(matches!(strict.allocate(2024), Err(PcaError::Numbering(_))));
    }
    assert_eq!(store.current(2024).unwrap(), Some(9999));

    let config = AllocatorConfigBuilder::new()
        .overflow(OverflowPolicy::Widen)
        .build();
    let widening = OrderNumberAllocator::with_config(Arc::clone(&store), config);
    assert_eq!(widening.allocate(2024).unwrap().as_str(), "202410000");
}

#[test]
fn overflow_policy_widen() {
    let store = InMemorySequenceStore::new().with_counter(2024, 9999);
    let config = AllocatorConfigBuilder::new()
        .overflow(OverflowPolicy::Widen)
        .build();
    let alloc = OrderNumberAllocator::with_config(store, config);
    assert_eq!(alloc.allocate(2024).unwrap().as_str(), "202410000");
    assert_eq!(alloc.allocate(2024).unwrap().as_str(), "202410001");
}

#[test]
fn fiscal_year_from_order_date() {
    let alloc = OrderNumberAllocator::new(InMemorySequenceStore::new());
    let dec31 = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert_eq!(alloc.allocate_for(dec31).unwrap().as_str(), "20240001");
    assert_eq!(alloc.allocate_for(jan1).unwrap().as_str(), "20250001");
}

#[test]
fn current_year_allocation_uses_four_digit_year() {
    let alloc = OrderNumberAllocator::new(InMemorySequenceStore::new());
    let n = alloc.allocate_current().unwrap();
    assert_eq!(n.sequence(), 1);
    assert_eq!(n.as_str().len(), 8);
}

#[test]
fn allocated_number_parses_back() {
    let alloc = OrderNumberAllocator::new(InMemorySequenceStore::new().with_counter(2024, 6));
    let n = alloc.allocate(2024).unwrap();
    let parsed: OrderNumber = n.as_str().parse().unwrap();
    assert_eq!(parsed, n);
}
