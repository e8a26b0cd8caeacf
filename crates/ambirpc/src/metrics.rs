//! # Method Metrics
//!
//! One set of counters and histograms per (caller, component, method)
//! triple, interned for the life of the process and updated lock-free by
//! however many calls are in flight.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;

use dashmap::DashMap;

/// A monotonically increasing counter.
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Adds `n` to the counter.
    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    /// Current value.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

const BUCKET_COUNT: usize = 40;

/// A histogram over power-of-two buckets.
///
/// Bucket 0 counts zero; bucket `i` counts values in `[2^(i-1), 2^i)`, with
/// the last bucket absorbing everything larger. Observations touch only
/// atomics, so concurrent recorders never block.
pub struct Histogram {
    buckets: [AtomicU64; BUCKET_COUNT],
    count: AtomicU64,
    sum: AtomicU64,
}

impl Histogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self {
            buckets: [const { AtomicU64::new(0) }; BUCKET_COUNT],
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
        }
    }

    /// Records one observation.
    pub fn put(&self, v: u64) {
        let idx = if v == 0 {
            0
        } else {
            (64 - v.leading_zeros() as usize).min(BUCKET_COUNT - 1)
        };
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(v, Ordering::Relaxed);
    }

    /// Number of observations recorded.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of all observations.
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    /// Occupancy of bucket `i`.
    pub fn bucket(&self, i: usize) -> u64 {
        self.buckets[i].load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// The identity of one metered method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodLabels {
    /// The calling component's identity.
    pub caller: String,
    /// Fully-qualified component name.
    pub component: String,
    /// Method name.
    pub method: String,
}

/// Everything recorded about one method as seen from one caller.
pub struct MethodMetrics {
    /// Calls started.
    pub calls: Counter,
    /// Calls that returned any failure.
    pub errors: Counter,
    /// Call latency in microseconds, recorded on every exit path.
    pub latency_us: Histogram,
    /// Encoded argument payload sizes in bytes.
    pub request_bytes: Histogram,
    /// Reply payload sizes in bytes.
    pub reply_bytes: Histogram,
}

impl MethodMetrics {
    fn new() -> Self {
        Self {
            calls: Counter::new(),
            errors: Counter::new(),
            latency_us: Histogram::new(),
            request_bytes: Histogram::new(),
            reply_bytes: Histogram::new(),
        }
    }
}

static REGISTRY: OnceLock<DashMap<MethodLabels, Arc<MethodMetrics>>> = OnceLock::new();

/// Returns the metrics set for the given labels, creating it on first use.
///
/// The same labels always yield the same set; sets are never removed or
/// reset for the life of the process.
pub fn method_metrics(labels: MethodLabels) -> Arc<MethodMetrics> {
    let registry = REGISTRY.get_or_init(DashMap::new);
    registry
        .entry(labels)
        .or_insert_with(|| Arc::new(MethodMetrics::new()))
        .value()
        .clone()
}
