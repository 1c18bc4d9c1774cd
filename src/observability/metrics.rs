//! Pruning metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free (relaxed atomics)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all pruning counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Single-table extractions attempted
    extractions: AtomicU64,
    /// Extractions that produced a pruned tree
    pruned: AtomicU64,
    /// Extractions that fell back to broadcast
    broadcast: AtomicU64,
    /// Between ranges expanded into partitions
    between_ranges: AtomicU64,
    /// Between ranges abandoned at the partition ceiling
    between_overflows: AtomicU64,
    /// Successful merges
    merges: AtomicU64,
    /// Failed merges
    merge_failures: AtomicU64,
    /// Execution-time resolutions
    resolutions: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one extraction
    pub fn record_extraction(&self, pruned: bool) {
        self.extractions.fetch_add(1, Ordering::Relaxed);
        if pruned {
            self.pruned.fetch_add(1, Ordering::Relaxed);
        } else {
            self.broadcast.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment between ranges expanded
    pub fn increment_between_ranges(&self) {
        self.between_ranges.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment between overflows
    pub fn increment_between_overflows(&self) {
        self.between_overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one merge
    pub fn record_merge(&self, merged: bool) {
        if merged {
            self.merges.fetch_add(1, Ordering::Relaxed);
        } else {
            self.merge_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment execution-time resolutions
    pub fn increment_resolutions(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            extractions: self.extractions.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            broadcast: self.broadcast.load(Ordering::Relaxed),
            between_ranges: self.between_ranges.load(Ordering::Relaxed),
            between_overflows: self.between_overflows.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            merge_failures: self.merge_failures.load(Ordering::Relaxed),
            resolutions: self.resolutions.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub extractions: u64,
    pub pruned: u64,
    pub broadcast: u64,
    pub between_ranges: u64,
    pub between_overflows: u64,
    pub merges: u64,
    pub merge_failures: u64,
    pub resolutions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();

        assert_eq!(snapshot.extractions, 0);
        assert_eq!(snapshot.between_overflows, 0);
        assert_eq!(snapshot.merges, 0);
    }

    #[test]
    fn test_extraction_outcomes() {
        let registry = MetricsRegistry::new();

        registry.record_extraction(true);
        registry.record_extraction(false);
        registry.record_extraction(true);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.extractions, 3);
        assert_eq!(snapshot.pruned, 2);
        assert_eq!(snapshot.broadcast, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.record_merge(false);
        registry.increment_between_overflows();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["merge_failures"], 1);
        assert_eq!(json["between_overflows"], 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_resolutions();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().resolutions, 800);
    }
}
