//! Visibility counters
//!
//! - Counters only, monotonic
//! - Passive: nothing reads them to make a decision
//! - Relaxed atomics; exactness across threads is not required

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct VisibilityMetrics {
    /// Answered by the snapshot's local mapping cache
    fast_path_hits: AtomicU64,
    /// Answered by the process-local commit cache
    local_cache_hits: AtomicU64,
    /// Process-local commit cache misses
    local_cache_misses: AtomicU64,
    /// Reads of the persistent distributed log
    distributed_log_lookups: AtomicU64,
    /// Committed transactions that never joined a distributed transaction
    local_only_commits: AtomicU64,
    /// Commit records from another coordinator lifetime
    epoch_mismatches: AtomicU64,
    /// Local ids recorded into a snapshot's mapping cache
    mapping_records: AtomicU64,
    /// Local ids dropped because the mapping cache was full
    mapping_overflows: AtomicU64,
}

impl VisibilityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_fast_path_hits(&self) {
        self.fast_path_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_local_cache_hits(&self) {
        self.local_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_local_cache_misses(&self) {
        self.local_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_distributed_log_lookups(&self) {
        self.distributed_log_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_local_only_commits(&self) {
        self.local_only_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_epoch_mismatches(&self) {
        self.epoch_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mapping_records(&self) {
        self.mapping_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mapping_overflows(&self) {
        self.mapping_overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn distributed_log_lookups(&self) -> u64 {
        self.distributed_log_lookups.load(Ordering::Relaxed)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            local_cache_hits: self.local_cache_hits.load(Ordering::Relaxed),
            local_cache_misses: self.local_cache_misses.load(Ordering::Relaxed),
            distributed_log_lookups: self.distributed_log_lookups.load(Ordering::Relaxed),
            local_only_commits: self.local_only_commits.load(Ordering::Relaxed),
            epoch_mismatches: self.epoch_mismatches.load(Ordering::Relaxed),
            mapping_records: self.mapping_records.load(Ordering::Relaxed),
            mapping_overflows: self.mapping_overflows.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub fast_path_hits: u64,
    pub local_cache_hits: u64,
    pub local_cache_misses: u64,
    pub distributed_log_lookups: u64,
    pub local_only_commits: u64,
    pub epoch_mismatches: u64,
    pub mapping_records: u64,
    pub mapping_overflows: u64,
}
