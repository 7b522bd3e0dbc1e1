//! Resolution of committed local ids to distributed identities
//!
//! Lookup order:
//! 1. Process-local commit cache (keyed by the snapshot's timestamp)
//! 2. Persistent distributed log
//!
//! A log miss for a committed local id means the transaction was
//! local-only; that answer is cached too. A record from another coordinator
//! lifetime is reported but NOT cached.

use crate::ids::{DistributedTransactionId, DistributedTransactionTimeStamp, LocalTransactionId};
use crate::observability::{log_event, Event, Logger, VisibilityMetrics};

use super::distributed_log::DistributedLog;
use super::local_cache::{CachedCommit, LocalCommitCache};

/// What a committed local id means under a given coordinator lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The transaction never joined a distributed transaction
    LocalOnly,
    /// Committed under a different coordinator lifetime
    OtherEpoch {
        timestamp: DistributedTransactionTimeStamp,
    },
    /// Committed as this distributed transaction, in the snapshot's lifetime
    Distributed(DistributedTransactionId),
}

/// Bundles the two commit-log collaborators for one backend.
pub struct CommitResolver<'a, L: ?Sized, C: ?Sized> {
    log: &'a L,
    cache: &'a mut C,
    metrics: &'a VisibilityMetrics,
}

impl<'a, L, C> CommitResolver<'a, L, C>
where
    L: DistributedLog + ?Sized,
    C: LocalCommitCache + ?Sized,
{
    pub fn new(log: &'a L, cache: &'a mut C, metrics: &'a VisibilityMetrics) -> Self {
        Self { log, cache, metrics }
    }

    pub fn metrics(&self) -> &VisibilityMetrics {
        self.metrics
    }

    /// Resolves a committed `local_xid` against the lifetime `snapshot_ts`.
    pub fn resolve(
        &mut self,
        local_xid: LocalTransactionId,
        snapshot_ts: DistributedTransactionTimeStamp,
    ) -> Resolution {
        if let Some(cached) = self.cache.find(local_xid, snapshot_ts) {
            self.metrics.increment_local_cache_hits();
            return match cached {
                CachedCommit::LocalOnly => Resolution::LocalOnly,
                CachedCommit::Distributed(dxid) => Resolution::Distributed(dxid),
            };
        }
        self.metrics.increment_local_cache_misses();
        self.metrics.increment_distributed_log_lookups();

        match self.log.lookup_committed(local_xid) {
            Some(record) if record.timestamp != snapshot_ts => {
                self.metrics.increment_epoch_mismatches();
                if Logger::enabled(Event::EpochMismatch.default_severity()) {
                    log_event(
                        Event::EpochMismatch,
                        &[
                            ("local_xid", local_xid.to_string().as_str()),
                            ("record_timestamp", record.timestamp.to_string().as_str()),
                            ("snapshot_timestamp", snapshot_ts.to_string().as_str()),
                        ],
                    );
                }
                Resolution::OtherEpoch {
                    timestamp: record.timestamp,
                }
            }
            Some(record) => {
                self.cache.add_committed(
                    local_xid,
                    snapshot_ts,
                    CachedCommit::Distributed(record.distributed_xid),
                );
                Resolution::Distributed(record.distributed_xid)
            }
            None => {
                // Committed locally yet unknown to the distributed log.
                self.metrics.increment_local_only_commits();
                self.cache
                    .add_committed(local_xid, snapshot_ts, CachedCommit::LocalOnly);
                if Logger::enabled(Event::LocalOnlyCommitted.default_severity()) {
                    log_event(
                        Event::LocalOnlyCommitted,
                        &[("local_xid", local_xid.to_string().as_str())],
                    );
                }
                Resolution::LocalOnly
            }
        }
    }
}
