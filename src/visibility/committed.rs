//! Committed test - classifies a locally committed transaction against a
//! distributed snapshot
//!
//! The caller has already established that the local transaction committed.
//! What remains is whether its DISTRIBUTED transaction had committed when
//! the snapshot was taken. Order of checks:
//!
//! 1. Non-normal local ids are never distributed: IGNORE
//! 2. Mapping cache hit: IN_PROGRESS
//! 3. Resolve the distributed identity (commit cache, then distributed log).
//!    Local-only or another coordinator lifetime: IGNORE
//! 4. Below the cluster-wide horizon `xmin_all`: IGNORE
//! 5. Prune checks stop here: IN_PROGRESS
//! 6. Below `xmin`: VISIBLE; above `xmax`: IN_PROGRESS
//! 7. In the in-progress array: IN_PROGRESS (and remembered); else VISIBLE

use std::fmt;

use crate::commit_log::{CommitResolver, DistributedLog, LocalCommitCache, Resolution};
use crate::ids::LocalTransactionId;
use crate::observability::{log_event_at, DebugSwitches, Event, Logger, VisibilityMetrics};
use crate::snapshot::{DistributedSnapshotWithLocalMapping, FastPath};

/// Outcome of the committed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedStatus {
    /// Its distributed transaction was still running for the snapshot
    InProgress,
    /// Distributed visibility has no opinion; local rules decide
    Ignore,
    /// Committed before the snapshot was taken
    Visible,
}

impl CommittedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommittedStatus::InProgress => "IN_PROGRESS",
            CommittedStatus::Ignore => "IGNORE",
            CommittedStatus::Visible => "VISIBLE",
        }
    }
}

impl fmt::Display for CommittedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runs the committed test for one backend.
///
/// Holds the commit-log collaborators; the snapshot is passed per call
/// because its mapping cache is updated as a side effect.
pub struct CommittedEvaluator<'a, L: ?Sized, C: ?Sized> {
    resolver: CommitResolver<'a, L, C>,
}

impl<'a, L, C> CommittedEvaluator<'a, L, C>
where
    L: DistributedLog + ?Sized,
    C: LocalCommitCache + ?Sized,
{
    pub fn new(log: &'a L, cache: &'a mut C, metrics: &'a VisibilityMetrics) -> Self {
        Self {
            resolver: CommitResolver::new(log, cache, metrics),
        }
    }

    pub fn metrics(&self) -> &VisibilityMetrics {
        self.resolver.metrics()
    }

    /// Classifies the committed `local_xid` against `dslm`.
    ///
    /// With `is_prune_check` set, any distributed transaction at or above
    /// the horizon is reported IN_PROGRESS without consulting the snapshot
    /// range, which is the conservative answer pruning needs.
    pub fn committed_test(
        &mut self,
        dslm: &mut DistributedSnapshotWithLocalMapping,
        local_xid: LocalTransactionId,
        is_prune_check: bool,
    ) -> CommittedStatus {
        if !local_xid.is_normal() {
            return CommittedStatus::Ignore;
        }

        if dslm.try_fast_path(local_xid) == FastPath::InProgress {
            self.metrics().increment_fast_path_hits();
            return CommittedStatus::InProgress;
        }

        let snapshot = dslm.snapshot();
        let distrib_xid = match self.resolver.resolve(local_xid, snapshot.timestamp()) {
            Resolution::Distributed(dxid) => dxid,
            Resolution::LocalOnly | Resolution::OtherEpoch { .. } => {
                return CommittedStatus::Ignore;
            }
        };

        if distrib_xid < snapshot.xmin_all() {
            return CommittedStatus::Ignore;
        }

        if is_prune_check {
            return CommittedStatus::InProgress;
        }

        if distrib_xid < snapshot.xmin() {
            return CommittedStatus::Visible;
        }

        if distrib_xid > snapshot.xmax() {
            let severity = DebugSwitches::snapshot_severity(Event::CommittedButInvisible.default_severity());
            if Logger::enabled(severity) {
                log_event_at(
                    severity,
                    Event::CommittedButInvisible,
                    &[
                        ("distrib_snapshot_id", snapshot.id().to_string().as_str()),
                        ("distrib_xid", distrib_xid.to_string().as_str()),
                        ("dxmax", snapshot.xmax().to_string().as_str()),
                        ("dxmin", snapshot.xmin().to_string().as_str()),
                        ("local_xid", local_xid.to_string().as_str()),
                    ],
                );
            }
            return CommittedStatus::InProgress;
        }

        if snapshot.is_in_progress(distrib_xid) {
            if dslm.record(local_xid) {
                self.metrics().increment_mapping_records();
            } else {
                self.metrics().increment_mapping_overflows();
            }
            return CommittedStatus::InProgress;
        }

        CommittedStatus::Visible
    }
}
