//! Policy gate for pruning
//!
//! Answers: could some distributed snapshot somewhere in the cluster still
//! need this committed local transaction's row versions? `true` means "not
//! provably dead", so the caller must keep them.
//!
//! The active snapshot is held by an explicit [`VisibilityContext`] rather
//! than process-global state.

use crate::commit_log::{DistributedLog, LocalCommitCache};
use crate::config::{OperatingMode, Role};
use crate::ids::LocalTransactionId;
use crate::observability::{log_event, Event};
use crate::snapshot::DistributedSnapshotWithLocalMapping;

use super::committed::{CommittedEvaluator, CommittedStatus};
use super::errors::{VisibilityError, VisibilityResult};

/// The snapshot the current statement runs under.
#[derive(Debug, Clone)]
pub struct ActiveSnapshot {
    distributed: Option<DistributedSnapshotWithLocalMapping>,
}

impl ActiveSnapshot {
    /// A snapshot with no distributed component.
    pub fn local_only() -> Self {
        Self { distributed: None }
    }

    pub fn distributed(dslm: DistributedSnapshotWithLocalMapping) -> Self {
        Self {
            distributed: Some(dslm),
        }
    }

    pub fn has_distributed(&self) -> bool {
        self.distributed.is_some()
    }

    pub fn distributed_snapshot(&self) -> Option<&DistributedSnapshotWithLocalMapping> {
        self.distributed.as_ref()
    }

    pub fn distributed_snapshot_mut(&mut self) -> Option<&mut DistributedSnapshotWithLocalMapping> {
        self.distributed.as_mut()
    }
}

/// Per-backend visibility state.
#[derive(Debug, Clone, Default)]
pub struct VisibilityContext {
    mode: OperatingMode,
    active: Option<ActiveSnapshot>,
}

impl VisibilityContext {
    pub fn new(mode: OperatingMode) -> Self {
        Self { mode, active: None }
    }

    pub fn mode(&self) -> &OperatingMode {
        &self.mode
    }

    pub fn set_active_snapshot(&mut self, snapshot: ActiveSnapshot) {
        self.active = Some(snapshot);
    }

    /// Clears the active snapshot, returning it so its storage can be reused.
    pub fn take_active_snapshot(&mut self) -> Option<ActiveSnapshot> {
        self.active.take()
    }

    pub fn active_snapshot(&self) -> Option<&ActiveSnapshot> {
        self.active.as_ref()
    }

    /// Returns true when `local_xid` cannot be proven dead for every
    /// distributed snapshot in the cluster.
    pub fn local_xid_satisfies_any_distributed_snapshot<L, C>(
        &mut self,
        local_xid: LocalTransactionId,
        evaluator: &mut CommittedEvaluator<'_, L, C>,
    ) -> VisibilityResult<bool>
    where
        L: DistributedLog + ?Sized,
        C: LocalCommitCache + ?Sized,
    {
        if !local_xid.is_normal() {
            return Ok(false);
        }

        // Single-process startup has no distributed snapshots to protect.
        if !self.mode.under_postmaster || !self.mode.normal_processing {
            return Ok(false);
        }

        if self.mode.binary_upgrade {
            return Ok(false);
        }

        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return Ok(true),
        };

        if let Some(dslm) = active.distributed_snapshot_mut() {
            return match evaluator.committed_test(dslm, local_xid, true) {
                CommittedStatus::InProgress => Ok(true),
                CommittedStatus::Ignore => Ok(false),
                result => {
                    log_event(
                        Event::UnreachableCommittedResult,
                        &[
                            ("local_xid", local_xid.to_string().as_str()),
                            ("result", result.as_str()),
                        ],
                    );
                    Err(VisibilityError::UnreachableResult { local_xid, result })
                }
            };
        }

        if self.mode.role == Role::Utility && self.mode.database_is_bootstrap_only {
            return Ok(false);
        }

        Ok(true)
    }
}
