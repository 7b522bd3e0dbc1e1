//! DistributedSnapshot - point-in-time view of distributed transaction state
//!
//! A snapshot is built by the coordinator and handed to every worker that
//! takes part in the statement. It describes:
//! - the coordinator lifetime (`timestamp`) whose ids it talks about
//! - the global low-water mark `xmin_all`
//! - the active window `[xmin, xmax]`
//! - the distributed transactions still in progress inside that window
//!
//! Capacity (`max_count`) is tracked apart from the in-progress count so the
//! backing array can be reused across statements without reallocating.

use crate::ids::{DistributedSnapshotId, DistributedTransactionId, DistributedTransactionTimeStamp};

use super::errors::{SnapshotError, SnapshotResult};

/// Largest capacity representable on the wire (`maxCount` is a signed 32-bit field).
pub const MAX_IN_PROGRESS_CAPACITY: u32 = i32::MAX as u32;

/// A distributed snapshot.
///
/// Invariants (checked by [`DistributedSnapshot::validate`]):
/// - `count <= max_count`
/// - `xmin >= xmin_all`
/// - every in-progress id lies in `[xmin, xmax]`
/// - in-progress ids are strictly ascending
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DistributedSnapshot {
    pub(crate) timestamp: DistributedTransactionTimeStamp,
    pub(crate) id: DistributedSnapshotId,
    pub(crate) xmin_all: DistributedTransactionId,
    pub(crate) xmin: DistributedTransactionId,
    pub(crate) xmax: DistributedTransactionId,
    /// Capacity of the in-progress array. Zero means no array is allocated.
    pub(crate) max_count: u32,
    /// Exactly `count` ids; capacity reserved up to `max_count`.
    pub(crate) in_progress: Vec<DistributedTransactionId>,
}

/// Clones keep the full `max_count` reservation so the copy can be reused
/// without reallocating. Use [`DistributedSnapshot::try_clone`] where
/// allocation failure must surface as an error.
impl Clone for DistributedSnapshot {
    fn clone(&self) -> Self {
        let mut in_progress = Vec::with_capacity(self.max_count as usize);
        in_progress.extend_from_slice(&self.in_progress);
        Self {
            timestamp: self.timestamp,
            id: self.id,
            xmin_all: self.xmin_all,
            xmin: self.xmin,
            xmax: self.xmax,
            max_count: self.max_count,
            in_progress,
        }
    }
}

impl DistributedSnapshot {
    /// Builds a fully populated snapshot, the way the coordinator does.
    pub fn new(
        timestamp: DistributedTransactionTimeStamp,
        id: DistributedSnapshotId,
        xmin_all: DistributedTransactionId,
        xmin: DistributedTransactionId,
        xmax: DistributedTransactionId,
        in_progress: Vec<DistributedTransactionId>,
        max_count: u32,
    ) -> SnapshotResult<Self> {
        if max_count > MAX_IN_PROGRESS_CAPACITY || in_progress.len() > max_count as usize {
            return Err(SnapshotError::invalid_counts(
                "Invalid distributed snapshot",
                i64::from(max_count),
                in_progress.len() as i64,
            ));
        }

        let mut in_progress = in_progress;
        let additional = max_count as usize - in_progress.len();
        in_progress
            .try_reserve_exact(additional)
            .map_err(|e| SnapshotError::out_of_memory(max_count, e))?;

        let snapshot = Self {
            timestamp,
            id,
            xmin_all,
            xmin,
            xmax,
            max_count,
            in_progress,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// An empty snapshot that already owns an array of `max_count` entries.
    pub fn with_capacity(max_count: u32) -> SnapshotResult<Self> {
        let mut snapshot = Self::default();
        if max_count > MAX_IN_PROGRESS_CAPACITY {
            return Err(SnapshotError::invalid_counts(
                "Invalid distributed snapshot capacity",
                i64::from(max_count),
                0,
            ));
        }
        if max_count > 0 {
            snapshot.allocate_in_progress(max_count)?;
        }
        Ok(snapshot)
    }

    /// Fallible clone; the copy owns its own array of `max_count` entries.
    pub fn try_clone(&self) -> SnapshotResult<Self> {
        let mut copy = Self::default();
        if self.max_count > 0 {
            copy.allocate_in_progress(self.max_count)?;
        }
        copy.timestamp = self.timestamp;
        copy.id = self.id;
        copy.xmin_all = self.xmin_all;
        copy.xmin = self.xmin;
        copy.xmax = self.xmax;
        copy.in_progress.extend_from_slice(&self.in_progress);
        Ok(copy)
    }

    /// Replaces the backing array with a fresh one of `max_count` entries.
    pub(crate) fn allocate_in_progress(&mut self, max_count: u32) -> SnapshotResult<()> {
        let mut array = Vec::new();
        array
            .try_reserve_exact(max_count as usize)
            .map_err(|e| SnapshotError::out_of_memory(max_count, e))?;
        self.in_progress = array;
        self.max_count = max_count;
        Ok(())
    }

    /// Checks every structural invariant of the snapshot.
    pub fn validate(&self) -> SnapshotResult<()> {
        if self.in_progress.len() > self.max_count as usize {
            return Err(SnapshotError::invalid_counts(
                "Invalid distributed snapshot",
                i64::from(self.max_count),
                self.in_progress.len() as i64,
            ));
        }
        if self.xmin < self.xmin_all {
            return Err(SnapshotError::corrupt(format!(
                "xmin {} precedes xminAllDistributedSnapshots {}",
                self.xmin, self.xmin_all
            )));
        }
        if let Some(pair) = self.in_progress.windows(2).find(|w| w[0] >= w[1]) {
            return Err(SnapshotError::corrupt(format!(
                "in-progress array not strictly ascending at {} -> {}",
                pair[0], pair[1]
            )));
        }
        if let Some(xid) = self
            .in_progress
            .iter()
            .find(|xid| **xid < self.xmin || **xid > self.xmax)
        {
            return Err(SnapshotError::corrupt(format!(
                "in-progress xid {} outside [{}, {}]",
                xid, self.xmin, self.xmax
            )));
        }
        Ok(())
    }

    pub fn timestamp(&self) -> DistributedTransactionTimeStamp {
        self.timestamp
    }

    pub fn id(&self) -> DistributedSnapshotId {
        self.id
    }

    /// Global low-water mark: ids below it are finished everywhere.
    pub fn xmin_all(&self) -> DistributedTransactionId {
        self.xmin_all
    }

    pub fn xmin(&self) -> DistributedTransactionId {
        self.xmin
    }

    /// The committing transaction of the snapshot owner; inclusive bound.
    pub fn xmax(&self) -> DistributedTransactionId {
        self.xmax
    }

    pub fn count(&self) -> u32 {
        self.in_progress.len() as u32
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn in_progress(&self) -> &[DistributedTransactionId] {
        &self.in_progress
    }

    pub fn has_backing_array(&self) -> bool {
        self.max_count > 0
    }

    /// Membership test over the sorted in-progress ids.
    pub fn is_in_progress(&self, xid: DistributedTransactionId) -> bool {
        self.in_progress.binary_search(&xid).is_ok()
    }
}
