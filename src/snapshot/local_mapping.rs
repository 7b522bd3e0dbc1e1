//! Local mapping cache - snapshot-scoped memo of in-progress local ids
//!
//! A scan keeps meeting the same inserting or deleting transaction on many
//! tuples. Once a local id has been proven to map to a distributed
//! transaction that is in progress for this snapshot, remembering it here
//! lets the next lookup skip the commit log entirely.
//!
//! - Valid ONLY for the snapshot it wraps; never carried to another one
//! - Bounded; when full, new ids are silently not recorded
//! - Only positive answers are cached, so a miss proves nothing

use crate::ids::LocalTransactionId;

use super::distributed::DistributedSnapshot;

/// Outcome of a fast-path lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastPath {
    /// The id was already proven to be in progress for this snapshot
    InProgress,
    /// Not cached; the caller must take the slow path
    Unknown,
}

/// A distributed snapshot plus the local ids already mapped to its
/// in-progress set.
#[derive(Debug, Clone)]
pub struct DistributedSnapshotWithLocalMapping {
    snapshot: DistributedSnapshot,
    cached_local_xids: Vec<LocalTransactionId>,
    max_local_count: usize,
    /// True minimum of `cached_local_xids`; INVALID while empty.
    min_cached_local_xid: LocalTransactionId,
    /// True maximum of `cached_local_xids`; INVALID while empty.
    max_cached_local_xid: LocalTransactionId,
}

impl DistributedSnapshotWithLocalMapping {
    /// Wraps `snapshot` with a mapping cache holding at most `max_local_count` ids.
    pub fn new(snapshot: DistributedSnapshot, max_local_count: usize) -> Self {
        Self {
            snapshot,
            cached_local_xids: Vec::new(),
            max_local_count,
            min_cached_local_xid: LocalTransactionId::INVALID,
            max_cached_local_xid: LocalTransactionId::INVALID,
        }
    }

    /// Sizes the mapping cache after the snapshot's own capacity.
    pub fn sized_to_snapshot(snapshot: DistributedSnapshot) -> Self {
        let max_local_count = snapshot.max_count() as usize;
        Self::new(snapshot, max_local_count)
    }

    pub fn snapshot(&self) -> &DistributedSnapshot {
        &self.snapshot
    }

    /// Drops the cache and hands back the snapshot storage for reuse.
    pub fn into_snapshot(self) -> DistributedSnapshot {
        self.snapshot
    }

    pub fn cached_count(&self) -> usize {
        self.cached_local_xids.len()
    }

    pub fn max_local_count(&self) -> usize {
        self.max_local_count
    }

    pub fn is_full(&self) -> bool {
        self.cached_local_xids.len() >= self.max_local_count
    }

    pub fn min_cached_local_xid(&self) -> Option<LocalTransactionId> {
        self.min_cached_local_xid
            .is_valid()
            .then_some(self.min_cached_local_xid)
    }

    pub fn max_cached_local_xid(&self) -> Option<LocalTransactionId> {
        self.max_cached_local_xid
            .is_valid()
            .then_some(self.max_cached_local_xid)
    }

    /// Looks the id up. Bounds are checked first so most misses cost O(1).
    pub fn try_fast_path(&self, local_xid: LocalTransactionId) -> FastPath {
        if self.cached_local_xids.is_empty() {
            return FastPath::Unknown;
        }

        if local_xid == self.min_cached_local_xid || local_xid == self.max_cached_local_xid {
            return FastPath::InProgress;
        }

        if local_xid.follows(self.min_cached_local_xid)
            && local_xid.precedes(self.max_cached_local_xid)
            && self.cached_local_xids.contains(&local_xid)
        {
            return FastPath::InProgress;
        }

        FastPath::Unknown
    }

    /// Remembers that `local_xid` maps to an in-progress distributed
    /// transaction. Returns false when the cache is full (or the id is not
    /// a normal one) and nothing was recorded.
    pub fn record(&mut self, local_xid: LocalTransactionId) -> bool {
        if !local_xid.is_normal() || self.is_full() {
            return false;
        }

        self.cached_local_xids.push(local_xid);

        if !self.min_cached_local_xid.is_valid() || local_xid.precedes(self.min_cached_local_xid) {
            self.min_cached_local_xid = local_xid;
        }
        if !self.max_cached_local_xid.is_valid() || local_xid.follows(self.max_cached_local_xid) {
            self.max_cached_local_xid = local_xid;
        }
        true
    }
}
