//! Process-local commit resolution cache
//!
//! Remembers, for the lifetime of a backend, what the distributed log said
//! about a committed local id, including "it was local-only". Entries are
//! tagged with the coordinator lifetime they were resolved under and only
//! answer lookups made under the same one.
//!
//! Bounded; the oldest entry is evicted first.

use std::collections::{HashMap, VecDeque};

use crate::ids::{DistributedTransactionId, DistributedTransactionTimeStamp, LocalTransactionId};

/// Default number of cached resolutions per process.
pub const DEFAULT_LOCAL_COMMIT_CACHE_SIZE: usize = 1024;

/// What a committed local transaction resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedCommit {
    /// Never part of a distributed transaction
    LocalOnly,
    /// Committed as part of this distributed transaction
    Distributed(DistributedTransactionId),
}

/// Process-local memo of distributed log lookups.
pub trait LocalCommitCache {
    fn find(
        &self,
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
    ) -> Option<CachedCommit>;

    fn add_committed(
        &mut self,
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
        commit: CachedCommit,
    );
}

/// Bounded FIFO implementation of [`LocalCommitCache`].
#[derive(Debug)]
pub struct LocalDistribXactCache {
    entries: HashMap<LocalTransactionId, (DistributedTransactionTimeStamp, CachedCommit)>,
    insertion_order: VecDeque<LocalTransactionId>,
    capacity: usize,
}

impl LocalDistribXactCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(DEFAULT_LOCAL_COMMIT_CACHE_SIZE)),
            insertion_order: VecDeque::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}

impl Default for LocalDistribXactCache {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_COMMIT_CACHE_SIZE)
    }
}

impl LocalCommitCache for LocalDistribXactCache {
    fn find(
        &self,
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
    ) -> Option<CachedCommit> {
        match self.entries.get(&local_xid) {
            Some((cached_ts, commit)) if *cached_ts == timestamp => Some(*commit),
            _ => None,
        }
    }

    fn add_committed(
        &mut self,
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
        commit: CachedCommit,
    ) {
        if self.capacity == 0 {
            return;
        }

        if let Some(entry) = self.entries.get_mut(&local_xid) {
            *entry = (timestamp, commit);
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.entries.insert(local_xid, (timestamp, commit));
        self.insertion_order.push_back(local_xid);
    }
}
