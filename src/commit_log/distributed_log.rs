//! Persistent distributed commit log
//!
//! Records, per committed local transaction, which distributed transaction
//! it belonged to and which coordinator lifetime assigned that id.
//!
//! - Append-only: a committed entry is never rewritten
//! - Shared by every backend; implementations synchronize internally
//! - Read synchronously by the visibility evaluator

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::ids::{DistributedTransactionId, DistributedTransactionTimeStamp, LocalTransactionId};

use super::errors::{CommitLogError, CommitLogResult};

/// The distributed identity of a committed local transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedRecord {
    pub timestamp: DistributedTransactionTimeStamp,
    pub distributed_xid: DistributedTransactionId,
}

impl CommittedRecord {
    pub fn new(timestamp: DistributedTransactionTimeStamp, distributed_xid: DistributedTransactionId) -> Self {
        Self {
            timestamp,
            distributed_xid,
        }
    }
}

/// Read side of the distributed commit log.
pub trait DistributedLog: Send + Sync {
    /// Returns the record for `local_xid`, or `None` when the transaction
    /// never took part in a distributed transaction.
    fn lookup_committed(&self, local_xid: LocalTransactionId) -> Option<CommittedRecord>;
}

/// In-memory distributed log.
#[derive(Debug, Default)]
pub struct InMemoryDistributedLog {
    entries: RwLock<HashMap<LocalTransactionId, CommittedRecord>>,
    lookups: AtomicU64,
}

impl InMemoryDistributedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a commit record.
    ///
    /// Re-recording the identical record is a no-op; recording a different
    /// one for an already committed local id is rejected.
    pub fn record_committed(
        &self,
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
        distributed_xid: DistributedTransactionId,
    ) -> CommitLogResult<()> {
        if !local_xid.is_normal() {
            return Err(CommitLogError::InvalidLocalXid(local_xid));
        }
        if !distributed_xid.is_valid() || timestamp == DistributedTransactionTimeStamp::UNSET {
            return Err(CommitLogError::InvalidRecord {
                local_xid,
                timestamp,
                distributed_xid,
            });
        }

        let record = CommittedRecord::new(timestamp, distributed_xid);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get(&local_xid) {
            Some(existing) if *existing == record => Ok(()),
            Some(existing) => Err(CommitLogError::ConflictingRecord {
                local_xid,
                existing: existing.distributed_xid,
                attempted: distributed_xid,
            }),
            None => {
                entries.insert(local_xid, record);
                Ok(())
            }
        }
    }

    /// Number of `lookup_committed` calls served so far.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DistributedLog for InMemoryDistributedLog {
    fn lookup_committed(&self, local_xid: LocalTransactionId) -> Option<CommittedRecord> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&local_xid)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: u64) -> DistributedTransactionTimeStamp {
        DistributedTransactionTimeStamp::new(v)
    }

    fn dxid(v: u64) -> DistributedTransactionId {
        DistributedTransactionId::new(v)
    }

    fn lxid(v: u32) -> LocalTransactionId {
        LocalTransactionId::new(v)
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let log = InMemoryDistributedLog::new();
        assert_eq!(log.lookup_committed(lxid(10)), None);
        assert_eq!(log.lookups(), 1);
    }

    #[test]
    fn test_record_then_lookup() {
        let log = InMemoryDistributedLog::new();
        log.record_committed(lxid(10), ts(5), dxid(100)).unwrap();

        let record = log.lookup_committed(lxid(10)).unwrap();
        assert_eq!(record.timestamp, ts(5));
        assert_eq!(record.distributed_xid, dxid(100));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_identical_rerecord_is_noop() {
        let log = InMemoryDistributedLog::new();
        log.record_committed(lxid(10), ts(5), dxid(100)).unwrap();
        log.record_committed(lxid(10), ts(5), dxid(100)).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_conflicting_rerecord_rejected() {
        let log = InMemoryDistributedLog::new();
        log.record_committed(lxid(10), ts(5), dxid(100)).unwrap();

        let err = log.record_committed(lxid(10), ts(5), dxid(101)).unwrap_err();
        assert!(matches!(err, CommitLogError::ConflictingRecord { .. }));
        assert_eq!(log.lookup_committed(lxid(10)).unwrap().distributed_xid, dxid(100));
    }

    #[test]
    fn test_invalid_records_rejected() {
        let log = InMemoryDistributedLog::new();
        assert!(log.record_committed(LocalTransactionId::FROZEN, ts(5), dxid(1)).is_err());
        assert!(log.record_committed(lxid(10), ts(5), DistributedTransactionId::INVALID).is_err());
        assert!(log.record_committed(lxid(10), DistributedTransactionTimeStamp::UNSET, dxid(1)).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(InMemoryDistributedLog::new());
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..50u32 {
                        let local = 3 + t * 1000 + i;
                        log.record_committed(lxid(local), ts(1), dxid(u64::from(local)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 200);
    }
}
