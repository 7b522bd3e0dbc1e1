//! Commit log errors

use thiserror::Error;

use crate::ids::{DistributedTransactionId, DistributedTransactionTimeStamp, LocalTransactionId};

pub type CommitLogResult<T> = Result<T, CommitLogError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitLogError {
    #[error("local xid {0} cannot carry a distributed commit record")]
    InvalidLocalXid(LocalTransactionId),

    #[error("invalid commit record for local xid {local_xid}: timestamp {timestamp}, distributed xid {distributed_xid}")]
    InvalidRecord {
        local_xid: LocalTransactionId,
        timestamp: DistributedTransactionTimeStamp,
        distributed_xid: DistributedTransactionId,
    },

    #[error("local xid {local_xid} already committed as distributed xid {existing}, refusing {attempted}")]
    ConflictingRecord {
        local_xid: LocalTransactionId,
        existing: DistributedTransactionId,
        attempted: DistributedTransactionId,
    },
}
