//! Visibility errors

use thiserror::Error;

use crate::ids::LocalTransactionId;
use crate::snapshot::SnapshotError;

use super::committed::CommittedStatus;

pub type VisibilityResult<T> = Result<T, VisibilityError>;

#[derive(Debug, Error)]
pub enum VisibilityError {
    /// The evaluator produced a result the caller has no branch for.
    /// Always a logic bug.
    #[error("unrecognized distributed committed test result: {result} for local xid {local_xid}")]
    UnreachableResult {
        local_xid: LocalTransactionId,
        result: CommittedStatus,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl VisibilityError {
    pub fn is_fatal(&self) -> bool {
        match self {
            VisibilityError::UnreachableResult { .. } => true,
            VisibilityError::Snapshot(err) => err.is_fatal(),
        }
    }
}
