//! Commit log collaborators
//!
//! The visibility evaluator never decides local commit status itself. It
//! asks these collaborators which distributed transaction a committed local
//! id belonged to:
//! - `DistributedLog` - the persistent, cluster-shared record
//! - `LocalCommitCache` - a bounded per-process memo in front of it
//! - `CommitResolver` - the lookup order over both

mod distributed_log;
mod errors;
mod local_cache;
mod resolver;

pub use distributed_log::{CommittedRecord, DistributedLog, InMemoryDistributedLog};
pub use errors::{CommitLogError, CommitLogResult};
pub use local_cache::{
    CachedCommit, LocalCommitCache, LocalDistribXactCache, DEFAULT_LOCAL_COMMIT_CACHE_SIZE,
};
pub use resolver::{CommitResolver, Resolution};
