//! Distributed snapshots
//!
//! This module provides:
//! - `DistributedSnapshot` - the coordinator's view of in-progress
//!   distributed transactions, handed to every worker of a statement
//! - The wire codec (`serialize`, `deserialize_into`, `copy_from`, `reset`)
//!   used to move a snapshot between processes and to reuse its storage
//!   across statements
//! - `DistributedSnapshotWithLocalMapping` - a snapshot plus the local ids
//!   already proven to be in progress under it
//!
//! Snapshots are owned by exactly one backend. Only the serialized bytes
//! cross process boundaries.

mod codec;
mod distributed;
mod errors;
mod local_mapping;

pub use codec::{COUNT_WIDTH, HEADER_SIZE, SNAPSHOT_ID_WIDTH, TIMESTAMP_WIDTH, XID_WIDTH};
pub use distributed::{DistributedSnapshot, MAX_IN_PROGRESS_CAPACITY};
pub use errors::{SnapshotError, SnapshotErrorCode, SnapshotResult};
pub use local_mapping::{DistributedSnapshotWithLocalMapping, FastPath};
