//! distsnap - Distributed snapshot visibility for MPP segments
//!
//! A segment sees two transaction id spaces: its own local ids and the
//! coordinator's distributed ids. This crate decides, for a locally
//! committed transaction, what a distributed snapshot says about it.
//!
//! - `snapshot` - the distributed snapshot, its wire codec and its local
//!   mapping cache
//! - `commit_log` - resolution of local ids to distributed ids
//! - `visibility` - the committed test and the prune policy gate
//! - `config`, `observability` - process setup, logging and counters

pub mod commit_log;
pub mod config;
pub mod ids;
pub mod observability;
pub mod snapshot;
pub mod visibility;
