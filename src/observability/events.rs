//! Observable events of the distributed visibility layer
//!
//! Events are explicit and typed. Each has a default severity; call sites
//! may raise it (for example when a debug switch is on).

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Wire codec
    /// A snapshot was copied into reused storage
    SnapshotCopied,
    /// A snapshot was decoded from its wire form
    SnapshotDeserialized,
    /// A snapshot failed structural validation (FATAL)
    SnapshotCorrupt,
    /// The in-progress array could not be allocated (FATAL)
    SnapshotOutOfMemory,

    // Visibility evaluation
    /// A committed distributed transaction is still in progress for the snapshot
    CommittedButInvisible,
    /// A committed local transaction never joined a distributed transaction
    LocalOnlyCommitted,
    /// A commit record belongs to another coordinator lifetime
    EpochMismatch,
    /// The prune gate received a result it cannot act on (FATAL)
    UnreachableCommittedResult,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SnapshotCopied => "DTX_SNAPSHOT_COPIED",
            Event::SnapshotDeserialized => "DTX_SNAPSHOT_DESERIALIZED",
            Event::SnapshotCorrupt => "DTX_SNAPSHOT_CORRUPT",
            Event::SnapshotOutOfMemory => "DTX_SNAPSHOT_OUT_OF_MEMORY",
            Event::CommittedButInvisible => "DTX_COMMITTED_BUT_INVISIBLE",
            Event::LocalOnlyCommitted => "DTX_LOCAL_ONLY_COMMITTED",
            Event::EpochMismatch => "DTX_EPOCH_MISMATCH",
            Event::UnreachableCommittedResult => "DTX_UNREACHABLE_COMMITTED_RESULT",
            Event::ConfigLoaded => "DTX_CONFIG_LOADED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Event::SnapshotCorrupt | Event::SnapshotOutOfMemory | Event::UnreachableCommittedResult
        )
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            _ if self.is_fatal() => Severity::Fatal,
            Event::ConfigLoaded => Severity::Info,
            Event::SnapshotCopied | Event::SnapshotDeserialized => Severity::Debug,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
