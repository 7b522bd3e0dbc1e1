//! Snapshot error types
//!
//! Error codes:
//! - DTX_SNAPSHOT_CORRUPT (FATAL severity)
//! - DTX_SNAPSHOT_CAPACITY_EXCEEDED (FATAL severity)
//! - DTX_OUT_OF_MEMORY (FATAL severity)
//!
//! Every snapshot error aborts the enclosing transaction. Nothing here is
//! retried or recovered locally.

use std::collections::TryReserveError;
use std::fmt;

use crate::observability::Severity;

/// Snapshot error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorCode {
    /// Snapshot fields are inconsistent (wire corruption or upstream bug)
    DtxSnapshotCorrupt,
    /// In-progress list does not fit the already allocated array
    DtxSnapshotCapacityExceeded,
    /// Backing array could not be allocated
    DtxOutOfMemory,
}

impl SnapshotErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotErrorCode::DtxSnapshotCorrupt => "DTX_SNAPSHOT_CORRUPT",
            SnapshotErrorCode::DtxSnapshotCapacityExceeded => "DTX_SNAPSHOT_CAPACITY_EXCEEDED",
            SnapshotErrorCode::DtxOutOfMemory => "DTX_OUT_OF_MEMORY",
        }
    }

    /// Every snapshot error aborts the transaction.
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for SnapshotErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Snapshot error with the offending field values attached.
#[derive(Debug)]
pub struct SnapshotError {
    code: SnapshotErrorCode,
    message: String,
    details: Option<String>,
    source: Option<TryReserveError>,
}

impl SnapshotError {
    /// Decoded or supplied counts are inconsistent.
    pub fn invalid_counts(message: impl Into<String>, max_count: i64, count: i64) -> Self {
        Self {
            code: SnapshotErrorCode::DtxSnapshotCorrupt,
            message: message.into(),
            details: Some(format!("maxCount {}, count {}", max_count, count)),
            source: None,
        }
    }

    /// Any other structural corruption (truncation, ordering, ranges).
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::DtxSnapshotCorrupt,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Corruption detected while decoding at a byte offset.
    pub fn corrupt_at_offset(offset: usize, message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::DtxSnapshotCorrupt,
            message: message.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    pub fn too_many_in_progress(max_count: u32, count: u32) -> Self {
        Self {
            code: SnapshotErrorCode::DtxSnapshotCapacityExceeded,
            message: "Too many distributed transactions for snapshot".to_string(),
            details: Some(format!("maxCount {}, count {}", max_count, count)),
            source: None,
        }
    }

    pub fn out_of_memory(requested: u32, source: TryReserveError) -> Self {
        Self {
            code: SnapshotErrorCode::DtxOutOfMemory,
            message: "out of memory".to_string(),
            details: Some(format!("in-progress array of {} entries", requested)),
            source: Some(source),
        }
    }

    pub fn code(&self) -> SnapshotErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SnapshotErrorCode::DtxSnapshotCorrupt.code(),
            "DTX_SNAPSHOT_CORRUPT"
        );
        assert_eq!(
            SnapshotErrorCode::DtxSnapshotCapacityExceeded.code(),
            "DTX_SNAPSHOT_CAPACITY_EXCEEDED"
        );
        assert_eq!(SnapshotErrorCode::DtxOutOfMemory.code(), "DTX_OUT_OF_MEMORY");
    }

    #[test]
    fn test_all_snapshot_errors_are_fatal() {
        assert_eq!(SnapshotError::corrupt("bad").severity(), Severity::Fatal);
        assert!(SnapshotError::corrupt("bad").is_fatal());
        assert!(SnapshotError::invalid_counts("bad", -1, 0).is_fatal());
        assert!(SnapshotError::too_many_in_progress(4, 5).is_fatal());
    }

    #[test]
    fn test_display_names_corrupt_fields() {
        let err = SnapshotError::invalid_counts("Invalid distributed snapshot received", 2, 5);
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("DTX_SNAPSHOT_CORRUPT"));
        assert!(display.contains("maxCount 2, count 5"));
    }

    #[test]
    fn test_offset_details() {
        let err = SnapshotError::corrupt_at_offset(44, "truncated");
        assert_eq!(err.details(), Some("byte_offset: 44"));
    }

    #[test]
    fn test_out_of_memory_keeps_source() {
        use std::error::Error;

        let source = Vec::<u64>::new().try_reserve_exact(usize::MAX).unwrap_err();
        let err = SnapshotError::out_of_memory(7, source);
        assert_eq!(err.code(), SnapshotErrorCode::DtxOutOfMemory);
        assert!(err.source().is_some());
    }
}
