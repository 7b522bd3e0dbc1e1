//! Process-wide debug switches
//!
//! Raise selected visibility events from TRACE/DEBUG to INFO so they show
//! up under the default logger threshold. Set once from configuration.

use std::sync::atomic::{AtomicBool, Ordering};

use super::logger::Severity;

static PRINT_SNAPSHOT_DTM: AtomicBool = AtomicBool::new(false);
static PRINT_FULL_DTM: AtomicBool = AtomicBool::new(false);

pub struct DebugSwitches;

impl DebugSwitches {
    pub fn set(print_snapshot_dtm: bool, print_full_dtm: bool) {
        PRINT_SNAPSHOT_DTM.store(print_snapshot_dtm, Ordering::Relaxed);
        PRINT_FULL_DTM.store(print_full_dtm, Ordering::Relaxed);
    }

    /// Visibility decisions against a snapshot.
    pub fn print_snapshot_dtm() -> bool {
        PRINT_SNAPSHOT_DTM.load(Ordering::Relaxed)
    }

    /// Snapshot copy and decode details.
    pub fn print_full_dtm() -> bool {
        PRINT_FULL_DTM.load(Ordering::Relaxed)
    }

    pub fn snapshot_severity(default: Severity) -> Severity {
        if Self::print_snapshot_dtm() {
            default.max(Severity::Info)
        } else {
            default
        }
    }

    pub fn full_severity(default: Severity) -> Severity {
        if Self::print_full_dtm() {
            default.max(Severity::Info)
        } else {
            default
        }
    }
}
