//! Observability for the distributed visibility layer
//!
//! - Structured JSON logging with a process-wide threshold
//! - Typed events
//! - Passive counters
//!
//! Observability never changes a visibility decision.

mod events;
mod logger;
mod metrics;
mod switches;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, VisibilityMetrics};
pub use switches::DebugSwitches;

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.default_severity(), event.as_str(), fields);
}

/// Log an event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}

/// Serializes tests that change the process-wide logger threshold or
/// debug switches, and restores both when the guard drops.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard};

    use super::{DebugSwitches, Logger, Severity};

    static GLOBAL_STATE: Mutex<()> = Mutex::new(());

    pub(crate) struct GlobalStateGuard {
        _lock: MutexGuard<'static, ()>,
        min_severity: Severity,
        print_snapshot_dtm: bool,
        print_full_dtm: bool,
    }

    pub(crate) fn lock_global_state() -> GlobalStateGuard {
        let lock = GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner());
        GlobalStateGuard {
            _lock: lock,
            min_severity: Logger::min_severity(),
            print_snapshot_dtm: DebugSwitches::print_snapshot_dtm(),
            print_full_dtm: DebugSwitches::print_full_dtm(),
        }
    }

    impl Drop for GlobalStateGuard {
        fn drop(&mut self) {
            Logger::set_min_severity(self.min_severity);
            DebugSwitches::set(self.print_snapshot_dtm, self.print_full_dtm);
        }
    }
}
