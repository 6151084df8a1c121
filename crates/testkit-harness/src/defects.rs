//! Shared log of suspected generated-client defects
//!
//! The classifier appends an entry every time a failure pattern points at
//! the generated client rather than the testnet. The orchestrator prints
//! the whole list at the end of the run so suspected SDK bugs are never
//! silently folded into ordinary skips.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

use testkit_types::DefectRecord;

/// Append-only list of suspected client defects.
///
/// Duplicates are allowed: the same endpoint failing under two credential
/// configurations is recorded twice.
#[derive(Debug, Default)]
pub struct DefectLog {
    entries: Mutex<Vec<DefectRecord>>,
}

impl DefectLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a suspected defect
    pub fn record(&self, test_name: impl Into<String>, note: impl Into<String>) {
        let record = DefectRecord {
            test_name: test_name.into(),
            note: note.into(),
        };
        warn!(case = %record.test_name, note = %record.note, "suspected SDK defect");
        self.entries.lock().push(record);
    }

    /// Copy of all entries recorded so far
    pub fn snapshot(&self) -> Vec<DefectRecord> {
        self.entries.lock().clone()
    }

    /// Number of entries recorded so far
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Shared defect log that can be cloned across tasks
pub type SharedDefectLog = Arc<DefectLog>;

/// Create a shared, empty defect log
pub fn shared_defect_log() -> SharedDefectLog {
    Arc::new(DefectLog::new())
}
