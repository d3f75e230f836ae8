//! The run's output contract: one record per requested entry, plus totals.

use serde::{Deserialize, Serialize};

use crate::verify::{EntryStatus, VerificationRecord};

/// How the run as a whole ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Failed { error: String },
    Cancelled,
}

/// Aggregate counts over the per-entry records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub verified_correct: usize,
    pub verified_mismatch: usize,
    pub not_found: usize,
    pub write_incomplete: usize,
    pub not_processed: usize,
}

/// The structured summary handed back to the caller.
///
/// Guarantee: `records` enumerates every requested entry exactly once, in
/// request order, even when the run aborted early; entries never reached
/// carry [`EntryStatus::NotProcessed`]. Transport is the caller's concern;
/// the type serializes for whichever sink they choose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub records: Vec<VerificationRecord>,
    pub counts: ReportCounts,
}

impl RunReport {
    pub fn new(status: RunStatus, records: Vec<VerificationRecord>) -> Self {
        let mut counts = ReportCounts::default();
        for record in &records {
            match record.status {
                EntryStatus::VerifiedCorrect => counts.verified_correct += 1,
                EntryStatus::VerifiedMismatch => counts.verified_mismatch += 1,
                EntryStatus::NotFound => counts.not_found += 1,
                EntryStatus::WriteIncomplete => counts.write_incomplete += 1,
                EntryStatus::NotProcessed => counts.not_processed += 1,
            }
        }
        Self {
            status,
            records,
            counts,
        }
    }

    pub fn record_for(&self, date_key: &str) -> Option<&VerificationRecord> {
        self.records.iter().find(|r| r.date_key == date_key)
    }
}
