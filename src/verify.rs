//! Post-commit verification: a read-only audit of what the portal kept.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::rows::{GridSchema, RowLocator};
use crate::types::{DayEntry, TimeField};

/// Match status of one field after commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    Match,
    Mismatch,
}

/// One field's expected-versus-rendered comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub field: TimeField,
    pub expected: String,
    /// What the review grid rendered; `None` when the cell was absent.
    pub actual: Option<String>,
    pub status: FieldStatus,
}

/// Terminal classification of one requested entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Row re-located and all fields rendered exactly the requested values.
    VerifiedCorrect,
    /// Row re-located but at least one field differs.
    VerifiedMismatch,
    /// The entry's row could not be located.
    NotFound,
    /// At least one field write failed before commit.
    WriteIncomplete,
    /// The run ended before this entry was reached.
    NotProcessed,
}

/// The audit result for one entry. Produced only after a commit has been
/// attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub date_key: String,
    pub fields: Vec<FieldCheck>,
    pub status: EntryStatus,
}

impl VerificationRecord {
    pub fn unverified(date_key: &str, status: EntryStatus) -> Self {
        Self {
            date_key: date_key.to_string(),
            fields: Vec::new(),
            status,
        }
    }
}

/// Re-reads committed state and diffs it against what was requested.
///
/// Strictly read-only: it never re-writes, never retries, never corrects.
/// Surfacing a mismatch is the whole point; acting on one automatically
/// risks runaway corrective writes against a stateful portal.
pub struct VerificationEngine;

impl VerificationEngine {
    /// Re-locates one entry's row on the review grid and compares the four
    /// rendered values at the schema's fixed column offsets against the
    /// requested values, by exact string equality.
    pub async fn verify_entry(
        driver: &dyn PortalDriver,
        ctx: ContextId,
        schema: &GridSchema,
        entry: &DayEntry,
    ) -> Result<VerificationRecord, AutomationError> {
        let binding =
            match RowLocator::locate(driver, ctx, &schema.review_labels, &entry.date).await {
                Ok(binding) => binding,
                Err(AutomationError::KeyNotFound(reason)) => {
                    warn!(date = %entry.date, %reason, "row not found post-commit");
                    return Ok(VerificationRecord::unverified(
                        &entry.date,
                        EntryStatus::NotFound,
                    ));
                }
                Err(e) => return Err(e),
            };

        let cells = driver
            .table_row_cells(ctx, &schema.review_table, binding.row_index as usize)
            .await?;

        let mut fields = Vec::with_capacity(TimeField::ALL.len());
        for field in TimeField::ALL {
            let expected = entry.hour(field).to_string();
            let actual = cells
                .get(schema.value_column(field))
                .map(|cell| cell.trim().to_string());
            let status = match &actual {
                Some(rendered) if *rendered == expected => FieldStatus::Match,
                _ => FieldStatus::Mismatch,
            };
            debug!(%field, %expected, ?actual, ?status, "field checked");
            fields.push(FieldCheck {
                field,
                expected,
                actual,
                status,
            });
        }

        let status = if fields.iter().all(|f| f.status == FieldStatus::Match) {
            EntryStatus::VerifiedCorrect
        } else {
            EntryStatus::VerifiedMismatch
        };
        info!(date = %entry.date, ?status, "entry verified");

        Ok(VerificationRecord {
            date_key: entry.date.clone(),
            fields,
            status,
        })
    }
}
