//! Shared data model for a run: entries, fields, credentials, bindings.

use serde::{Deserialize, Serialize};

/// The four time-of-day fields of one grid row, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeField {
    Entry1,
    Exit1,
    Entry2,
    Exit2,
}

impl TimeField {
    /// All fields, in the order they are written and verified.
    pub const ALL: [TimeField; 4] = [
        TimeField::Entry1,
        TimeField::Exit1,
        TimeField::Entry2,
        TimeField::Exit2,
    ];

    /// Position of this field within [`TimeField::ALL`].
    pub fn index(self) -> usize {
        match self {
            TimeField::Entry1 => 0,
            TimeField::Exit1 => 1,
            TimeField::Entry2 => 2,
            TimeField::Exit2 => 3,
        }
    }
}

impl std::fmt::Display for TimeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeField::Entry1 => "Entry1",
            TimeField::Exit1 => "Exit1",
            TimeField::Entry2 => "Entry2",
            TimeField::Exit2 => "Exit2",
        };
        write!(f, "{name}")
    }
}

/// One calendar day's requested time values, supplied by the caller before
/// the run starts and immutable for its duration.
///
/// `date` is the locale-fixed `dd/mm/yyyy` rendering the portal uses for row
/// labels; matching is exact string equality, never date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: String,
    /// Requested values keyed by [`TimeField::ALL`] order.
    pub hours: [String; 4],
    /// Free text written into the form's justification field.
    #[serde(default)]
    pub justification: String,
}

impl DayEntry {
    pub fn hour(&self, field: TimeField) -> &str {
        &self.hours[field.index()]
    }
}

/// Login identity for the portal, injected via configuration at
/// construction. Never stored beyond the run, never a process-wide constant.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

// Keep the secret out of logs and debug dumps.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"***")
            .finish()
    }
}

/// Transient mapping from a date key to the grid's internal row index.
///
/// Resolved at the start of each per-entry loop iteration and discarded once
/// that entry's verification completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBinding {
    pub date_key: String,
    pub row_index: u32,
}

/// Outcome of writing a single field of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    Success,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWriteResult {
    pub field: TimeField,
    pub requested: String,
    pub outcome: WriteOutcome,
}

impl FieldWriteResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == WriteOutcome::Success
    }
}
