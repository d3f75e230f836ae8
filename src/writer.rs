//! Field writing with settle pacing and field-granular failure containment.

use std::time::Duration;

use tracing::{debug, warn};

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::rows::GridSchema;
use crate::selector::Selector;
use crate::types::{DayEntry, FieldWriteResult, RowBinding, TimeField, WriteOutcome};

/// Writes requested values into a located row, one field at a time.
///
/// After each write the writer pauses for the configured settle interval
/// before touching the next field; the portal's client-side validation
/// reformats inputs on change and rejects keystrokes that arrive before it
/// finishes. The interval is a deliberate configuration knob, not a
/// constant, because it tracks the portal's own latency.
pub struct FieldWriter {
    settle: Duration,
}

impl FieldWriter {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Writes one field of one row. Clears, fills, then settles.
    pub async fn write_field(
        &self,
        driver: &dyn PortalDriver,
        ctx: ContextId,
        schema: &GridSchema,
        row: &RowBinding,
        field: TimeField,
        value: &str,
    ) -> FieldWriteResult {
        let input = schema.input(row.row_index, field);
        let outcome = match self.clear_and_fill(driver, ctx, &input, value).await {
            Ok(()) => {
                debug!(%input, value, "field written");
                WriteOutcome::Success
            }
            Err(e) => {
                let failure = AutomationError::WriteFailed {
                    field: field.to_string(),
                    reason: e.to_string(),
                };
                warn!(%input, value, error = %failure, "field write failed");
                WriteOutcome::Failed {
                    reason: failure.to_string(),
                }
            }
        };
        tokio::time::sleep(self.settle).await;

        FieldWriteResult {
            field,
            requested: value.to_string(),
            outcome,
        }
    }

    /// Writes an entry's justification and all four time fields into its
    /// bound row.
    ///
    /// Partial-success policy: a failed field is recorded and its siblings
    /// are still attempted, so one flaky input never voids the rest of the
    /// row. The caller inspects the results to classify the entry.
    pub async fn write_entry(
        &self,
        driver: &dyn PortalDriver,
        ctx: ContextId,
        schema: &GridSchema,
        justification_field: &Selector,
        row: &RowBinding,
        entry: &DayEntry,
    ) -> Vec<FieldWriteResult> {
        if !entry.justification.is_empty() {
            if let Err(e) = self
                .clear_and_fill(driver, ctx, justification_field, &entry.justification)
                .await
            {
                // The justification is shared form state, not a per-row
                // field; losing it does not void the row's time values.
                warn!(error = %e, "justification write failed");
            }
        }

        let mut results = Vec::with_capacity(TimeField::ALL.len());
        for field in TimeField::ALL {
            results.push(
                self.write_field(driver, ctx, schema, row, field, entry.hour(field))
                    .await,
            );
        }
        results
    }

    async fn clear_and_fill(
        &self,
        driver: &dyn PortalDriver,
        ctx: ContextId,
        input: &Selector,
        value: &str,
    ) -> Result<(), AutomationError> {
        driver.clear(ctx, input).await?;
        driver.fill(ctx, input, value).await
    }
}
