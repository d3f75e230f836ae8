//! Row discovery: mapping a date key to the grid's internal row index.
//!
//! The portal renders one label per grid row with an id shaped
//! `<prefix><index><suffix>` (e.g. `GB_l17_lblData`) whose text is the row's
//! date. There is no stable key to look rows up by, so the engine scans the
//! rendered labels in document order and takes the first whose text equals
//! the requested date exactly. Duplicate dates therefore resolve to the
//! earliest row; that tie-break matches the portal's historical behavior and
//! is deliberate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::types::{RowBinding, TimeField};

/// An id affix pair identifying one family of row labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPattern {
    pub prefix: String,
    pub suffix: String,
}

impl LabelPattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Selector matching every label of this family, in document order.
    pub fn selector(&self) -> Selector {
        Selector::IdAffix {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
    }

    /// Extracts the row index embedded in a label id, if the id fits this
    /// pattern. `GB_l17_lblData` with prefix `GB_l` / suffix `_lblData`
    /// yields 17.
    pub fn row_index(&self, id: &str) -> Option<u32> {
        id.strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?
            .parse()
            .ok()
    }
}

/// Layout contract of the data-entry grid and the post-commit review grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSchema {
    /// Labels on the editable entry grid.
    pub entry_labels: LabelPattern,
    /// Prefix of every row input id (`GB_l`).
    pub input_prefix: String,
    /// Fragment between the row index and the field tag (`_txt`).
    pub input_infix: String,
    /// Portal spellings for the four field input ids, in
    /// [`TimeField::ALL`] order (`Ent1`, `Sai1`, `Ent2`, `Sai2`).
    pub field_tags: [String; 4],
    /// Labels on the read-only review grid rendered after refresh.
    pub review_labels: LabelPattern,
    /// The review grid's table element.
    pub review_table: Selector,
    /// Column of the first time value in a review row; the remaining three
    /// fields occupy the following columns in order.
    pub first_value_column: usize,
}

impl GridSchema {
    /// Input selector for one field of one row, built by template
    /// substitution: `<input_prefix><row><input_infix><tag>`.
    pub fn input(&self, row_index: u32, field: TimeField) -> Selector {
        Selector::Id(format!(
            "{}{}{}{}",
            self.input_prefix, row_index, self.input_infix, self.field_tags[field.index()]
        ))
    }

    /// Review-grid column holding a field's rendered value.
    pub fn value_column(&self, field: TimeField) -> usize {
        self.first_value_column + field.index()
    }
}

/// Maps a date key to a row index by scanning rendered labels.
pub struct RowLocator;

impl RowLocator {
    /// Linear document-order scan: the first label whose text equals
    /// `date_key` exactly wins, and its row index is parsed out of its id.
    ///
    /// Labels whose ids do not fit the pattern are skipped rather than
    /// treated as errors; the portal occasionally renders header rows with
    /// unrelated ids in the same family.
    pub async fn locate(
        driver: &dyn PortalDriver,
        ctx: ContextId,
        labels: &LabelPattern,
        date_key: &str,
    ) -> Result<RowBinding, AutomationError> {
        let rendered = driver.elements(ctx, &labels.selector()).await?;
        let scanned = rendered.len();

        for element in rendered {
            if element.text != date_key {
                continue;
            }
            if let Some(row_index) = labels.row_index(&element.id) {
                debug!(date_key, row_index, "row located");
                return Ok(RowBinding {
                    date_key: date_key.to_string(),
                    row_index,
                });
            }
        }

        Err(AutomationError::KeyNotFound(format!(
            "no label matching {} rendered '{date_key}' ({scanned} label(s) scanned)",
            labels.selector()
        )))
    }
}
