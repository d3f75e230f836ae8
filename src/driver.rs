//! The seam between the engine and whatever drives the actual browser.
//!
//! The engine never talks to a page directly; every interaction goes through
//! [`PortalDriver`], keyed by a [`ContextId`] and a [`Selector`]. Element
//! handles are deliberately absent from this trait: intervening waits can
//! invalidate the DOM, so callers re-resolve on every call instead of
//! holding a reference across a suspension point.

use crate::errors::AutomationError;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};

/// Identifies one open browser window, tab or frame within a run.
///
/// Ids are assigned by the driver in opening order and are never reused
/// within a session, so a larger id always means a more recently opened
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(pub u64);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// A snapshot of one rendered element, as returned by a scan.
///
/// Only the properties the engine actually reads are carried: the element's
/// id (row indices are parsed out of it) and its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub id: String,
    pub text: String,
}

/// The common trait every portal backend must implement.
///
/// Mirrors a Playwright page API narrowed to what the engine needs. All
/// methods act on the current DOM at call time; none of them wait. Waiting
/// policy (polling, timeouts, settle pacing) lives in the engine, not the
/// driver.
#[async_trait::async_trait]
pub trait PortalDriver: Send + Sync {
    /// Navigate the given context to a URL.
    async fn goto(&self, ctx: ContextId, url: &str) -> Result<(), AutomationError>;

    /// Whether at least one element matching the selector is currently
    /// rendered and visible. Absence is `Ok(false)`, not an error.
    async fn is_visible(&self, ctx: ContextId, selector: &Selector)
        -> Result<bool, AutomationError>;

    /// Click the first element matching the selector.
    async fn click(&self, ctx: ContextId, selector: &Selector) -> Result<(), AutomationError>;

    /// Clear a text input's current value.
    async fn clear(&self, ctx: ContextId, selector: &Selector) -> Result<(), AutomationError>;

    /// Type a value into a text input (does not clear first).
    async fn fill(
        &self,
        ctx: ContextId,
        selector: &Selector,
        value: &str,
    ) -> Result<(), AutomationError>;

    /// Read the current value of the first matching input element.
    async fn read_value(
        &self,
        ctx: ContextId,
        selector: &Selector,
    ) -> Result<String, AutomationError>;

    /// All elements matching the selector, in document order.
    async fn elements(
        &self,
        ctx: ContextId,
        selector: &Selector,
    ) -> Result<Vec<ElementInfo>, AutomationError>;

    /// Read the cell texts of one row of a table, in column order.
    async fn table_row_cells(
        &self,
        ctx: ContextId,
        table: &Selector,
        row_index: usize,
    ) -> Result<Vec<String>, AutomationError>;

    /// Every open context, in opening order. Re-queried after each
    /// suspension point; never cached by callers.
    async fn contexts(&self) -> Result<Vec<ContextId>, AutomationError>;

    /// The context that currently holds focus.
    async fn active_context(&self) -> Result<ContextId, AutomationError>;

    /// Give focus to a context.
    async fn activate(&self, ctx: ContextId) -> Result<(), AutomationError>;

    /// Close one context. Closing the last context ends the browser session.
    async fn close_context(&self, ctx: ContextId) -> Result<(), AutomationError>;
}
