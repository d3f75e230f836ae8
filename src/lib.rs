//! Resilient form automation for stateful web portals
//!
//! This crate drives a time-entry portal that exposes no machine API,
//! through an abstraction inspired by Playwright's web automation model:
//! log in, click through a versioned menu, find the data-entry grid (which
//! may open in a popup), write per-day time values into rows discovered
//! from rendered text, commit, then re-read the committed state and produce
//! a trustworthy per-entry pass/fail audit.
//!
//! The portal's element ids, popup behavior and row ordering are not
//! contractually stable, so every lookup goes through ordered locator
//! candidates ([`resolver::SelectorResolver`]) and nothing holds an element
//! reference across a suspension point. The actual browser sits behind the
//! [`driver::PortalDriver`] trait; the engine owns policy (ordering, waits,
//! teardown, audit) and the driver owns mechanics.

pub mod commit;
pub mod config;
pub mod context;
pub mod driver;
pub mod errors;
pub mod report;
pub mod resolver;
pub mod rows;
pub mod selector;
pub mod session;
#[cfg(test)]
mod tests;
pub mod types;
pub mod verify;
pub mod writer;

pub use commit::CommitCoordinator;
pub use config::{LoginLocators, MenuStep, SessionConfig, Timing};
pub use context::{ContextTracker, SessionContext};
pub use driver::{ContextId, ElementInfo, PortalDriver};
pub use errors::AutomationError;
pub use report::{ReportCounts, RunReport, RunStatus};
pub use resolver::{SelectorCandidate, SelectorResolver};
pub use rows::{GridSchema, LabelPattern, RowLocator};
pub use selector::Selector;
pub use session::{RunState, Session};
pub use types::{Credentials, DayEntry, FieldWriteResult, RowBinding, TimeField, WriteOutcome};
pub use verify::{EntryStatus, FieldCheck, FieldStatus, VerificationEngine, VerificationRecord};
pub use writer::FieldWriter;
