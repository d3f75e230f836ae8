//! The session orchestrator: one finite state machine per run.
//!
//! Sequences authenticate → navigate → open form → per-entry locate/write →
//! commit → refresh → verify → report, owning the [`SessionContext`]'s
//! lifecycle. `Reporting` always runs on the way out (from `Done`, from
//! `Failed` and on cancellation), so a run always emits a report that names
//! every requested entry exactly once.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::commit::CommitCoordinator;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::report::{RunReport, RunStatus};
use crate::resolver::{SelectorCandidate, SelectorResolver};
use crate::rows::RowLocator;
use crate::types::DayEntry;
use crate::verify::{EntryStatus, VerificationEngine, VerificationRecord};
use crate::writer::FieldWriter;

/// The one active state of a run. Strictly sequential; there is exactly one
/// interactive browser session, so nothing here parallelizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Authenticating,
    Navigating,
    FormOpen,
    LocatingRow,
    WritingFields,
    Committing,
    Refreshing,
    Verifying,
    Reporting,
    Done,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Where one entry got to before the run ended. Materialized into a
/// [`VerificationRecord`] only at reporting time, so that verification
/// records exist strictly after a commit attempt.
#[derive(Debug, Clone)]
enum EntryProgress {
    NotReached,
    RowMissing,
    Incomplete,
    Written,
    Verified(VerificationRecord),
}

/// Drives one complete run against a portal.
pub struct Session {
    driver: Arc<dyn PortalDriver>,
    config: SessionConfig,
    state: RunState,
}

impl Session {
    pub fn new(driver: Arc<dyn PortalDriver>, config: SessionConfig) -> Self {
        Self {
            driver,
            config,
            state: RunState::Idle,
        }
    }

    /// The state the machine last settled in. `Done` or `Failed` after a
    /// finished run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Executes the whole run and always returns a report.
    ///
    /// The [`SessionContext`] is torn down on every exit path (success,
    /// fatal step failure, cancellation mid-loop) before the report is
    /// assembled. Each entry in `entries` is processed at most once and
    /// appears in the report exactly once, in request order.
    #[instrument(skip(self, entries, cancel), fields(entry_count = entries.len()))]
    pub async fn run(&mut self, entries: &[DayEntry], cancel: CancellationToken) -> RunReport {
        let mut progress = vec![EntryProgress::NotReached; entries.len()];

        let mut session_ctx = match SessionContext::open(self.driver.clone()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "could not open session context");
                return self.finish(entries, progress, Err(e));
            }
        };

        let outcome = self
            .drive(&session_ctx, entries, &mut progress, &cancel)
            .await;

        // Teardown is unconditional: no exit path may leak a context.
        session_ctx.teardown().await;

        self.finish(entries, progress, outcome)
    }

    /// All states between `Idle` and `Reporting`.
    async fn drive(
        &mut self,
        session_ctx: &SessionContext,
        entries: &[DayEntry],
        progress: &mut [EntryProgress],
        cancel: &CancellationToken,
    ) -> Result<(), AutomationError> {
        let primary = session_ctx.primary();

        self.transition(RunState::Authenticating);
        checkpoint(cancel)?;
        self.authenticate(primary).await?;

        self.transition(RunState::Navigating);
        checkpoint(cancel)?;
        let before = self.navigate_menu(primary, session_ctx).await?;

        self.transition(RunState::FormOpen);
        checkpoint(cancel)?;
        let form_ctx = self.open_form(session_ctx, before).await?;

        let writer = FieldWriter::new(self.config.timing.settle_delay);
        for (i, entry) in entries.iter().enumerate() {
            checkpoint(cancel)?;

            self.transition(RunState::LocatingRow);
            let binding = match RowLocator::locate(
                self.driver.as_ref(),
                form_ctx,
                &self.config.schema.entry_labels,
                &entry.date,
            )
            .await
            {
                Ok(binding) => binding,
                Err(AutomationError::KeyNotFound(reason)) => {
                    warn!(date = %entry.date, %reason, "row not found, skipping entry");
                    progress[i] = EntryProgress::RowMissing;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.transition(RunState::WritingFields);
            let results = writer
                .write_entry(
                    self.driver.as_ref(),
                    form_ctx,
                    &self.config.schema,
                    &self.config.justification_field,
                    &binding,
                    entry,
                )
                .await;
            progress[i] = if results.iter().all(|r| r.succeeded()) {
                EntryProgress::Written
            } else {
                warn!(date = %entry.date, "entry written incompletely");
                EntryProgress::Incomplete
            };
        }

        let coordinator =
            CommitCoordinator::new(self.config.timing.ack_wait, self.config.timing.nav_wait);

        self.transition(RunState::Committing);
        checkpoint(cancel)?;
        coordinator
            .commit(self.driver.as_ref(), form_ctx, &self.config.save)
            .await?;

        self.transition(RunState::Refreshing);
        checkpoint(cancel)?;
        coordinator
            .close_and_refresh(self.driver.as_ref(), primary, form_ctx, &self.config.refresh)
            .await?;

        self.transition(RunState::Verifying);
        for (i, entry) in entries.iter().enumerate() {
            // Only fully written entries are auditable; the others already
            // carry their terminal classification.
            if !matches!(progress[i], EntryProgress::Written) {
                continue;
            }
            checkpoint(cancel)?;
            let record = VerificationEngine::verify_entry(
                self.driver.as_ref(),
                primary,
                &self.config.schema,
                entry,
            )
            .await?;
            progress[i] = EntryProgress::Verified(record);
        }

        Ok(())
    }

    /// Loads the login page and signs in, unless a persisted session
    /// already skipped the form.
    async fn authenticate(&self, primary: ContextId) -> Result<(), AutomationError> {
        let driver = self.driver.as_ref();
        driver.goto(primary, &self.config.login_url).await?;
        tokio::time::sleep(self.config.timing.nav_wait).await;

        let probe = [SelectorCandidate::new(
            self.config.login.user_field.clone(),
            self.config.timing.login_probe,
        )];
        let user_field = match SelectorResolver::resolve(driver, primary, &probe).await {
            Ok(selector) => selector,
            Err(AutomationError::ElementNotFound(_)) => {
                debug!("login form not rendered, assuming existing session");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        driver.clear(primary, &user_field).await?;
        driver
            .fill(primary, &user_field, &self.config.credentials.username)
            .await?;
        driver
            .clear(primary, &self.config.login.secret_field)
            .await?;
        driver
            .fill(
                primary,
                &self.config.login.secret_field,
                &self.config.credentials.secret,
            )
            .await?;

        let submit = SelectorResolver::resolve(driver, primary, &self.config.login.submit).await?;
        driver.click(primary, &submit).await?;
        tokio::time::sleep(self.config.timing.nav_wait).await;
        info!("authenticated");
        Ok(())
    }

    /// Clicks through the menu. Returns the open-context count snapshotted
    /// just before the final step, which is the one expected to surface the
    /// entry form.
    async fn navigate_menu(
        &self,
        primary: ContextId,
        session_ctx: &SessionContext,
    ) -> Result<usize, AutomationError> {
        let driver = self.driver.as_ref();
        let tracker = session_ctx.tracker();
        let steps = &self.config.menu;

        let (last, leading) = match steps.split_last() {
            Some(split) => split,
            None => return tracker.snapshot().await,
        };

        for step in leading {
            let selector = SelectorResolver::resolve(driver, primary, &step.candidates).await?;
            driver.click(primary, &selector).await?;
            tokio::time::sleep(self.config.timing.nav_wait).await;
        }

        let before = tracker.snapshot().await?;
        let selector = SelectorResolver::resolve(driver, primary, &last.candidates).await?;
        driver.click(primary, &selector).await?;
        Ok(before)
    }

    /// Resolves which context the entry form landed in.
    async fn open_form(
        &self,
        session_ctx: &SessionContext,
        before: usize,
    ) -> Result<ContextId, AutomationError> {
        let tracker = session_ctx.tracker();
        let form_ctx = if self.config.expect_popup {
            tracker
                .acquire_opened(before, self.config.timing.popup_timeout)
                .await?
        } else {
            tokio::time::sleep(self.config.timing.nav_wait).await;
            tracker.settled(before).await?
        };
        self.driver.activate(form_ctx).await?;
        info!(%form_ctx, "entry form open");
        Ok(form_ctx)
    }

    /// The `Reporting` state: materializes one record per entry, whatever
    /// happened, then settles in `Done` or `Failed`.
    fn finish(
        &mut self,
        entries: &[DayEntry],
        progress: Vec<EntryProgress>,
        outcome: Result<(), AutomationError>,
    ) -> RunReport {
        self.transition(RunState::Reporting);

        let records = entries
            .iter()
            .zip(progress)
            .map(|(entry, progress)| match progress {
                EntryProgress::Verified(record) => record,
                EntryProgress::RowMissing => {
                    VerificationRecord::unverified(&entry.date, EntryStatus::NotFound)
                }
                EntryProgress::Incomplete => {
                    VerificationRecord::unverified(&entry.date, EntryStatus::WriteIncomplete)
                }
                EntryProgress::Written | EntryProgress::NotReached => {
                    VerificationRecord::unverified(&entry.date, EntryStatus::NotProcessed)
                }
            })
            .collect();

        let status = match outcome {
            Ok(()) => {
                self.transition(RunState::Done);
                RunStatus::Completed
            }
            Err(AutomationError::Cancelled) => {
                self.transition(RunState::Failed);
                RunStatus::Cancelled
            }
            Err(e) => {
                self.transition(RunState::Failed);
                RunStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        RunReport::new(status, records)
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), AutomationError> {
    if cancel.is_cancelled() {
        Err(AutomationError::Cancelled)
    } else {
        Ok(())
    }
}
