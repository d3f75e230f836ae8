//! Commit sequencing: save, acknowledge, close the popup, refresh.

use std::time::Duration;

use tracing::{debug, info};

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::resolver::{SelectorCandidate, SelectorResolver};

/// Drives the save / close / refresh tail of a batch.
///
/// The portal acknowledges a save asynchronously (a toast inside the form
/// context) with no DOM signal the engine can key on, so the coordinator
/// waits a configured acknowledgement window instead. The refresh of the
/// primary context is what makes the committed values readable for
/// verification; skipping it re-reads the stale grid.
pub struct CommitCoordinator {
    ack_wait: Duration,
    nav_wait: Duration,
}

impl CommitCoordinator {
    pub fn new(ack_wait: Duration, nav_wait: Duration) -> Self {
        Self { ack_wait, nav_wait }
    }

    /// Resolves the save control among its known variants, activates it and
    /// sits out the acknowledgement window.
    ///
    /// Fatal: if no variant resolves this returns
    /// [`AutomationError::CommitFailed`], because unsaved writes cannot be
    /// meaningfully verified and the run must not pretend otherwise.
    pub async fn commit(
        &self,
        driver: &dyn PortalDriver,
        form_ctx: ContextId,
        save_candidates: &[SelectorCandidate],
    ) -> Result<(), AutomationError> {
        let save = SelectorResolver::resolve(driver, form_ctx, save_candidates)
            .await
            .map_err(|e| AutomationError::CommitFailed(format!("save control: {e}")))?;

        driver.click(form_ctx, &save).await?;
        debug!(selector = %save, "save control activated");
        tokio::time::sleep(self.ack_wait).await;
        info!("commit acknowledged");
        Ok(())
    }

    /// Closes the secondary context the commit happened in (when there is
    /// one), re-activates the primary, and triggers its refresh control so
    /// subsequently read data reflects the commit.
    pub async fn close_and_refresh(
        &self,
        driver: &dyn PortalDriver,
        primary: ContextId,
        form_ctx: ContextId,
        refresh_candidates: &[SelectorCandidate],
    ) -> Result<(), AutomationError> {
        if form_ctx != primary {
            driver.close_context(form_ctx).await?;
            debug!(%form_ctx, "secondary context closed");
        }
        driver.activate(primary).await?;

        let refresh = SelectorResolver::resolve(driver, primary, refresh_candidates).await?;
        driver.click(primary, &refresh).await?;
        tokio::time::sleep(self.nav_wait).await;
        info!("primary context refreshed");
        Ok(())
    }
}
