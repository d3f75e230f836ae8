//! Browser context bookkeeping for one run.
//!
//! The portal opens its data-entry form in a popup on some deployments and
//! in-page on others, so the engine never assumes which context an action
//! landed in. [`ContextTracker`] arbitrates that by comparing open-context
//! counts before and after the triggering action; [`SessionContext`] owns
//! the set of contexts for the run and guarantees they are all closed on the
//! way out, whatever path the run took.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::resolver::POLL_INTERVAL;

/// Watches for contexts spawned by UI actions.
///
/// Holds no state of its own beyond the driver handle: every query goes back
/// to the driver, because contexts can appear asynchronously while the
/// engine is suspended and a cached answer would be stale.
pub struct ContextTracker {
    driver: Arc<dyn PortalDriver>,
}

impl ContextTracker {
    pub fn new(driver: Arc<dyn PortalDriver>) -> Self {
        Self { driver }
    }

    /// The number of currently open contexts. Callers record this before a
    /// triggering action and pass it to [`Self::acquire_opened`] or
    /// [`Self::settled`] afterwards.
    pub async fn snapshot(&self) -> Result<usize, AutomationError> {
        Ok(self.driver.contexts().await?.len())
    }

    /// Waits for an action that is *expected* to open a new context to do
    /// so, and returns the most recently opened one.
    ///
    /// Fails with [`AutomationError::ContextNotFound`] if no context beyond
    /// `before` appears within `timeout`.
    pub async fn acquire_opened(
        &self,
        before: usize,
        timeout: Duration,
    ) -> Result<ContextId, AutomationError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let contexts = self.driver.contexts().await?;
            if contexts.len() > before {
                // Opening order is preserved, so the newest is last.
                let newest = *contexts.last().ok_or_else(|| {
                    AutomationError::ContextNotFound("context list emptied mid-wait".into())
                })?;
                debug!(%newest, open = contexts.len(), "new context appeared");
                return Ok(newest);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AutomationError::ContextNotFound(format!(
                    "expected a new context within {}ms but count stayed at {}",
                    timeout.as_millis(),
                    contexts.len()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Where did the last action land? The newest context if one appeared
    /// since `before`, otherwise whichever context is currently active.
    ///
    /// This is the non-failing arbiter for actions that *may* open a popup.
    pub async fn settled(&self, before: usize) -> Result<ContextId, AutomationError> {
        let contexts = self.driver.contexts().await?;
        if contexts.len() > before {
            if let Some(newest) = contexts.last() {
                return Ok(*newest);
            }
        }
        self.driver.active_context().await
    }
}

/// The complete set of open browser contexts belonging to one run.
///
/// Lives for the whole run and is torn down exactly once (on completion,
/// failure or cancellation), never partially.
pub struct SessionContext {
    driver: Arc<dyn PortalDriver>,
    primary: ContextId,
    torn_down: bool,
}

impl SessionContext {
    /// Adopts the driver's currently active context as the run's primary.
    pub async fn open(driver: Arc<dyn PortalDriver>) -> Result<Self, AutomationError> {
        let primary = driver.active_context().await?;
        info!(%primary, "session context opened");
        Ok(Self {
            driver,
            primary,
            torn_down: false,
        })
    }

    /// The context the run started in; menus and the review grid live here.
    pub fn primary(&self) -> ContextId {
        self.primary
    }

    pub fn tracker(&self) -> ContextTracker {
        ContextTracker::new(self.driver.clone())
    }

    /// Closes every context still open, newest first so the primary goes
    /// last. Idempotent; errors on individual closes are logged and do not
    /// stop the remaining closes.
    pub async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let contexts = match self.driver.contexts().await {
            Ok(contexts) => contexts,
            Err(e) => {
                warn!(error = %e, "could not enumerate contexts during teardown");
                return;
            }
        };
        for ctx in contexts.into_iter().rev() {
            if let Err(e) = self.driver.close_context(ctx).await {
                warn!(%ctx, error = %e, "failed to close context during teardown");
            }
        }
        info!("session context torn down");
    }
}
