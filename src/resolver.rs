//! Ordered-alternative selector resolution.
//!
//! The portal's element identifiers drift between deployments, so call sites
//! carry a list of known locator variants rather than a single selector.
//! Resolution walks the list in order and settles on the first *listed*
//! candidate that becomes visible, not the fastest one to appear, so that
//! the preferred, most specific locator always wins when it exists.

use std::time::Duration;

use tracing::debug;

use crate::driver::{ContextId, PortalDriver};
use crate::errors::AutomationError;
use crate::selector::Selector;

/// How often a candidate is re-checked for visibility while waiting.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One locator alternative with its own visibility budget.
#[derive(Debug, Clone)]
pub struct SelectorCandidate {
    pub selector: Selector,
    pub timeout: Duration,
}

impl SelectorCandidate {
    pub fn new(selector: impl Into<Selector>, timeout: Duration) -> Self {
        Self {
            selector: selector.into(),
            timeout,
        }
    }
}

/// Resolves candidate lists against a live context.
///
/// Stateless and side-effect-free: resolution is purely a lookup, and every
/// call re-evaluates from scratch. Results are never cached because a
/// suspension point between calls may have replaced the DOM.
pub struct SelectorResolver;

impl SelectorResolver {
    /// Returns the first candidate (in list order) that becomes visible
    /// within its own timeout.
    ///
    /// Candidates are evaluated strictly sequentially: a later candidate is
    /// only consulted once every earlier one has exhausted its budget. Fails
    /// with [`AutomationError::ElementNotFound`] naming every candidate
    /// tried when none becomes visible within the cumulative budget.
    ///
    /// A malformed candidate fails resolution immediately with
    /// [`AutomationError::InvalidSelector`]; no driver can match it, so
    /// its budget is never consumed.
    pub async fn resolve(
        driver: &dyn PortalDriver,
        ctx: ContextId,
        candidates: &[SelectorCandidate],
    ) -> Result<Selector, AutomationError> {
        for candidate in candidates {
            if let Selector::Invalid(reason) = &candidate.selector {
                return Err(AutomationError::InvalidSelector(reason.clone()));
            }
            if Self::wait_visible(driver, ctx, &candidate.selector, candidate.timeout).await? {
                debug!(selector = %candidate.selector, %ctx, "candidate resolved");
                return Ok(candidate.selector.clone());
            }
            debug!(
                selector = %candidate.selector,
                timeout_ms = candidate.timeout.as_millis() as u64,
                "candidate never became visible, trying next"
            );
        }

        let tried: Vec<String> = candidates
            .iter()
            .map(|c| format!("{} ({}ms)", c.selector, c.timeout.as_millis()))
            .collect();
        Err(AutomationError::ElementNotFound(format!(
            "no candidate became visible in {ctx}; tried [{}]",
            tried.join(", ")
        )))
    }

    /// Polls one selector for visibility until it appears or the timeout
    /// elapses. A zero timeout checks exactly once.
    async fn wait_visible(
        driver: &dyn PortalDriver,
        ctx: ContextId,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<bool, AutomationError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if driver.is_visible(ctx, selector).await? {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }
}
