//! Tests for ordered-candidate selector resolution.

use std::sync::Arc;
use std::time::Duration;

use crate::driver::PortalDriver;
use crate::errors::AutomationError;
use crate::resolver::{SelectorCandidate, SelectorResolver};
use crate::selector::Selector;
use crate::tests::fixture::{FakePortal, LOGIN_URL, PRIMARY};

async fn login_page_portal() -> Arc<FakePortal> {
    let portal = Arc::new(FakePortal::with_rows(&[]));
    portal.goto(PRIMARY, LOGIN_URL).await.unwrap();
    portal
}

fn candidate(raw: &str, millis: u64) -> SelectorCandidate {
    SelectorCandidate::new(Selector::from(raw), Duration::from_millis(millis))
}

#[tokio::test]
async fn first_listed_visible_candidate_wins() {
    let portal = login_page_portal().await;
    let candidates = [candidate("#txtUser", 100), candidate("#btnLogin", 100)];

    let resolved = SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
        .await
        .expect("first candidate is visible");
    assert_eq!(resolved, Selector::Id("txtUser".into()));
}

#[tokio::test]
async fn later_candidates_are_not_probed_when_first_is_visible() {
    let portal = login_page_portal().await;
    let candidates = [candidate("#txtUser", 100), candidate("#btnLogin", 100)];

    // Repeated calls are idempotent and never consult the tail.
    for _ in 0..3 {
        SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
            .await
            .expect("first candidate is visible");
    }
    let probes = portal.probes();
    assert!(!probes.is_empty());
    assert!(probes.iter().all(|p| p == "#txtUser"));
}

#[tokio::test]
async fn falls_through_to_the_next_candidate_after_the_budget() {
    let portal = login_page_portal().await;
    let candidates = [candidate("#doesNotExist", 30), candidate("#txtPass", 100)];

    let resolved = SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
        .await
        .expect("second candidate is visible");
    assert_eq!(resolved, Selector::Id("txtPass".into()));

    // The miss was actually probed before the fallback won.
    let probes = portal.probes();
    let first_hit = probes.iter().position(|p| p == "#txtPass").unwrap();
    assert!(probes[..first_hit].iter().any(|p| p == "#doesNotExist"));
}

#[tokio::test]
async fn exhausting_every_candidate_names_them_all() {
    let portal = login_page_portal().await;
    let candidates = [candidate("#ghost", 20), candidate("text:Missing", 20)];

    let err = SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
        .await
        .expect_err("nothing is visible");
    match err {
        AutomationError::ElementNotFound(message) => {
            assert!(message.contains("#ghost"), "message was: {message}");
            assert!(message.contains("text:Missing"), "message was: {message}");
        }
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_candidate_fails_without_being_probed() {
    let portal = login_page_portal().await;
    let candidates = [candidate("txtUser", 100)];

    let err = SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
        .await
        .expect_err("no prefix means no selector type");
    match err {
        AutomationError::InvalidSelector(reason) => {
            assert!(reason.contains("txtUser"), "reason was: {reason}");
        }
        other => panic!("expected InvalidSelector, got {other:?}"),
    }
    // The failure was immediate; the driver never saw the candidate.
    assert!(portal.probes().is_empty());
}

#[tokio::test]
async fn zero_timeout_candidate_is_checked_exactly_once() {
    let portal = login_page_portal().await;
    let candidates = [candidate("#ghost", 0), candidate("#txtUser", 100)];

    let resolved = SelectorResolver::resolve(portal.as_ref(), PRIMARY, &candidates)
        .await
        .unwrap();
    assert_eq!(resolved, Selector::Id("txtUser".into()));
    let ghost_probes = portal.probes().iter().filter(|p| *p == "#ghost").count();
    assert_eq!(ghost_probes, 1);
}
