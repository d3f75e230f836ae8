//! End-to-end scenarios against the fake portal.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::report::{RunReport, RunStatus};
use crate::resolver::SelectorCandidate;
use crate::selector::Selector;
use crate::session::{RunState, Session};
use crate::tests::fixture::{test_config, FakePortal};
use crate::types::DayEntry;
use crate::verify::{EntryStatus, FieldStatus};

fn entry(date: &str, hours: [&str; 4]) -> DayEntry {
    DayEntry {
        date: date.into(),
        hours: hours.map(String::from),
        justification: "Atualizacao do Ponto".into(),
    }
}

async fn run(
    portal: &Arc<FakePortal>,
    config: SessionConfig,
    entries: &[DayEntry],
) -> (RunReport, RunState) {
    crate::tests::init_tracing();
    let mut session = Session::new(portal.clone(), config);
    let report = session.run(entries, CancellationToken::new()).await;
    (report, session.state())
}

#[tokio::test]
async fn scenario_a_committed_entry_verifies_correct() {
    let portal = Arc::new(FakePortal::with_rows(&["03/10/2025", "04/10/2025"]));
    let entries = [entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, test_config(), &entries).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(state, RunState::Done);
    assert_eq!(report.records.len(), 1);

    let record = &report.records[0];
    assert_eq!(record.status, EntryStatus::VerifiedCorrect);
    assert_eq!(record.fields.len(), 4);
    assert!(record.fields.iter().all(|f| f.status == FieldStatus::Match));
    assert_eq!(report.counts.verified_correct, 1);

    // Credentials were typed into the login form, not pulled from anywhere
    // else.
    assert_eq!(portal.input_value("txtUser").as_deref(), Some("23294651813"));

    // No leaked contexts after a successful run either.
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn scenario_b_unknown_date_reports_not_found_and_run_completes() {
    let portal = Arc::new(FakePortal::with_rows(&["03/10/2025", "04/10/2025"]));
    let entries = [entry("01/01/2030", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, test_config(), &entries).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(state, RunState::Done);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].status, EntryStatus::NotFound);
    assert_eq!(report.counts.not_found, 1);
}

#[tokio::test]
async fn scenario_c_missing_popup_fails_the_run_and_leaks_nothing() {
    let portal = Arc::new(FakePortal::with_rows(&["04/10/2025"]).suppress_popup());
    let entries = [entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, test_config(), &entries).await;

    match &report.status {
        RunStatus::Failed { error } => {
            assert!(error.contains("context"), "error was: {error}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(state, RunState::Failed);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].status, EntryStatus::NotProcessed);
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn partial_write_contains_the_damage_to_one_entry() {
    let portal = Arc::new(
        FakePortal::with_rows(&["03/10/2025", "04/10/2025"]).failing_input("GB_l0_txtSai1"),
    );
    let entries = [
        entry("03/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
        entry("04/10/2025", ["09:15", "12:30", "13:30", "18:15"]),
    ];

    let (report, state) = run(&portal, test_config(), &entries).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(state, RunState::Done);
    assert_eq!(report.records[0].status, EntryStatus::WriteIncomplete);
    // The batch kept going: the second entry was written and verified.
    assert_eq!(report.records[1].status, EntryStatus::VerifiedCorrect);
    assert_eq!(report.counts.write_incomplete, 1);
    assert_eq!(report.counts.verified_correct, 1);
}

#[tokio::test]
async fn silent_tampering_surfaces_as_verified_mismatch() {
    // The portal commits 12:34 instead of the requested lunch-out value.
    let portal = Arc::new(FakePortal::with_rows(&["04/10/2025"]).tampering(0, 1, "12:34"));
    let entries = [entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, test_config(), &entries).await;

    // A mismatch is an audit finding, never a run failure.
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(state, RunState::Done);

    let record = &report.records[0];
    assert_eq!(record.status, EntryStatus::VerifiedMismatch);
    let exit1 = &record.fields[1];
    assert_eq!(exit1.expected, "12:00");
    assert_eq!(exit1.actual.as_deref(), Some("12:34"));
    assert_eq!(exit1.status, FieldStatus::Mismatch);
    let matches = record
        .fields
        .iter()
        .filter(|f| f.status == FieldStatus::Match)
        .count();
    assert_eq!(matches, 3);
}

#[tokio::test]
async fn cancellation_tears_down_and_still_reports_every_entry() {
    let portal = Arc::new(FakePortal::with_rows(&["04/10/2025"]));
    let entries = [
        entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
        entry("05/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
    ];

    let token = CancellationToken::new();
    token.cancel();
    let mut session = Session::new(portal.clone(), test_config());
    let report = session.run(&entries, token).await;

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(session.state(), RunState::Failed);
    assert_eq!(report.records.len(), 2);
    assert!(report
        .records
        .iter()
        .all(|r| r.status == EntryStatus::NotProcessed));
    assert_eq!(report.counts.not_processed, 2);
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn cancellation_mid_batch_reports_the_remainder_not_processed() {
    let token = CancellationToken::new();
    // The token trips the moment the second entry's first field is filled.
    let portal = Arc::new(
        FakePortal::with_rows(&["03/10/2025", "04/10/2025"])
            .cancelling_on_fill("GB_l0_txtEnt1", token.clone()),
    );
    let entries = [
        entry("01/01/2030", ["09:00", "12:00", "13:00", "18:00"]),
        entry("03/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
        entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
    ];

    crate::tests::init_tracing();
    let mut session = Session::new(portal.clone(), test_config());
    let report = session.run(&entries, token).await;

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(session.state(), RunState::Failed);
    assert_eq!(report.records.len(), 3);
    // Entries already classified before the cancellation keep their
    // classification; the rest report NotProcessed.
    assert_eq!(report.records[0].status, EntryStatus::NotFound);
    assert_eq!(report.records[1].status, EntryStatus::NotProcessed);
    assert_eq!(report.records[2].status, EntryStatus::NotProcessed);
    assert_eq!(report.counts.not_found, 1);
    assert_eq!(report.counts.not_processed, 2);

    // The interrupted entry's write did land, but without a commit it
    // earns no verification record.
    assert_eq!(portal.input_value("GB_l0_txtEnt1").as_deref(), Some("09:00"));
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn cancellation_during_audit_keeps_already_verified_records() {
    let token = CancellationToken::new();
    // Both entries commit; the token trips after the first row is re-read.
    let portal = Arc::new(
        FakePortal::with_rows(&["03/10/2025", "04/10/2025"])
            .cancelling_after_row_reads(1, token.clone()),
    );
    let entries = [
        entry("03/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
        entry("04/10/2025", ["09:15", "12:30", "13:30", "18:15"]),
    ];

    crate::tests::init_tracing();
    let mut session = Session::new(portal.clone(), test_config());
    let report = session.run(&entries, token).await;

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(session.state(), RunState::Failed);
    assert_eq!(report.records[0].status, EntryStatus::VerifiedCorrect);
    assert_eq!(report.records[0].fields.len(), 4);
    assert_eq!(report.records[1].status, EntryStatus::NotProcessed);
    assert_eq!(report.counts.verified_correct, 1);
    assert_eq!(report.counts.not_processed, 1);
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn existing_session_skips_the_login_form() {
    let portal = Arc::new(FakePortal::with_rows(&["04/10/2025"]).already_logged_in());
    let entries = [entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, test_config(), &entries).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(state, RunState::Done);
    assert_eq!(report.records[0].status, EntryStatus::VerifiedCorrect);

    // The login form never rendered, so nothing was typed into it.
    assert!(portal.input_value("txtUser").is_none());
    assert!(portal.input_value("txtPass").is_none());
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn missing_save_control_is_fatal_after_writes() {
    let portal = Arc::new(FakePortal::with_rows(&["04/10/2025"]).without_save_control());
    let mut config = test_config();
    config.save = vec![SelectorCandidate::new(
        Selector::from("#GB_btnSalvar_tblabel"),
        Duration::from_millis(40),
    )];
    let entries = [entry("04/10/2025", ["09:00", "12:00", "13:00", "18:00"])];

    let (report, state) = run(&portal, config, &entries).await;

    match &report.status {
        RunStatus::Failed { error } => {
            assert!(error.contains("Commit failed"), "error was: {error}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(state, RunState::Failed);
    // Written but never committed, so never verified.
    assert_eq!(report.records[0].status, EntryStatus::NotProcessed);
    assert_eq!(portal.open_context_count(), 0);
}

#[tokio::test]
async fn report_preserves_request_order_across_mixed_outcomes() {
    let portal = Arc::new(FakePortal::with_rows(&["03/10/2025", "05/10/2025"]));
    let entries = [
        entry("05/10/2025", ["09:00", "12:00", "13:00", "18:00"]),
        entry("01/01/2030", ["09:00", "12:00", "13:00", "18:00"]),
        entry("03/10/2025", ["08:50", "12:10", "13:10", "17:50"]),
    ];

    let (report, _) = run(&portal, test_config(), &entries).await;

    let dates: Vec<&str> = report.records.iter().map(|r| r.date_key.as_str()).collect();
    assert_eq!(dates, ["05/10/2025", "01/01/2030", "03/10/2025"]);
    assert_eq!(report.records[0].status, EntryStatus::VerifiedCorrect);
    assert_eq!(report.records[1].status, EntryStatus::NotFound);
    assert_eq!(report.records[2].status, EntryStatus::VerifiedCorrect);
}
