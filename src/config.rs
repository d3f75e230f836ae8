//! Run configuration: locator contracts, credentials and timing knobs.
//!
//! Everything the original operators hardcoded (portal URLs, element ids,
//! pause lengths) lives here as explicit configuration injected at
//! construction. Nothing in this crate reads credentials from module scope
//! or the process environment.

use std::time::Duration;

use crate::resolver::SelectorCandidate;
use crate::rows::{GridSchema, LabelPattern};
use crate::selector::Selector;
use crate::types::Credentials;

/// Pacing and wait budgets for every suspension point in a run.
///
/// All of these are heuristics tied to the portal's own latency; treat them
/// as tuning knobs per deployment rather than constants.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Pause after each field write, letting client-side validation settle.
    pub settle_delay: Duration,
    /// Window for the portal's asynchronous save acknowledgement.
    pub ack_wait: Duration,
    /// Wait after navigation-style clicks (login, menu, refresh).
    pub nav_wait: Duration,
    /// Budget for an expected popup to appear.
    pub popup_timeout: Duration,
    /// How long to probe for the login form before assuming an existing
    /// session skipped it.
    pub login_probe: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            ack_wait: Duration::from_secs(3),
            nav_wait: Duration::from_secs(3),
            popup_timeout: Duration::from_secs(5),
            login_probe: Duration::from_secs(3),
        }
    }
}

/// Locators for the portal's login form.
#[derive(Debug, Clone)]
pub struct LoginLocators {
    pub user_field: Selector,
    pub secret_field: Selector,
    /// Known variants of the submit control, in preference order.
    pub submit: Vec<SelectorCandidate>,
}

/// One click-navigable menu step. The last step of the sequence is the one
/// expected to surface the data-entry form.
#[derive(Debug, Clone)]
pub struct MenuStep {
    pub candidates: Vec<SelectorCandidate>,
}

/// Complete configuration for one automation run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub login_url: String,
    pub credentials: Credentials,
    pub login: LoginLocators,
    pub menu: Vec<MenuStep>,
    /// Whether the final menu step is expected to spawn a popup context.
    /// When true, the form must appear in a new context within
    /// `Timing::popup_timeout`; when false the form may render in-page and
    /// the tracker arbitrates where it landed.
    pub expect_popup: bool,
    /// The form's shared justification field.
    pub justification_field: Selector,
    pub schema: GridSchema,
    /// Known variants of the save control.
    pub save: Vec<SelectorCandidate>,
    /// Known variants of the primary view's refresh control.
    pub refresh: Vec<SelectorCandidate>,
    pub timing: Timing,
}

impl SessionConfig {
    /// Configuration matching the card-mirror timesheet portal this engine
    /// was written against. Other deployments start from this and override
    /// the drifted locators.
    pub fn card_mirror_portal(login_url: impl Into<String>, credentials: Credentials) -> Self {
        let timing = Timing::default();
        let candidate =
            |s: &str, t: Duration| SelectorCandidate::new(Selector::from(s), t);

        Self {
            login_url: login_url.into(),
            credentials,
            login: LoginLocators {
                user_field: Selector::from("#txtUser"),
                secret_field: Selector::from("#txtPass"),
                submit: vec![
                    candidate("#btnLogin", Duration::from_secs(3)),
                    candidate("css:input[type=\"submit\"]", Duration::from_secs(2)),
                    candidate("text:Entrar", Duration::from_secs(2)),
                ],
            },
            menu: vec![
                MenuStep {
                    candidates: vec![candidate(
                        "#ctl18_REC_PtoEspCartaoActionWeb_LinkControl",
                        Duration::from_secs(5),
                    )],
                },
                MenuStep {
                    candidates: vec![candidate("#ctl26_ctl01_ctl01", Duration::from_secs(3))],
                },
                MenuStep {
                    candidates: vec![
                        candidate(
                            "css:td.DropDownMenuItemTextCell",
                            Duration::from_secs(3),
                        ),
                        candidate("text:Entrada de Batidas", Duration::from_secs(2)),
                    ],
                },
            ],
            expect_popup: true,
            justification_field: Selector::from("#GB_txtJustificativa"),
            schema: GridSchema {
                entry_labels: LabelPattern::new("GB_l", "_lblData"),
                input_prefix: "GB_l".into(),
                input_infix: "_txt".into(),
                field_tags: [
                    "Ent1".into(),
                    "Sai1".into(),
                    "Ent2".into(),
                    "Sai2".into(),
                ],
                review_labels: LabelPattern::new("GB_l", "_lblData"),
                review_table: Selector::from("#gridEspelhoCartao"),
                first_value_column: 3,
            },
            save: vec![
                candidate("#GB_btnSalvar_tblabel", Duration::from_secs(5)),
                candidate("text:Salvar", Duration::from_secs(2)),
            ],
            refresh: vec![
                candidate("#ctl26_btnAtualizar_tblabel", Duration::from_secs(5)),
                candidate("text:Atualizar", Duration::from_secs(2)),
            ],
            timing,
        }
    }
}
