//! Wizard step state machine.
//!
//! Pure transition function for the checkout flow. The machine owns the
//! step/phase structure and the guards; the orchestrator in `cw-app`
//! validates input, issues the API calls and timers named by the
//! returned actions, and feeds their outcomes back in as events.
//!
//! ```text
//! Personal
//!  │ PersonalSubmitted (complete ∧ email available ∧ phone verified)
//!  ▼
//! Account ──AccountSubmitted──► (saving) ──CheckoutSaved──► Plan(CheckingCart)
//!  ▲                                └──CheckoutRejected──► Account{error}
//!  │                                                        │
//!  │             ┌── empty ──► Plan(EmptyCart)  (dead end) ◄┘ CartLoaded
//!  │             └── items ──► Plan(Linking) ──► Plan(AwaitingAdvance) ──► Review
//!  │                              └── failure ──► Plan(Failed) ── retry/back
//!  │ ReviewBack (credentials scrubbed)
//!  └──────────── Review ──ReviewNext──► Payment(Editing) ──► Processing ──► Succeeded
//!                                            ▲                  └── failure back to Editing{error}
//!                                            └──────────── PaymentBack goes to Review
//! ```
//!
//! The Plan and Payment phases run a fixed-stage cosmetic progress
//! animation concurrently with the real call; completion requires both
//! (`stage == PROGRESS_STAGES` and a recorded outcome), whichever
//! arrives last.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::step::Step;

/// Resolution state of the asynchronous email-availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailAvailability {
    /// Not checked yet, or invalidated by an email edit.
    Unknown,
    /// Probe in flight (or waiting out the debounce period).
    Checking,
    Available,
    Taken,
}

impl EmailAvailability {
    /// Only a resolved positive result unlocks the personal step.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Automated plan-association phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanPhase {
    /// Fetching the cart to confirm it is non-empty.
    CheckingCart,
    /// Blocking dead end: nothing in the cart, no forward path.
    EmptyCart,
    /// Progress animation running concurrently with the link call.
    /// `stage` counts completed animation stages; the link outcome is
    /// recorded here when it arrives before the animation finishes.
    Linking {
        stage: u8,
        link_result: Option<Result<(), String>>,
    },
    /// Link confirmed; brief dwell before auto-advancing to Review.
    AwaitingAdvance,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPhase {
    Editing {
        error: Option<String>,
    },
    /// Progress modal running concurrently with the payment call.
    Processing {
        stage: u8,
        outcome: Option<Result<(), String>>,
    },
    /// Confirmation shown; external redirect scheduled.
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardState {
    Personal,
    Account {
        error: Option<String>,
        /// Create-or-update call in flight; further submits are rejected.
        saving: bool,
    },
    Plan(PlanPhase),
    Review {
        loading: bool,
        error: Option<String>,
    },
    Payment(PaymentPhase),
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Personal
    }
}

impl WizardState {
    pub fn step(&self) -> Step {
        match self {
            Self::Personal => Step::Personal,
            Self::Account { .. } => Step::Account,
            Self::Plan(_) => Step::Plan,
            Self::Review { .. } => Step::Review,
            Self::Payment(_) => Step::Payment,
        }
    }

    fn account() -> Self {
        Self::Account {
            error: None,
            saving: false,
        }
    }

    fn review_loading() -> Self {
        Self::Review {
            loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    /// Continue pressed on the personal step. Carries the guard results
    /// so the machine stays pure.
    PersonalSubmitted {
        form_complete: bool,
        email_available: EmailAvailability,
        phone_verified: bool,
    },

    /// Continue pressed on the account step.
    AccountSubmitted { password_ok: bool, has_session: bool },
    CheckoutSaved,
    CheckoutRejected { message: String },
    AccountBack,

    /// Cart fetched while entering the plan step.
    CartLoaded { empty: bool },
    CartLoadFailed { message: String },
    /// One cosmetic progress stage elapsed (plan link or payment).
    StageElapsed,
    LinkCompleted { result: Result<(), String> },
    /// Post-link dwell elapsed.
    AdvanceDelayElapsed,
    PlanRetry,
    PlanBack,

    ReviewLoaded,
    ReviewLoadFailed { message: String },
    ReviewBack,
    ReviewNext,

    PaymentSubmitted {
        card_ok: bool,
        terms_accepted: bool,
        has_session: bool,
    },
    PaymentCompleted { result: Result<(), String> },
    PaymentBack,
}

/// Side effects named by transitions, executed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardAction {
    /// Persist the collected form through `create_or_update_checkout`.
    CallCreateCheckout,
    /// Fetch the cart to gate the plan step.
    CallGetCartForPlan,
    /// Fetch the cart for the review summary.
    CallGetCartForReview,
    /// Link the checkout record to the cart's plans.
    CallLinkAccount,
    /// Schedule the next `StageElapsed` after one stage duration.
    StartStageTimer,
    /// Schedule `AdvanceDelayElapsed` after the post-link dwell.
    ScheduleAdvance,
    /// Scrub password + confirm from the form record.
    ClearCredentials,
    /// Rotate the session id (non-fatal) and submit the payment.
    RotateSessionAndPay,
    /// Schedule the external redirect after the configured delay.
    ScheduleRedirect,
}

/// Number of cosmetic progress stages for both the plan-link and the
/// payment animations.
pub const PROGRESS_STAGES: u8 = 4;

/// Pure wizard state machine.
pub struct WizardStateMachine;

impl WizardStateMachine {
    pub fn transition(state: WizardState, event: WizardEvent) -> (WizardState, Vec<WizardAction>) {
        use WizardAction as A;
        use WizardEvent as E;
        use WizardState as S;

        match (state, event) {
            (
                S::Personal,
                E::PersonalSubmitted {
                    form_complete: true,
                    email_available: EmailAvailability::Available,
                    phone_verified: true,
                },
            ) => (S::account(), Vec::new()),
            (S::Personal, E::PersonalSubmitted { .. }) => (S::Personal, Vec::new()),

            (
                S::Account { saving: false, .. },
                E::AccountSubmitted {
                    password_ok: true,
                    has_session: true,
                },
            ) => (
                S::Account {
                    error: None,
                    saving: true,
                },
                vec![A::CallCreateCheckout],
            ),
            // Password invalid, missing session, or a save already in
            // flight: stay put. The orchestrator surfaces the reason.
            (state @ S::Account { .. }, E::AccountSubmitted { .. }) => (state, Vec::new()),
            (S::Account { saving: true, .. }, E::CheckoutSaved) => (
                S::Plan(PlanPhase::CheckingCart),
                vec![A::CallGetCartForPlan],
            ),
            (S::Account { saving: true, .. }, E::CheckoutRejected { message }) => (
                S::Account {
                    error: Some(message),
                    saving: false,
                },
                Vec::new(),
            ),
            (S::Account { saving: false, .. }, E::AccountBack) => (S::Personal, Vec::new()),

            (S::Plan(PlanPhase::CheckingCart), E::CartLoaded { empty: true }) => {
                (S::Plan(PlanPhase::EmptyCart), Vec::new())
            }
            (S::Plan(PlanPhase::CheckingCart), E::CartLoaded { empty: false }) => (
                S::Plan(PlanPhase::Linking {
                    stage: 0,
                    link_result: None,
                }),
                vec![A::StartStageTimer, A::CallLinkAccount],
            ),
            (S::Plan(PlanPhase::CheckingCart), E::CartLoadFailed { message }) => {
                (S::Plan(PlanPhase::Failed { message }), Vec::new())
            }

            (S::Plan(PlanPhase::Linking { stage, link_result }), E::StageElapsed) => {
                let stage = (stage + 1).min(PROGRESS_STAGES);
                if stage < PROGRESS_STAGES {
                    (
                        S::Plan(PlanPhase::Linking { stage, link_result }),
                        vec![A::StartStageTimer],
                    )
                } else {
                    // Animation finished; resolve if the call already did.
                    match link_result {
                        Some(Ok(())) => {
                            (S::Plan(PlanPhase::AwaitingAdvance), vec![A::ScheduleAdvance])
                        }
                        Some(Err(message)) => (S::Plan(PlanPhase::Failed { message }), Vec::new()),
                        None => (
                            S::Plan(PlanPhase::Linking {
                                stage,
                                link_result: None,
                            }),
                            Vec::new(),
                        ),
                    }
                }
            }
            (
                S::Plan(PlanPhase::Linking {
                    stage,
                    link_result: None,
                }),
                E::LinkCompleted { result },
            ) => {
                if stage >= PROGRESS_STAGES {
                    // Call finished after the animation; resolve now.
                    match result {
                        Ok(()) => (S::Plan(PlanPhase::AwaitingAdvance), vec![A::ScheduleAdvance]),
                        Err(message) => (S::Plan(PlanPhase::Failed { message }), Vec::new()),
                    }
                } else {
                    (
                        S::Plan(PlanPhase::Linking {
                            stage,
                            link_result: Some(result),
                        }),
                        Vec::new(),
                    )
                }
            }
            (S::Plan(PlanPhase::AwaitingAdvance), E::AdvanceDelayElapsed) => {
                (S::review_loading(), vec![A::CallGetCartForReview])
            }

            // Retry restarts the automated sequence from scratch.
            (S::Plan(PlanPhase::EmptyCart | PlanPhase::Failed { .. }), E::PlanRetry) => (
                S::Plan(PlanPhase::CheckingCart),
                vec![A::CallGetCartForPlan],
            ),
            (S::Plan(PlanPhase::EmptyCart | PlanPhase::Failed { .. }), E::PlanBack) => {
                (S::account(), Vec::new())
            }

            (S::Review { loading: true, .. }, E::ReviewLoaded) => (
                S::Review {
                    loading: false,
                    error: None,
                },
                Vec::new(),
            ),
            (S::Review { loading: true, .. }, E::ReviewLoadFailed { message }) => (
                S::Review {
                    loading: false,
                    error: Some(message),
                },
                Vec::new(),
            ),
            // Privacy measure: credentials never survive the trip back.
            (S::Review { .. }, E::ReviewBack) => (S::account(), vec![A::ClearCredentials]),
            (S::Review { loading: false, .. }, E::ReviewNext) => {
                (S::Payment(PaymentPhase::Editing { error: None }), Vec::new())
            }

            (
                S::Payment(PaymentPhase::Editing { .. }),
                E::PaymentSubmitted {
                    card_ok: true,
                    terms_accepted: true,
                    has_session: true,
                },
            ) => (
                S::Payment(PaymentPhase::Processing {
                    stage: 0,
                    outcome: None,
                }),
                vec![A::StartStageTimer, A::RotateSessionAndPay],
            ),
            (state @ S::Payment(PaymentPhase::Editing { .. }), E::PaymentSubmitted { .. }) => {
                (state, Vec::new())
            }

            (S::Payment(PaymentPhase::Processing { stage, outcome }), E::StageElapsed) => {
                let stage = (stage + 1).min(PROGRESS_STAGES);
                if stage < PROGRESS_STAGES {
                    (
                        S::Payment(PaymentPhase::Processing { stage, outcome }),
                        vec![A::StartStageTimer],
                    )
                } else {
                    match outcome {
                        Some(Ok(())) => {
                            (S::Payment(PaymentPhase::Succeeded), vec![A::ScheduleRedirect])
                        }
                        Some(Err(message)) => (
                            S::Payment(PaymentPhase::Editing {
                                error: Some(message),
                            }),
                            Vec::new(),
                        ),
                        None => (
                            S::Payment(PaymentPhase::Processing {
                                stage,
                                outcome: None,
                            }),
                            Vec::new(),
                        ),
                    }
                }
            }
            (
                S::Payment(PaymentPhase::Processing {
                    stage,
                    outcome: None,
                }),
                E::PaymentCompleted { result },
            ) => {
                if stage >= PROGRESS_STAGES {
                    match result {
                        Ok(()) => (S::Payment(PaymentPhase::Succeeded), vec![A::ScheduleRedirect]),
                        Err(message) => (
                            S::Payment(PaymentPhase::Editing {
                                error: Some(message),
                            }),
                            Vec::new(),
                        ),
                    }
                } else {
                    (
                        S::Payment(PaymentPhase::Processing {
                            stage,
                            outcome: Some(result),
                        }),
                        Vec::new(),
                    )
                }
            }
            (S::Payment(PaymentPhase::Editing { .. }), E::PaymentBack) => {
                (S::review_loading(), vec![A::CallGetCartForReview])
            }

            // Stale events (late responses for a step already left,
            // timers racing a teardown) are no-ops.
            (state, event) => {
                warn!(?state, ?event, "ignoring event in current state");
                (state, Vec::new())
            }
        }
    }
}
