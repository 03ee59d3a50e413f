//! Headless checkout wizard engine.
//!
//! Drives a five step checkout flow (personal details, account,
//! plan confirmation, review, payment) as a pure state machine with
//! async orchestration around it. Frontends call into the
//! [`WizardOrchestrator`] and render from the [`WizardUiEvent`]
//! stream; all HTTP, persistence, and timing concerns live behind
//! ports in `cw-core`.

pub mod bootstrap;
pub mod settings;

pub use bootstrap::{build_engine, build_with_ports, init_tracing, Engine};
pub use settings::EngineSettings;

pub use cw_app::{
    EmailAvailabilityProbe, EventFanout, NotificationCenter, SessionIdentityService,
    VerificationOrchestrator, WizardConfig, WizardEventPort, WizardOrchestrator, WizardUiEvent,
};
pub use cw_core::wizard::{PaymentPhase, PlanPhase};
pub use cw_core::{
    Cart, CartItem, CheckoutSession, CheckoutSessionId, FormPatch, FormRecord, Notification,
    PaymentRecord, Severity, Step, VerificationState, WizardState,
};
