//! The checkout wizard step flow.

mod state_machine;
mod step;

pub use state_machine::{
    EmailAvailability, PaymentPhase, PlanPhase, WizardAction, WizardEvent, WizardState,
    WizardStateMachine, PROGRESS_STAGES,
};
pub use step::{personal_primary_action, PersonalPrimaryAction, Step};
