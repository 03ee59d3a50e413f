//! Phone MFA verification domain.

mod state_machine;

pub use state_machine::{
    VerificationAction, VerificationEvent, VerificationPolicy, VerificationState,
    VerificationStateMachine,
};
