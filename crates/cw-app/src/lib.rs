//! Checkout wizard orchestration layer
//!
//! This crate contains the use cases that drive the pure machines in
//! `cw-core`: session identity, phone verification, email availability
//! probing, notifications, and the wizard itself.

pub mod config;
pub mod usecases;

pub use config::WizardConfig;
pub use usecases::wizard::{EventFanout, WizardEventPort, WizardUiEvent};
pub use usecases::{
    EmailAvailabilityProbe, NotificationCenter, SessionIdentityService, VerificationOrchestrator,
    WizardOrchestrator,
};
