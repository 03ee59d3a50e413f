pub mod email_availability;
pub mod notifications;
pub mod session_identity;
pub mod verification;
pub mod wizard;

pub use email_availability::EmailAvailabilityProbe;
pub use notifications::NotificationCenter;
pub use session_identity::SessionIdentityService;
pub use verification::VerificationOrchestrator;
pub use wizard::{WizardOrchestrator, WizardUiEvent};
