pub mod events;
pub mod orchestrator;

pub use events::{EventFanout, WizardEventPort, WizardUiEvent};
pub use orchestrator::WizardOrchestrator;
