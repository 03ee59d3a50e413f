//! # cw-core
//!
//! Core domain models and business logic for the checkout wizard.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod cart;
pub mod country;
pub mod form;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod session;
pub mod validation;
pub mod verification;
pub mod wizard;

// Re-export commonly used types at the crate root
pub use cart::{Cart, CartItem};
pub use country::{Country, CountryCode, COUNTRIES};
pub use form::{FormPatch, FormRecord};
pub use notification::{Notification, NotificationQueue, Severity};
pub use payment::{PaymentRecord, PaymentSubmission};
pub use session::{CheckoutSession, CheckoutSessionId};
pub use verification::{VerificationState, VerificationStateMachine};
pub use wizard::{Step, WizardState, WizardStateMachine};
