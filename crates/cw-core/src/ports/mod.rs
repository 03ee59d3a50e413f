//! Port interfaces for the application layer
//!
//! Ports define the contract between the wizard's use cases and the
//! infrastructure that talks to remote collaborators or local storage.
//! The core stays free of HTTP and filesystem concerns.

pub mod address_lookup;
pub mod checkout_api;
mod clock;
pub mod errors;
pub mod session_store;
pub mod verification_api;

pub use address_lookup::{AddressLookupPort, ZipPlace};
pub use checkout_api::{CheckoutApiPort, CheckoutSubmission};
pub use clock::*;
pub use errors::{ApiError, SessionStoreError};
pub use session_store::SessionStorePort;
pub use verification_api::VerificationApiPort;

#[cfg(test)]
pub use address_lookup::MockAddressLookup;
#[cfg(test)]
pub use checkout_api::MockCheckoutApi;
#[cfg(test)]
pub use clock::MockClock;
#[cfg(test)]
pub use session_store::MockSessionStore;
#[cfg(test)]
pub use verification_api::MockVerificationApi;
