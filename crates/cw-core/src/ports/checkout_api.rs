//! Checkout service port - abstracts the remote checkout collaborator.
//!
//! Use cases drive the wizard through this trait without knowing
//! whether the backend is HTTP, a fixture, or a test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::form::FormRecord;
use crate::payment::PaymentSubmission;
use crate::ports::errors::ApiError;
use crate::session::CheckoutSessionId;

/// Flattened wire record sent on create-or-update. Built from the
/// form at submission time so the form itself never learns the
/// collaborator's field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSubmission {
    pub session_id: CheckoutSessionId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub zipcode: String,
    pub state: String,
    pub city: String,
    pub street: String,
    pub additional: String,
    pub username: String,
    pub passphrase: String,
}

impl CheckoutSubmission {
    pub fn from_form(form: &FormRecord, session_id: &CheckoutSessionId) -> Self {
        Self {
            session_id: session_id.clone(),
            name: form.full_name(),
            email: form.email().to_string(),
            phone: form.full_phone(),
            zipcode: form.zip_code.clone(),
            state: form.state.clone(),
            city: form.city.clone(),
            street: form.street.clone(),
            additional: form.additional.clone(),
            username: form.username().to_string(),
            passphrase: form.password().to_string(),
        }
    }
}

#[async_trait]
pub trait CheckoutApiPort: Send + Sync {
    /// Mint a fresh checkout session identity on the server.
    async fn generate_checkout_id(&self) -> Result<CheckoutSessionId, ApiError>;

    /// Atomically re-point the checkout record from `old` to `new`.
    /// Used right before payment submission, after minting `new`.
    async fn update_checkout_id(
        &self,
        old: &CheckoutSessionId,
        new: &CheckoutSessionId,
    ) -> Result<(), ApiError>;

    /// Persist the collected form against the session. Idempotent on
    /// the server side; safe to call again after a rejection.
    async fn create_or_update_checkout(
        &self,
        submission: &CheckoutSubmission,
    ) -> Result<(), ApiError>;

    /// True when the address is free to register.
    async fn check_email_availability(&self, email: &str) -> Result<bool, ApiError>;

    /// Fetch the cart with server-computed totals.
    async fn get_cart(&self, session_id: &CheckoutSessionId) -> Result<Cart, ApiError>;

    /// Associate the pending account with the cart's plan.
    async fn link_account(&self, session_id: &CheckoutSessionId) -> Result<(), ApiError>;

    /// Submit card details for processing.
    async fn process_payment(&self, payment: &PaymentSubmission) -> Result<(), ApiError>;
}

#[cfg(test)]
mockall::mock! {
    pub CheckoutApi {}

    #[async_trait]
    impl CheckoutApiPort for CheckoutApi {
        async fn generate_checkout_id(&self) -> Result<CheckoutSessionId, ApiError>;
        async fn update_checkout_id(
            &self,
            old: &CheckoutSessionId,
            new: &CheckoutSessionId,
        ) -> Result<(), ApiError>;
        async fn create_or_update_checkout(
            &self,
            submission: &CheckoutSubmission,
        ) -> Result<(), ApiError>;
        async fn check_email_availability(&self, email: &str) -> Result<bool, ApiError>;
        async fn get_cart(&self, session_id: &CheckoutSessionId) -> Result<Cart, ApiError>;
        async fn link_account(&self, session_id: &CheckoutSessionId) -> Result<(), ApiError>;
        async fn process_payment(&self, payment: &PaymentSubmission) -> Result<(), ApiError>;
    }
}
