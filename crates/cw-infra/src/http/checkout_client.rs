//! Checkout service adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cw_core::payment::PaymentSubmission;
use cw_core::ports::{ApiError, CheckoutApiPort, CheckoutSubmission};
use cw_core::{Cart, CheckoutSessionId};

use super::{network_error, parse_data, status_error};

pub struct HttpCheckoutClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CheckoutIdData {
    checkout_id: String,
}

#[derive(Debug, Serialize)]
struct UpdateCheckoutIdBody<'a> {
    old_checkout_id: &'a str,
    new_checkout_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AvailabilityData {
    available: bool,
}

impl HttpCheckoutClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CheckoutApiPort for HttpCheckoutClient {
    async fn generate_checkout_id(&self) -> Result<CheckoutSessionId, ApiError> {
        let response = self
            .client
            .get(self.url("/api/generate-checkout-id"))
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let data: CheckoutIdData = parse_data(response).await?;
        Ok(CheckoutSessionId::new(data.checkout_id))
    }

    async fn update_checkout_id(
        &self,
        old: &CheckoutSessionId,
        new: &CheckoutSessionId,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url("/api/update-checkout-id"))
            .json(&UpdateCheckoutIdBody {
                old_checkout_id: old.as_str(),
                new_checkout_id: new.as_str(),
            })
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn create_or_update_checkout(
        &self,
        submission: &CheckoutSubmission,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/checkout"))
            .json(submission)
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn check_email_availability(&self, email: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(self.url("/api/check-email-availability"))
            .query(&[("email", email)])
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let data: AvailabilityData = parse_data(response).await?;
        Ok(data.available)
    }

    async fn get_cart(&self, session_id: &CheckoutSessionId) -> Result<Cart, ApiError> {
        let response = self
            .client
            .get(self.url("/api/cart"))
            .query(&[("checkout_id", session_id.as_str())])
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let cart: Cart = parse_data(response).await?;
        debug!(items = cart.items.len(), "cart fetched");
        Ok(cart)
    }

    async fn link_account(&self, session_id: &CheckoutSessionId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/link-account"))
            .query(&[("checkout_id", session_id.as_str())])
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn process_payment(&self, payment: &PaymentSubmission) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/process-payment"))
            .json(payment)
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}
