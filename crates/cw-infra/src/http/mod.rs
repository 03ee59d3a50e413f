//! HTTP adapters for the remote collaborators.
//!
//! The checkout and verification services share a `{status, message,
//! data}` envelope; the zip lookup speaks the zippopotam shape.

pub mod checkout_client;
pub mod verification_client;
pub mod zip_lookup;

pub use checkout_client::HttpCheckoutClient;
pub use verification_client::HttpVerificationClient;
pub use zip_lookup::ZippopotamClient;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use cw_core::ports::ApiError;

/// The collaborators' response envelope. `data` is absent on errors and
/// on calls that return nothing.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[allow(dead_code)]
    pub status: String,
    pub message: Option<String>,
    pub data: Option<T>,
}

pub(crate) fn network_error(error: reqwest::Error) -> ApiError {
    ApiError::Network(error.to_string())
}

/// Classify a non-2xx response, salvaging the envelope message when
/// the body carries one.
pub(crate) async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message),
        Err(_) => None,
    };
    ApiError::Status { status, message }
}

/// Parse a 2xx response whose envelope must carry `data`.
pub(crate) async fn parse_data<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let body = response.text().await.map_err(network_error)?;
    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response envelope missing data".to_string()))
}
