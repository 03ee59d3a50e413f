//! ZIP code lookup against the zippopotam.us shape.
//!
//! An unknown zip is a 404, which maps to `Ok(None)`.

use async_trait::async_trait;
use serde::Deserialize;

use cw_core::ports::{AddressLookupPort, ApiError, ZipPlace};

use super::{network_error, status_error};

pub const DEFAULT_ZIP_LOOKUP_URL: &str = "https://api.zippopotam.us";

pub struct ZippopotamClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ZipResponse {
    places: Vec<ZipResponsePlace>,
}

#[derive(Debug, Deserialize)]
struct ZipResponsePlace {
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    #[serde(rename = "place name")]
    place_name: String,
}

impl ZippopotamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ZippopotamClient {
    fn default() -> Self {
        Self::new(DEFAULT_ZIP_LOOKUP_URL)
    }
}

#[async_trait]
impl AddressLookupPort for ZippopotamClient {
    async fn lookup_zip(&self, zip: &str) -> Result<Option<ZipPlace>, ApiError> {
        let response = self
            .client
            .get(format!("{}/us/{}", self.base_url, zip))
            .send()
            .await
            .map_err(network_error)?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: ZipResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.places.into_iter().next().map(|place| ZipPlace {
            state: place.state_abbreviation,
            city: place.place_name,
        }))
    }
}
