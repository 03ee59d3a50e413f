use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::errors::ApiError;

/// State and city resolved from a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipPlace {
    pub state: String,
    pub city: String,
}

/// Postal-code lookup. Best-effort: `Ok(None)` means the code is
/// unknown, and callers treat any failure the same way.
#[async_trait]
pub trait AddressLookupPort: Send + Sync {
    async fn lookup_zip(&self, zip: &str) -> Result<Option<ZipPlace>, ApiError>;
}

#[cfg(test)]
mockall::mock! {
    pub AddressLookup {}

    #[async_trait]
    impl AddressLookupPort for AddressLookup {
        async fn lookup_zip(&self, zip: &str) -> Result<Option<ZipPlace>, ApiError>;
    }
}
