use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-issued opaque checkout session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutSessionId(String);

impl CheckoutSessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CheckoutSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The one durable artifact of a wizard run: the active session id and
/// when it was issued. Persisted through the session store port and read
/// back on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(id: CheckoutSessionId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }
}
