use thiserror::Error;

/// Failure of a collaborator API call, classified for user messaging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server responded with a non-success status.
    #[error("server rejected request with status {status}")]
    Status { status: u16, message: Option<String> },

    /// The request never produced a server response.
    #[error("network error: {0}")]
    Network(String),

    /// The server responded but the body was not what we expect.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when a server response was received (as opposed to a
    /// transport failure). Drives the payment-step error wording.
    pub fn server_responded(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Decode(_))
    }

    /// The server-provided message, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Fixed status-to-text mapping for the account step's
    /// create-or-update call. Everything funnels into one of six
    /// human-readable messages; nothing retries automatically.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Status { status: 400, .. } => "Please check your information and try again.",
            Self::Status { status: 401, .. } => {
                "Your session has expired. Please refresh the page."
            }
            Self::Status { status: 409, .. } => "Some of your information is already in use.",
            Self::Status { status: 429, .. } => {
                "Too many attempts. Please wait a moment and try again."
            }
            Self::Status { status: 500, .. } => "Server error. Please try again later.",
            _ => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store failed: {0}")]
    Store(String),

    #[error("session data corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_the_fixed_set() {
        let cases = [
            (400, "Please check your information and try again."),
            (401, "Your session has expired. Please refresh the page."),
            (409, "Some of your information is already in use."),
            (429, "Too many attempts. Please wait a moment and try again."),
            (500, "Server error. Please try again later."),
            (503, "Something went wrong. Please try again."),
        ];
        for (status, expected) in cases {
            let err = ApiError::Status {
                status,
                message: None,
            };
            assert_eq!(err.user_message(), expected);
        }
        assert_eq!(
            ApiError::Network("timed out".into()).user_message(),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn network_errors_are_not_server_responses() {
        assert!(!ApiError::Network("refused".into()).server_responded());
        assert!(ApiError::Status {
            status: 500,
            message: None
        }
        .server_responded());
    }
}
