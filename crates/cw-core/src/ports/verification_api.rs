use async_trait::async_trait;

use crate::ports::errors::ApiError;

/// Phone verification collaborator. `phone` is the full number with its
/// dialing prefix; the email identifies the pending account server-side.
#[async_trait]
pub trait VerificationApiPort: Send + Sync {
    /// Ask the server to text a one-time code to the number.
    async fn send_code(&self, phone: &str, email: &str) -> Result<(), ApiError>;

    /// Check a code the user typed against the pending account for
    /// `email`. Ok(true) on match.
    async fn verify_code(&self, code: &str, email: &str) -> Result<bool, ApiError>;

    /// Send a fresh code, invalidating the previous one.
    async fn resend_code(&self, phone: &str, email: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mockall::mock! {
    pub VerificationApi {}

    #[async_trait]
    impl VerificationApiPort for VerificationApi {
        async fn send_code(&self, phone: &str, email: &str) -> Result<(), ApiError>;
        async fn verify_code(&self, code: &str, email: &str) -> Result<bool, ApiError>;
        async fn resend_code(&self, phone: &str, email: &str) -> Result<(), ApiError>;
    }
}
