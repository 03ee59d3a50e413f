use crate::ports::errors::SessionStoreError;
use crate::session::CheckoutSession;

/// Local persistence for the checkout session identity, so a restart
/// resumes the same checkout instead of minting a new one.
pub trait SessionStorePort: Send + Sync {
    /// Load the stored session, if any.
    fn load_session(&self) -> Result<Option<CheckoutSession>, SessionStoreError>;

    /// Store the session. Must be idempotent (overwrite if exists).
    fn store_session(&self, session: &CheckoutSession) -> Result<(), SessionStoreError>;

    /// Forget the stored session.
    fn clear_session(&self) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mockall::mock! {
    pub SessionStore {}

    impl SessionStorePort for SessionStore {
        fn load_session(&self) -> Result<Option<CheckoutSession>, SessionStoreError>;
        fn store_session(&self, session: &CheckoutSession) -> Result<(), SessionStoreError>;
        fn clear_session(&self) -> Result<(), SessionStoreError>;
    }
}
