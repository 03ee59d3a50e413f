//! Infrastructure adapters for the checkout wizard: HTTP clients for
//! the remote collaborators, the session file store, and the clock.

pub mod fs;
pub mod http;
pub mod time;

pub use fs::FileSessionStore;
pub use http::{HttpCheckoutClient, HttpVerificationClient, ZippopotamClient};
pub use time::SystemClock;
