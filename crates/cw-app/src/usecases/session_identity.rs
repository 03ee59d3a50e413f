//! Checkout session identity.
//!
//! The session id is minted server-side at most once per wizard run.
//! The creation latch is sticky: a failed attempt does not re-arm it,
//! so later steps surface "no session" instead of silently minting a
//! second identity. A previously persisted session is reused across
//! restarts.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use cw_core::ports::{CheckoutApiPort, ClockPort, SessionStorePort};
use cw_core::{CheckoutSession, CheckoutSessionId};

struct IdentityInner {
    session: Option<CheckoutSession>,
    create_attempted: bool,
}

pub struct SessionIdentityService {
    api: Arc<dyn CheckoutApiPort>,
    store: Arc<dyn SessionStorePort>,
    clock: Arc<dyn ClockPort>,
    inner: Mutex<IdentityInner>,
}

impl SessionIdentityService {
    pub fn new(
        api: Arc<dyn CheckoutApiPort>,
        store: Arc<dyn SessionStorePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            api,
            store,
            clock,
            inner: Mutex::new(IdentityInner {
                session: None,
                create_attempted: false,
            }),
        }
    }

    /// The active session id, if one exists.
    pub async fn current(&self) -> Option<CheckoutSessionId> {
        self.inner.lock().await.session.as_ref().map(|s| s.id.clone())
    }

    /// Resolve the session id, minting one on first call.
    ///
    /// Resolution order: in-memory, then the local store, then one
    /// server mint guarded by the latch. Returns `None` when the mint
    /// already failed once this run.
    pub async fn ensure_session(&self) -> Result<Option<CheckoutSessionId>> {
        let mut inner = self.inner.lock().await;

        if let Some(session) = &inner.session {
            return Ok(Some(session.id.clone()));
        }

        match self.store.load_session() {
            Ok(Some(session)) => {
                info!(session_id = %session.id, "resuming persisted checkout session");
                let id = session.id.clone();
                inner.session = Some(session);
                return Ok(Some(id));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(?error, "session store unreadable, minting a fresh session");
            }
        }

        if inner.create_attempted {
            return Ok(None);
        }
        inner.create_attempted = true;

        let id = self
            .api
            .generate_checkout_id()
            .await
            .context("failed to mint checkout session id")?;
        let session = CheckoutSession::new(id.clone(), self.clock.now());
        if let Err(error) = self.store.store_session(&session) {
            // The run continues with the in-memory id.
            warn!(?error, "failed to persist checkout session");
        }
        info!(session_id = %id, "checkout session created");
        inner.session = Some(session);

        Ok(Some(id))
    }

    /// Swap the id for a fresh one right before payment: mint a new
    /// id, then re-point the checkout record old-to-new.
    ///
    /// Rotation is best-effort: on any failure the previous id stays
    /// active and the payment proceeds with it.
    pub async fn rotate_for_payment(&self) -> Option<CheckoutSessionId> {
        let mut inner = self.inner.lock().await;
        let current = inner.session.clone()?;

        let new_id = match self.api.generate_checkout_id().await {
            Ok(id) => id,
            Err(error) => {
                warn!(?error, "rotation mint failed, keeping previous id");
                return Some(current.id);
            }
        };
        if let Err(error) = self.api.update_checkout_id(&current.id, &new_id).await {
            warn!(?error, "session rotation failed, keeping previous id");
            return Some(current.id);
        }

        let session = CheckoutSession::new(new_id.clone(), self.clock.now());
        if let Err(error) = self.store.store_session(&session) {
            warn!(?error, "failed to persist rotated checkout session");
        }
        info!(old = %current.id, new = %new_id, "checkout session rotated");
        inner.session = Some(session);
        Some(new_id)
    }

    /// Forget the session everywhere. Called after a completed checkout.
    pub async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.session = None;
        self.store
            .clear_session()
            .context("failed to clear persisted session")?;
        Ok(())
    }
}
