//! Debounced email availability probe.
//!
//! Every keystroke invalidates the previous probe. After a quiet
//! period the availability endpoint is asked once; a stale reply
//! (superseded by a newer edit) is dropped by generation check rather
//! than by cancelling the HTTP request.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use cw_core::ports::CheckoutApiPort;
use cw_core::validation::validate_email_shape;
use cw_core::wizard::EmailAvailability;

use crate::usecases::wizard::events::{EventFanout, WizardUiEvent};

struct ProbeInner {
    availability: EmailAvailability,
    debounce_task: Option<AbortHandle>,
    generation: u64,
}

#[derive(Clone)]
pub struct EmailAvailabilityProbe {
    api: Arc<dyn CheckoutApiPort>,
    debounce: Duration,
    events: EventFanout,
    inner: Arc<Mutex<ProbeInner>>,
}

impl EmailAvailabilityProbe {
    pub fn new(api: Arc<dyn CheckoutApiPort>, debounce: Duration, events: EventFanout) -> Self {
        Self {
            api,
            debounce,
            events,
            inner: Arc::new(Mutex::new(ProbeInner {
                availability: EmailAvailability::Unknown,
                debounce_task: None,
                generation: 0,
            })),
        }
    }

    pub async fn availability(&self) -> EmailAvailability {
        self.inner.lock().await.availability
    }

    /// Record an email edit and (re)arm the probe.
    pub async fn email_changed(&self, email: String) {
        let generation = {
            let mut inner = self.inner.lock().await;
            if let Some(task) = inner.debounce_task.take() {
                task.abort();
            }
            inner.generation += 1;

            if !validate_email_shape(&email) {
                self.set_availability(&mut inner, EmailAvailability::Unknown)
                    .await;
                return;
            }
            self.set_availability(&mut inner, EmailAvailability::Checking)
                .await;
            inner.generation
        };

        let probe = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(probe.debounce).await;
            probe.run_probe(generation, email).await;
        });
        self.inner.lock().await.debounce_task = Some(handle.abort_handle());
    }

    async fn run_probe(&self, generation: u64, email: String) {
        let result = self.api.check_email_availability(&email).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            // A newer edit owns the field now.
            return;
        }
        let availability = match result {
            Ok(true) => EmailAvailability::Available,
            Ok(false) => EmailAvailability::Taken,
            Err(error) => {
                debug!(?error, "email availability probe failed");
                EmailAvailability::Unknown
            }
        };
        self.set_availability(&mut inner, availability).await;
    }

    async fn set_availability(&self, inner: &mut ProbeInner, availability: EmailAvailability) {
        if inner.availability == availability {
            return;
        }
        inner.availability = availability;
        self.events
            .emit(WizardUiEvent::EmailAvailabilityChanged { availability })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use cw_core::cart::Cart;
    use cw_core::payment::PaymentSubmission;
    use cw_core::ports::{ApiError, CheckoutSubmission};
    use cw_core::CheckoutSessionId;

    #[derive(Default)]
    struct ProbeApi {
        calls: AtomicUsize,
        taken: bool,
        fail: bool,
    }

    #[async_trait]
    impl CheckoutApiPort for ProbeApi {
        async fn generate_checkout_id(&self) -> Result<CheckoutSessionId, ApiError> {
            Ok(CheckoutSessionId::new("ck_test"))
        }

        async fn update_checkout_id(
            &self,
            _old: &CheckoutSessionId,
            _new: &CheckoutSessionId,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn create_or_update_checkout(
            &self,
            _submission: &CheckoutSubmission,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn check_email_availability(&self, _email: &str) -> Result<bool, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Network("refused".into()));
            }
            Ok(!self.taken)
        }

        async fn get_cart(&self, _session_id: &CheckoutSessionId) -> Result<Cart, ApiError> {
            Ok(Cart::default())
        }

        async fn link_account(&self, _session_id: &CheckoutSessionId) -> Result<(), ApiError> {
            Ok(())
        }

        async fn process_payment(&self, _payment: &PaymentSubmission) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn probe(api: ProbeApi) -> (EmailAvailabilityProbe, Arc<ProbeApi>) {
        let api = Arc::new(api);
        let probe = EmailAvailabilityProbe::new(
            api.clone(),
            Duration::from_millis(10),
            EventFanout::new(),
        );
        (probe, api)
    }

    #[tokio::test]
    async fn resolves_available_after_the_debounce() {
        let (probe, api) = probe(ProbeApi::default());

        probe.email_changed("ada@example.com".into()).await;
        assert_eq!(probe.availability().await, EmailAvailability::Checking);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.availability().await, EmailAvailability::Available);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rapid_edits_probe_once() {
        let (probe, api) = probe(ProbeApi::default());

        probe.email_changed("a@example.com".into()).await;
        probe.email_changed("ab@example.com".into()).await;
        probe.email_changed("abc@example.com".into()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_the_api() {
        let (probe, api) = probe(ProbeApi::default());

        probe.email_changed("not-an-email".into()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(probe.availability().await, EmailAvailability::Unknown);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn taken_email_is_reported() {
        let (probe, _api) = probe(ProbeApi {
            taken: true,
            ..ProbeApi::default()
        });

        probe.email_changed("taken@example.com".into()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.availability().await, EmailAvailability::Taken);
    }

    #[tokio::test]
    async fn probe_failure_leaves_availability_unknown() {
        let (probe, _api) = probe(ProbeApi {
            fail: true,
            ..ProbeApi::default()
        });

        probe.email_changed("ada@example.com".into()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.availability().await, EmailAvailability::Unknown);
    }
}
