//! Phone verification orchestrator.
//!
//! Drives the pure machine from `cw-core::verification`: user input and
//! API outcomes become events, returned actions become API calls and
//! cooldown timer management. The cooldown ticker is one task feeding
//! a tick per second into the event pump, aborted whenever the machine
//! cancels it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;
use tracing::{info_span, Instrument};

use cw_core::ports::VerificationApiPort;
use cw_core::verification::{
    VerificationAction, VerificationEvent, VerificationPolicy, VerificationState,
    VerificationStateMachine,
};

use crate::usecases::wizard::events::{EventFanout, WizardUiEvent};

const SEND_FAILED_MESSAGE: &str = "Failed to send verification code. Please try again.";
const INVALID_CODE_MESSAGE: &str = "Invalid verification code. Please try again.";

#[derive(Clone)]
pub struct VerificationOrchestrator {
    machine: VerificationStateMachine,
    state: Arc<Mutex<VerificationState>>,
    /// Phone and email captured when a code was last requested; resend
    /// and verify reuse them.
    contact: Arc<Mutex<Option<(String, String)>>>,
    cooldown_timer: Arc<Mutex<Option<AbortHandle>>>,
    /// Cooldown ticks arrive through here; the pump task applies them so
    /// the ticker task never runs a transition itself.
    pump: mpsc::UnboundedSender<VerificationEvent>,
    tick_interval: Duration,
    api: Arc<dyn VerificationApiPort>,
    events: EventFanout,
}

impl VerificationOrchestrator {
    pub fn new(
        api: Arc<dyn VerificationApiPort>,
        policy: VerificationPolicy,
        tick_interval: Duration,
        events: EventFanout,
    ) -> Self {
        let (pump_tx, mut pump_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            machine: VerificationStateMachine::new(policy),
            state: Arc::new(Mutex::new(VerificationState::Idle)),
            contact: Arc::new(Mutex::new(None)),
            cooldown_timer: Arc::new(Mutex::new(None)),
            pump: pump_tx,
            tick_interval,
            api,
            events,
        };
        // Must run inside the Tokio runtime that drives the wizard.
        let pump = orchestrator.clone();
        tokio::spawn(async move {
            while let Some(event) = pump_rx.recv().await {
                pump.process_event(event).await;
            }
        });
        orchestrator
    }

    pub async fn state(&self) -> VerificationState {
        self.state.lock().await.clone()
    }

    pub async fn is_verified(&self) -> bool {
        self.state.lock().await.is_verified()
    }

    /// User asked for a code to be sent to `phone`.
    pub async fn request_code(&self, phone_valid: bool, phone: String, email: String) {
        let span = info_span!("verification.request_code", phone_valid);
        async {
            *self.contact.lock().await = Some((phone, email));
            self.process_event(VerificationEvent::SendRequested { phone_valid })
                .await;
        }
        .instrument(span)
        .await
    }

    /// Code input changed; six digits auto-submit.
    pub async fn code_changed(&self, code: String) {
        self.process_event(VerificationEvent::CodeChanged { code })
            .await;
    }

    pub async fn resend(&self) {
        self.process_event(VerificationEvent::ResendRequested).await;
    }

    /// Phone or country edited; all verification progress is void.
    pub async fn phone_changed(&self) {
        *self.contact.lock().await = None;
        self.process_event(VerificationEvent::PhoneChanged).await;
    }

    async fn process_event(&self, event: VerificationEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (changed, new_state, actions) = {
                let mut state = self.state.lock().await;
                let (next, actions) = self.machine.transition(state.clone(), event);
                let changed = *state != next;
                *state = next.clone();
                (changed, next, actions)
            };
            if changed {
                self.events
                    .emit(WizardUiEvent::VerificationChanged { state: new_state })
                    .await;
            }

            for action in actions {
                if let Some(event) = self.execute_action(action).await {
                    queue.push_back(event);
                }
            }
        }
    }

    async fn execute_action(&self, action: VerificationAction) -> Option<VerificationEvent> {
        match action {
            VerificationAction::CallSendCode => {
                let (phone, email) = self.contact.lock().await.clone()?;
                match self.api.send_code(&phone, &email).await {
                    Ok(()) => Some(VerificationEvent::SendAccepted),
                    Err(error) => Some(VerificationEvent::SendRejected {
                        message: error
                            .server_message()
                            .unwrap_or(SEND_FAILED_MESSAGE)
                            .to_string(),
                    }),
                }
            }
            VerificationAction::CallResendCode => {
                let (phone, email) = self.contact.lock().await.clone()?;
                match self.api.resend_code(&phone, &email).await {
                    Ok(()) => Some(VerificationEvent::SendAccepted),
                    Err(error) => Some(VerificationEvent::SendRejected {
                        message: error
                            .server_message()
                            .unwrap_or(SEND_FAILED_MESSAGE)
                            .to_string(),
                    }),
                }
            }
            VerificationAction::CallVerifyCode { code } => {
                let (_phone, email) = self.contact.lock().await.clone()?;
                match self.api.verify_code(&code, &email).await {
                    Ok(true) => Some(VerificationEvent::ConfirmAccepted),
                    Ok(false) => Some(VerificationEvent::ConfirmRejected {
                        message: INVALID_CODE_MESSAGE.to_string(),
                    }),
                    Err(error) => Some(VerificationEvent::ConfirmRejected {
                        message: error
                            .server_message()
                            .unwrap_or(INVALID_CODE_MESSAGE)
                            .to_string(),
                    }),
                }
            }
            VerificationAction::StartCooldown { seconds } => {
                let pump = self.pump.clone();
                let tick = self.tick_interval;
                let handle = tokio::spawn(async move {
                    for _ in 0..seconds {
                        tokio::time::sleep(tick).await;
                        if pump.send(VerificationEvent::CooldownTick).is_err() {
                            break;
                        }
                    }
                });
                let mut timer = self.cooldown_timer.lock().await;
                if let Some(previous) = timer.replace(handle.abort_handle()) {
                    previous.abort();
                }
                None
            }
            VerificationAction::CancelCooldown => {
                if let Some(handle) = self.cooldown_timer.lock().await.take() {
                    handle.abort();
                }
                None
            }
            VerificationAction::ClearCode => {
                self.events.emit(WizardUiEvent::CodeCleared).await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use cw_core::ports::ApiError;

    #[derive(Default)]
    struct FakeVerificationApi {
        send_calls: AtomicUsize,
        resend_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        last_verify: std::sync::Mutex<Option<(String, String)>>,
        reject_send: bool,
        wrong_code: bool,
    }

    #[async_trait]
    impl VerificationApiPort for FakeVerificationApi {
        async fn send_code(&self, _phone: &str, _email: &str) -> Result<(), ApiError> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_send {
                return Err(ApiError::Status {
                    status: 429,
                    message: Some("Too many codes requested".into()),
                });
            }
            Ok(())
        }

        async fn verify_code(&self, code: &str, email: &str) -> Result<bool, ApiError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_verify.lock().unwrap() = Some((code.to_string(), email.to_string()));
            Ok(!self.wrong_code)
        }

        async fn resend_code(&self, _phone: &str, _email: &str) -> Result<(), ApiError> {
            self.resend_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn orchestrator(
        api: FakeVerificationApi,
        cooldown_secs: u32,
    ) -> (VerificationOrchestrator, Arc<FakeVerificationApi>) {
        let api = Arc::new(api);
        let orchestrator = VerificationOrchestrator::new(
            api.clone(),
            VerificationPolicy {
                cooldown_secs,
                code_len: 6,
            },
            Duration::from_millis(5),
            EventFanout::new(),
        );
        (orchestrator, api)
    }

    async fn request(orchestrator: &VerificationOrchestrator) {
        orchestrator
            .request_code(true, "+15551234567".into(), "ada@example.com".into())
            .await;
    }

    #[tokio::test]
    async fn accepted_send_starts_the_cooldown() {
        let (orchestrator, api) = orchestrator(FakeVerificationApi::default(), 30);
        request(&orchestrator).await;

        assert_eq!(api.send_calls.load(Ordering::SeqCst), 1);
        match orchestrator.state().await {
            VerificationState::CodeSent { cooldown, error } => {
                assert_eq!(cooldown, 30);
                assert_eq!(error, None);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_phone_never_calls_the_api() {
        let (orchestrator, api) = orchestrator(FakeVerificationApi::default(), 30);
        orchestrator
            .request_code(false, "+1555".into(), "ada@example.com".into())
            .await;

        assert_eq!(api.send_calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.state().await, VerificationState::Idle);
    }

    #[tokio::test]
    async fn six_digit_code_auto_submits_and_verifies() {
        let (orchestrator, api) = orchestrator(FakeVerificationApi::default(), 30);
        request(&orchestrator).await;

        orchestrator.code_changed("12345".into()).await;
        assert_eq!(api.verify_calls.load(Ordering::SeqCst), 0);

        orchestrator.code_changed("123456".into()).await;
        assert_eq!(api.verify_calls.load(Ordering::SeqCst), 1);
        assert!(orchestrator.is_verified().await);

        // The confirmation call carries the code and the account email.
        assert_eq!(
            api.last_verify.lock().unwrap().clone(),
            Some(("123456".to_string(), "ada@example.com".to_string()))
        );
    }

    #[tokio::test]
    async fn wrong_code_keeps_code_sent_with_the_error() {
        let (orchestrator, _api) = orchestrator(
            FakeVerificationApi {
                wrong_code: true,
                ..FakeVerificationApi::default()
            },
            30,
        );
        request(&orchestrator).await;
        orchestrator.code_changed("123456".into()).await;

        match orchestrator.state().await {
            VerificationState::CodeSent { error, .. } => {
                assert_eq!(error.as_deref(), Some(INVALID_CODE_MESSAGE));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_send_surfaces_the_server_message() {
        let (orchestrator, _api) = orchestrator(
            FakeVerificationApi {
                reject_send: true,
                ..FakeVerificationApi::default()
            },
            30,
        );
        request(&orchestrator).await;

        match orchestrator.state().await {
            VerificationState::Failed { reason } => {
                assert_eq!(reason, "Too many codes requested");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cooldown_ticks_down_then_resend_is_allowed() {
        let (orchestrator, api) = orchestrator(FakeVerificationApi::default(), 2);
        request(&orchestrator).await;

        // Resend during cooldown is a no-op.
        orchestrator.resend().await;
        assert_eq!(api.resend_calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(orchestrator.state().await.resend_allowed());

        orchestrator.resend().await;
        assert_eq!(api.resend_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn phone_edit_invalidates_a_completed_verification() {
        let (orchestrator, _api) = orchestrator(FakeVerificationApi::default(), 30);
        request(&orchestrator).await;
        orchestrator.code_changed("123456".into()).await;
        assert!(orchestrator.is_verified().await);

        orchestrator.phone_changed().await;
        assert_eq!(orchestrator.state().await, VerificationState::Idle);
    }
}
