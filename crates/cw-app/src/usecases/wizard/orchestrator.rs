//! Checkout wizard orchestrator
//!
//! Converts user intent, API outcomes and timer expirations into events
//! for the pure machine in `cw-core::wizard`, and executes the actions
//! it returns.
//!
//! ```text
//! User input / API results / Timers
//!   ↓
//! WizardOrchestrator (guards, converts to events)
//!   ↓
//! WizardStateMachine (pure state transitions)
//!   ↓
//! WizardActions (executed here: API calls, timers, scrubbing)
//!   ↓
//! Remote services / session store / UI events
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info_span, warn, Instrument};

use cw_core::country::CountryCode;
use cw_core::ports::{AddressLookupPort, CheckoutApiPort, CheckoutSubmission, ClockPort};
use cw_core::validation::{
    validate_card_number, validate_cvv, validate_email_shape, validate_expiry, PasswordChecks,
};
use cw_core::wizard::{
    personal_primary_action, PaymentPhase, PersonalPrimaryAction, PlanPhase, WizardAction,
    WizardEvent, WizardState, WizardStateMachine,
};
use cw_core::{Cart, FormPatch, FormRecord, PaymentRecord, Severity};

use crate::config::WizardConfig;
use crate::usecases::email_availability::EmailAvailabilityProbe;
use crate::usecases::notifications::NotificationCenter;
use crate::usecases::session_identity::SessionIdentityService;
use crate::usecases::verification::VerificationOrchestrator;
use crate::usecases::wizard::events::{EventFanout, WizardEventPort, WizardUiEvent};

const SESSION_MISSING_MESSAGE: &str =
    "Your session could not be established. Please refresh the page and try again.";
const FORM_INCOMPLETE_MESSAGE: &str = "Please fill in all required fields.";
const EMAIL_TAKEN_MESSAGE: &str = "This email is already in use.";
const EMAIL_PENDING_MESSAGE: &str = "Please wait while we check your email address.";
const PHONE_UNVERIFIED_MESSAGE: &str = "Please verify your phone number first.";
const PASSWORD_INVALID_MESSAGE: &str = "Your password doesn't meet the requirements.";
const CARD_INVALID_MESSAGE: &str = "Please check your card details.";
const TERMS_MESSAGE: &str = "Please accept the terms to continue.";
const PAYMENT_FAILED_MESSAGE: &str = "Payment processing failed. Please try again.";
const PAYMENT_NETWORK_MESSAGE: &str = "Network error. Please try again.";

/// Timers owned by the wizard; at most one of each kind is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WizardTimer {
    Stage,
    Advance,
    Redirect,
}

#[derive(Clone)]
pub struct WizardOrchestrator {
    config: WizardConfig,
    state: Arc<Mutex<WizardState>>,
    form: Arc<Mutex<FormRecord>>,
    payment: Arc<Mutex<PaymentRecord>>,
    cart: Arc<Mutex<Option<Cart>>>,
    timers: Arc<Mutex<HashMap<WizardTimer, AbortHandle>>>,
    /// Timer expirations come back through here; the pump task applies
    /// them so a sleeping timer task never runs a transition itself.
    pump: mpsc::UnboundedSender<WizardEvent>,
    api: Arc<dyn CheckoutApiPort>,
    lookup: Arc<dyn AddressLookupPort>,
    clock: Arc<dyn ClockPort>,
    session: Arc<SessionIdentityService>,
    verification: VerificationOrchestrator,
    email_probe: EmailAvailabilityProbe,
    notifications: NotificationCenter,
    events: EventFanout,
}

impl WizardOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: WizardConfig,
        api: Arc<dyn CheckoutApiPort>,
        lookup: Arc<dyn AddressLookupPort>,
        clock: Arc<dyn ClockPort>,
        session: Arc<SessionIdentityService>,
        verification: VerificationOrchestrator,
        email_probe: EmailAvailabilityProbe,
        notifications: NotificationCenter,
        events: EventFanout,
    ) -> Self {
        let (pump_tx, mut pump_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            config,
            state: Arc::new(Mutex::new(WizardState::default())),
            form: Arc::new(Mutex::new(FormRecord::default())),
            payment: Arc::new(Mutex::new(PaymentRecord::default())),
            cart: Arc::new(Mutex::new(None)),
            timers: Arc::new(Mutex::new(HashMap::new())),
            pump: pump_tx,
            api,
            lookup,
            clock,
            session,
            verification,
            email_probe,
            notifications,
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

    pub async fn subscribe(&self) -> tokio::sync::mpsc::Receiver<WizardUiEvent> {
        self.events.subscribe().await
    }

    pub async fn state(&self) -> WizardState {
        self.state.lock().await.clone()
    }

    pub async fn form(&self) -> FormRecord {
        self.form.lock().await.clone()
    }

    pub async fn cart(&self) -> Option<Cart> {
        self.cart.lock().await.clone()
    }

    pub fn verification(&self) -> &VerificationOrchestrator {
        &self.verification
    }

    /// Mode of the personal step's primary button.
    pub async fn personal_primary_action(&self) -> PersonalPrimaryAction {
        personal_primary_action(&self.verification.state().await)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Establish the session identity up front so later steps don't pay
    /// the mint latency. A failure here is surfaced once; the latch
    /// keeps the account step from minting a second id.
    pub async fn start(&self) {
        let span = info_span!("wizard.start");
        async {
            if let Err(error) = self.session.ensure_session().await {
                warn!(?error, "checkout session could not be established");
                self.notifications
                    .push(Severity::Error, SESSION_MISSING_MESSAGE)
                    .await;
            }
        }
        .instrument(span)
        .await
    }

    // === Form input ===

    /// Merge a field patch, running the side effects an edit implies:
    /// an email change re-arms the availability probe, a phone or
    /// country change voids verification.
    pub async fn update_form(&self, patch: FormPatch) {
        let (email_changed, phone_invalidated, new_email) = {
            let mut form = self.form.lock().await;
            let email_changed = patch
                .email
                .as_deref()
                .is_some_and(|email| email != form.email());
            let phone_edited = patch
                .phone
                .as_deref()
                .is_some_and(|phone| phone != form.phone);
            let country_changed = patch.country.is_some_and(|country| country != form.country);
            form.apply(patch);
            (
                email_changed,
                phone_edited || country_changed,
                form.email().to_string(),
            )
        };

        if email_changed {
            self.email_probe.email_changed(new_email).await;
        }
        if phone_invalidated {
            self.verification.phone_changed().await;
        }
    }

    /// Record a zip edit and, for US five-digit zips, try to auto-fill
    /// state and city. Lookup failures are silent.
    pub async fn zip_changed(&self, zip: String) {
        let country = {
            let mut form = self.form.lock().await;
            form.zip_code = zip.clone();
            form.country
        };

        if country != CountryCode::Us || zip.len() != 5 || !zip.chars().all(|c| c.is_ascii_digit())
        {
            return;
        }

        match self.lookup.lookup_zip(&zip).await {
            Ok(Some(place)) => {
                {
                    let mut form = self.form.lock().await;
                    form.state = place.state.clone();
                    form.city = place.city.clone();
                }
                self.events
                    .emit(WizardUiEvent::AddressAutofilled {
                        state: place.state,
                        city: place.city,
                    })
                    .await;
            }
            Ok(None) => {}
            Err(error) => {
                debug!(?error, zip, "zip lookup failed");
            }
        }
    }

    pub async fn update_payment(&self, payment: PaymentRecord) {
        *self.payment.lock().await = payment;
    }

    // === Verification passthrough ===

    pub async fn request_verification_code(&self) {
        let (phone_valid, phone, email) = {
            let form = self.form.lock().await;
            (
                form.country.validate_phone(&form.phone),
                form.full_phone(),
                form.email().to_string(),
            )
        };
        self.verification
            .request_code(phone_valid, phone, email)
            .await;
    }

    pub async fn verification_code_changed(&self, code: String) {
        self.verification.code_changed(code).await;
    }

    pub async fn resend_verification_code(&self) {
        self.verification.resend().await;
    }

    // === Step navigation ===

    pub async fn submit_personal(&self) {
        let span = info_span!("wizard.submit_personal");
        async {
            let form_complete = {
                let form = self.form.lock().await;
                form.personal_complete()
                    && validate_email_shape(form.email())
                    && form.country.validate_phone(&form.phone)
            };
            let email_available = self.email_probe.availability().await;
            let phone_verified = self.verification.is_verified().await;

            if let Some(message) =
                personal_block_reason(form_complete, email_available, phone_verified)
            {
                self.notifications.push(Severity::Warning, message).await;
            }

            self.process_event(WizardEvent::PersonalSubmitted {
                form_complete,
                email_available,
                phone_verified,
            })
            .await;
        }
        .instrument(span)
        .await
    }

    pub async fn submit_account(&self) {
        let span = info_span!("wizard.submit_account");
        async {
            let password_ok = {
                let form = self.form.lock().await;
                PasswordChecks::evaluate(form.password(), form.confirm_password()).all_ok()
            };
            let has_session = match self.session.ensure_session().await {
                Ok(id) => id.is_some(),
                Err(error) => {
                    warn!(?error, "session mint failed at account submit");
                    false
                }
            };

            if !password_ok {
                self.notifications
                    .push(Severity::Warning, PASSWORD_INVALID_MESSAGE)
                    .await;
            } else if !has_session {
                self.notifications
                    .push(Severity::Error, SESSION_MISSING_MESSAGE)
                    .await;
            }

            self.process_event(WizardEvent::AccountSubmitted {
                password_ok,
                has_session,
            })
            .await;
        }
        .instrument(span)
        .await
    }

    pub async fn account_back(&self) {
        self.process_event(WizardEvent::AccountBack).await;
    }

    pub async fn plan_retry(&self) {
        self.process_event(WizardEvent::PlanRetry).await;
    }

    pub async fn plan_back(&self) {
        self.process_event(WizardEvent::PlanBack).await;
    }

    pub async fn review_back(&self) {
        self.process_event(WizardEvent::ReviewBack).await;
    }

    pub async fn review_next(&self) {
        self.process_event(WizardEvent::ReviewNext).await;
    }

    pub async fn payment_back(&self) {
        self.process_event(WizardEvent::PaymentBack).await;
    }

    pub async fn submit_payment(&self, terms_accepted: bool) {
        let span = info_span!("wizard.submit_payment", terms_accepted);
        async {
            let card_ok = {
                let payment = self.payment.lock().await;
                !payment.card_holder_name.trim().is_empty()
                    && validate_card_number(&payment.card_number)
                    && validate_expiry(&payment.expiry, self.clock.now())
                    && validate_cvv(&payment.cvv)
            };
            let has_session = self.session.current().await.is_some();

            if !card_ok {
                self.notifications
                    .push(Severity::Warning, CARD_INVALID_MESSAGE)
                    .await;
            } else if !terms_accepted {
                self.notifications
                    .push(Severity::Warning, TERMS_MESSAGE)
                    .await;
            } else if !has_session {
                self.notifications
                    .push(Severity::Error, SESSION_MISSING_MESSAGE)
                    .await;
            }

            self.process_event(WizardEvent::PaymentSubmitted {
                card_ok,
                terms_accepted,
                has_session,
            })
            .await;
        }
        .instrument(span)
        .await
    }

    // === Event pump ===

    async fn process_event(&self, event: WizardEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (changed, new_state, actions) = {
                let mut state = self.state.lock().await;
                let (next, actions) = WizardStateMachine::transition(state.clone(), event);
                let changed = *state != next;
                *state = next.clone();
                (changed, next, actions)
            };

            if changed {
                self.retire_timers(&new_state).await;
                let empty_cart = matches!(new_state, WizardState::Plan(PlanPhase::EmptyCart));
                self.events
                    .emit(WizardUiEvent::StateChanged { state: new_state })
                    .await;
                if empty_cart {
                    self.events
                        .emit(WizardUiEvent::EmptyCartPlansLink {
                            url: self.config.plans_url.clone(),
                        })
                        .await;
                }
            }

            for action in actions {
                self.execute_action(action, &mut queue).await;
            }
        }
    }

    /// Abort timers whose owning phase is gone. A late tick would be a
    /// machine no-op anyway; this keeps tasks from outliving their use.
    async fn retire_timers(&self, state: &WizardState) {
        let keep_stage = matches!(
            state,
            WizardState::Plan(PlanPhase::Linking { .. })
                | WizardState::Payment(PaymentPhase::Processing { .. })
        );
        let keep_advance = matches!(state, WizardState::Plan(PlanPhase::AwaitingAdvance));

        let mut timers = self.timers.lock().await;
        if !keep_stage {
            if let Some(handle) = timers.remove(&WizardTimer::Stage) {
                handle.abort();
            }
        }
        if !keep_advance {
            if let Some(handle) = timers.remove(&WizardTimer::Advance) {
                handle.abort();
            }
        }
    }

    async fn arm_timer(&self, kind: WizardTimer, after: std::time::Duration, event: WizardEvent) {
        let pump = self.pump.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = pump.send(event);
        });
        let mut timers = self.timers.lock().await;
        if let Some(previous) = timers.insert(kind, handle.abort_handle()) {
            previous.abort();
        }
    }

    async fn execute_action(&self, action: WizardAction, queue: &mut VecDeque<WizardEvent>) {
        match action {
            WizardAction::CallCreateCheckout => {
                let Some(session_id) = self.session.current().await else {
                    // Guarded upstream; belt and braces for the machine.
                    queue.push_back(WizardEvent::CheckoutRejected {
                        message: SESSION_MISSING_MESSAGE.to_string(),
                    });
                    return;
                };
                let submission = {
                    let form = self.form.lock().await;
                    CheckoutSubmission::from_form(&form, &session_id)
                };
                match self.api.create_or_update_checkout(&submission).await {
                    Ok(()) => queue.push_back(WizardEvent::CheckoutSaved),
                    Err(error) => {
                        let message = error.user_message().to_string();
                        warn!(?error, "create-or-update checkout rejected");
                        self.notifications
                            .push(Severity::Error, message.clone())
                            .await;
                        queue.push_back(WizardEvent::CheckoutRejected { message });
                    }
                }
            }
            WizardAction::CallGetCartForPlan => match self.fetch_cart().await {
                Ok(cart) => {
                    let empty = cart.is_empty();
                    queue.push_back(WizardEvent::CartLoaded { empty });
                }
                Err(message) => {
                    self.notifications
                        .push(Severity::Error, message.clone())
                        .await;
                    queue.push_back(WizardEvent::CartLoadFailed { message });
                }
            },
            WizardAction::CallGetCartForReview => match self.fetch_cart().await {
                Ok(_) => queue.push_back(WizardEvent::ReviewLoaded),
                Err(message) => {
                    self.notifications
                        .push(Severity::Error, message.clone())
                        .await;
                    queue.push_back(WizardEvent::ReviewLoadFailed { message });
                }
            },
            WizardAction::CallLinkAccount => {
                let Some(session_id) = self.session.current().await else {
                    queue.push_back(WizardEvent::LinkCompleted {
                        result: Err(SESSION_MISSING_MESSAGE.to_string()),
                    });
                    return;
                };
                let result = match self.api.link_account(&session_id).await {
                    Ok(()) => Ok(()),
                    Err(error) => {
                        let message = error.user_message().to_string();
                        warn!(?error, "account link failed");
                        self.notifications
                            .push(Severity::Error, message.clone())
                            .await;
                        Err(message)
                    }
                };
                queue.push_back(WizardEvent::LinkCompleted { result });
            }
            WizardAction::StartStageTimer => {
                self.arm_timer(
                    WizardTimer::Stage,
                    self.config.stage_duration,
                    WizardEvent::StageElapsed,
                )
                .await;
            }
            WizardAction::ScheduleAdvance => {
                self.arm_timer(
                    WizardTimer::Advance,
                    self.config.advance_dwell,
                    WizardEvent::AdvanceDelayElapsed,
                )
                .await;
            }
            WizardAction::ClearCredentials => {
                self.form.lock().await.clear_credentials();
                self.events.emit(WizardUiEvent::CredentialsCleared).await;
            }
            WizardAction::RotateSessionAndPay => {
                let Some(session_id) = self.session.rotate_for_payment().await else {
                    queue.push_back(WizardEvent::PaymentCompleted {
                        result: Err(SESSION_MISSING_MESSAGE.to_string()),
                    });
                    return;
                };
                let submission = {
                    let payment = self.payment.lock().await;
                    payment.submission(&session_id)
                };
                let result = match self.api.process_payment(&submission).await {
                    Ok(()) => Ok(()),
                    Err(error) => {
                        let message = if error.server_responded() {
                            PAYMENT_FAILED_MESSAGE
                        } else {
                            PAYMENT_NETWORK_MESSAGE
                        };
                        warn!(?error, "payment processing failed");
                        self.notifications.push(Severity::Error, message).await;
                        Err(message.to_string())
                    }
                };
                queue.push_back(WizardEvent::PaymentCompleted { result });
            }
            WizardAction::ScheduleRedirect => {
                let orchestrator = self.clone();
                let delay = self.config.redirect_delay;
                let url = self.config.redirect_url.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    // The checkout is done; the persisted session must
                    // not leak into the next run.
                    if let Err(error) = orchestrator.session.clear().await {
                        warn!(?error, "failed to clear completed session");
                    }
                    orchestrator
                        .events
                        .emit(WizardUiEvent::RedirectRequested { url })
                        .await;
                });
                let mut timers = self.timers.lock().await;
                if let Some(previous) = timers.insert(WizardTimer::Redirect, handle.abort_handle())
                {
                    previous.abort();
                }
            }
        }
    }

    /// Fetch the cart and publish it. Errors come back as the fixed
    /// user-facing message.
    async fn fetch_cart(&self) -> Result<Cart, String> {
        let Some(session_id) = self.session.current().await else {
            return Err(SESSION_MISSING_MESSAGE.to_string());
        };
        match self.api.get_cart(&session_id).await {
            Ok(cart) => {
                *self.cart.lock().await = Some(cart.clone());
                self.events
                    .emit(WizardUiEvent::CartUpdated { cart: cart.clone() })
                    .await;
                Ok(cart)
            }
            Err(error) => {
                warn!(?error, "cart fetch failed");
                Err(error.user_message().to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl WizardEventPort for WizardOrchestrator {
    async fn subscribe(&self) -> anyhow::Result<tokio::sync::mpsc::Receiver<WizardUiEvent>> {
        Ok(self.events.subscribe().await)
    }
}

fn personal_block_reason(
    form_complete: bool,
    email_available: cw_core::wizard::EmailAvailability,
    phone_verified: bool,
) -> Option<&'static str> {
    use cw_core::wizard::EmailAvailability as Availability;

    if !form_complete {
        return Some(FORM_INCOMPLETE_MESSAGE);
    }
    match email_available {
        Availability::Taken => return Some(EMAIL_TAKEN_MESSAGE),
        Availability::Unknown | Availability::Checking => return Some(EMAIL_PENDING_MESSAGE),
        Availability::Available => {}
    }
    if !phone_verified {
        return Some(PHONE_UNVERIFIED_MESSAGE);
    }
    None
}
