//! Assembly of the wizard engine from its concrete adapters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cw_app::{
    EmailAvailabilityProbe, EventFanout, NotificationCenter, SessionIdentityService,
    VerificationOrchestrator, WizardOrchestrator, WizardUiEvent,
};
use cw_core::ports::{
    AddressLookupPort, CheckoutApiPort, ClockPort, SessionStorePort, VerificationApiPort,
};
use cw_core::verification::VerificationPolicy;
use cw_infra::{
    FileSessionStore, HttpCheckoutClient, HttpVerificationClient, SystemClock, ZippopotamClient,
};

use crate::settings::EngineSettings;

const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// A fully wired wizard engine. Frontends drive the orchestrator and
/// watch the event stream through [`Engine::subscribe`].
pub struct Engine {
    wizard: WizardOrchestrator,
    events: EventFanout,
}

impl Engine {
    pub fn wizard(&self) -> &WizardOrchestrator {
        &self.wizard
    }

    pub async fn subscribe(&self) -> mpsc::Receiver<WizardUiEvent> {
        self.events.subscribe().await
    }
}

/// Build the engine against the live HTTP services named in `settings`.
///
/// Call from within the Tokio runtime that will drive the engine; the
/// orchestrators spawn their event pump tasks here.
pub fn build_engine(settings: &EngineSettings) -> Engine {
    let api: Arc<dyn CheckoutApiPort> =
        Arc::new(HttpCheckoutClient::new(settings.checkout_base_url.clone()));
    let verification_api: Arc<dyn VerificationApiPort> = Arc::new(HttpVerificationClient::new(
        settings.verification_base_url.clone(),
    ));
    let lookup: Arc<dyn AddressLookupPort> =
        Arc::new(ZippopotamClient::new(settings.zip_lookup_base_url.clone()));
    let store: Arc<dyn SessionStorePort> =
        Arc::new(FileSessionStore::new(settings.data_dir.clone()));

    build_with_ports(settings.wizard.clone(), api, verification_api, lookup, store)
}

/// Build the engine from already constructed ports. Integration tests
/// use this to point the engine at stub servers.
pub fn build_with_ports(
    config: cw_app::WizardConfig,
    api: Arc<dyn CheckoutApiPort>,
    verification_api: Arc<dyn VerificationApiPort>,
    lookup: Arc<dyn AddressLookupPort>,
    store: Arc<dyn SessionStorePort>,
) -> Engine {
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let events = EventFanout::new();

    let session = Arc::new(SessionIdentityService::new(
        api.clone(),
        store,
        clock.clone(),
    ));
    let verification = VerificationOrchestrator::new(
        verification_api,
        VerificationPolicy {
            cooldown_secs: config.resend_cooldown_secs,
            ..VerificationPolicy::default()
        },
        COOLDOWN_TICK,
        events.clone(),
    );
    let email_probe = EmailAvailabilityProbe::new(api.clone(), config.email_debounce, events.clone());
    let notifications = NotificationCenter::new(
        config.notification_lifetime,
        clock.clone(),
        events.clone(),
    );

    let wizard = WizardOrchestrator::new(
        config,
        api,
        lookup,
        clock,
        session,
        verification,
        email_probe,
        notifications,
        events.clone(),
    );

    Engine { wizard, events }
}

/// Install the global tracing subscriber. `RUST_LOG` controls the
/// filter; defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
