use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use cw_core::notification::Notification;
use cw_core::verification::VerificationState;
use cw_core::wizard::{EmailAvailability, WizardState};
use cw_core::Cart;

/// Everything a frontend needs to observe about a running wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardUiEvent {
    StateChanged {
        state: WizardState,
    },
    VerificationChanged {
        state: VerificationState,
    },
    EmailAvailabilityChanged {
        availability: EmailAvailability,
    },
    /// The entered code was consumed or invalidated; clear the input.
    CodeCleared,
    /// Address fields resolved from the zip code.
    AddressAutofilled {
        state: String,
        city: String,
    },
    CartUpdated {
        cart: Cart,
    },
    /// The cart came back empty; `url` is the storefront page where
    /// plans can be added.
    EmptyCartPlansLink {
        url: String,
    },
    CredentialsCleared,
    NotificationPushed {
        notification: Notification,
    },
    NotificationDismissed {
        id: Uuid,
    },
    /// Leave the wizard for an external destination.
    RedirectRequested {
        url: String,
    },
}

#[async_trait]
pub trait WizardEventPort: Send + Sync {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<WizardUiEvent>>;
}

/// Fan-out of [`WizardUiEvent`]s to every subscriber. Shared by the
/// orchestrators and the notification center so a frontend observes the
/// whole wizard through one receiver.
#[derive(Clone, Default)]
pub struct EventFanout {
    senders: std::sync::Arc<tokio::sync::Mutex<Vec<mpsc::Sender<WizardUiEvent>>>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self) -> mpsc::Receiver<WizardUiEvent> {
        let (event_tx, event_rx) = mpsc::channel(100);
        self.senders.lock().await.push(event_tx);
        event_rx
    }

    pub async fn emit(&self, event: WizardUiEvent) {
        let senders = { self.senders.lock().await.clone() };
        for sender in senders {
            if sender.send(event.clone()).await.is_err() {
                tracing::debug!("wizard event receiver dropped");
            }
        }
    }
}
