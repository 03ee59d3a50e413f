//! Notification center.
//!
//! Wraps the pure queue from `cw-core` with auto-dismiss timers and
//! event fan-out. One timer per entry, aborted when the entry is
//! dismissed by hand first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use uuid::Uuid;

use cw_core::notification::{Notification, NotificationQueue, Severity};
use cw_core::ports::ClockPort;

use crate::usecases::wizard::events::{EventFanout, WizardUiEvent};

#[derive(Clone)]
pub struct NotificationCenter {
    queue: Arc<Mutex<NotificationQueue>>,
    timers: Arc<Mutex<HashMap<Uuid, AbortHandle>>>,
    lifetime: Duration,
    clock: Arc<dyn ClockPort>,
    events: EventFanout,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration, clock: Arc<dyn ClockPort>, events: EventFanout) -> Self {
        Self {
            queue: Arc::new(Mutex::new(NotificationQueue::new())),
            timers: Arc::new(Mutex::new(HashMap::new())),
            lifetime,
            clock,
            events,
        }
    }

    /// Push a notification and schedule its auto-dismissal.
    pub async fn push(&self, severity: Severity, message: impl Into<String>) -> Uuid {
        let notification = Notification::new(severity, message, self.clock.now());
        let id = notification.id;

        self.queue.lock().await.push(notification.clone());
        self.events
            .emit(WizardUiEvent::NotificationPushed { notification })
            .await;

        let center = self.clone();
        let lifetime = self.lifetime;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            // Drop our own handle first so dismiss never aborts the task
            // it is running on.
            center.timers.lock().await.remove(&id);
            center.dismiss(id).await;
        });
        self.timers.lock().await.insert(id, handle.abort_handle());

        id
    }

    /// Remove by id. A no-op for ids already gone.
    pub async fn dismiss(&self, id: Uuid) {
        if let Some(handle) = self.timers.lock().await.remove(&id) {
            handle.abort();
        }
        if self.queue.lock().await.dismiss(id) {
            self.events
                .emit(WizardUiEvent::NotificationDismissed { id })
                .await;
        }
    }

    pub async fn entries(&self) -> Vec<Notification> {
        self.queue.lock().await.entries().to_vec()
    }
}
