//! Transient user-facing notifications.
//!
//! The queue itself is pure: insertion order is display order, entries
//! are removed by id or pruned once their lifetime has elapsed. Timers
//! live in the application layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            created_at: now,
        }
    }
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and return its id.
    pub fn push(&mut self, notification: Notification) -> Uuid {
        let id = notification.id;
        self.entries.push(notification);
        id
    }

    /// Remove by id. Returns true when the id was present.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Drop entries older than `lifetime`, returning the dismissed ids.
    pub fn prune_expired(&mut self, now: DateTime<Utc>, lifetime: Duration) -> Vec<Uuid> {
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|n| now - n.created_at >= lifetime);
        self.entries = kept;
        expired.into_iter().map(|n| n.id).collect()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
