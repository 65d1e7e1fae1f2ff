//! Notifications and the sinks that receive them

use crate::AlertError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;
use uuid::Uuid;

/// Per-recipient payload derived from an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: String,
    content: String,
    timestamp: DateTime<Utc>,
    recipient: Option<String>,
}

impl Notification {
    /// Create a notification with a freshly generated id
    pub fn new(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), content, timestamp, None)
    }

    /// Create a notification with every field supplied
    pub fn with_id(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        recipient: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            timestamp,
            recipient,
        }
    }

    /// Address the notification to a recipient
    pub fn addressed_to(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Unique notification id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Message text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Timestamp of the alert this was derived from
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Addressed recipient, if any
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }
}

impl TryFrom<Value> for Notification {
    type Error = AlertError;

    /// Build a notification from a raw JSON payload.
    ///
    /// `content` must be present and a string (empty is allowed). Missing
    /// `id` or unparseable `timestamp` fall back to a fresh id and now.
    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        let content = payload
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AlertError::InvalidPayload("expected notification with string content".to_string())
            })?;

        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = payload
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        let recipient = payload
            .get("recipient")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self::with_id(id, content, timestamp, recipient))
    }
}

/// Anything that can receive delivered alerts
pub trait NotificationSink: Send + Sync {
    /// Identity recorded on the alert after delivery.
    ///
    /// The dispatcher skips sinks that return `None` or an empty id.
    fn recipient_id(&self) -> Option<&str>;

    /// Accept a notification, storing an owned copy
    fn receive_notification(&self, notification: &Notification) -> Result<(), AlertError>;
}

/// Shared handle to a sink, as held in subscriber lists
pub type Subscriber = Arc<dyn NotificationSink>;

/// A human operator with a private notification inbox
#[derive(Debug)]
pub struct Operator {
    id: String,
    role: String,
    inbox: Mutex<Vec<Notification>>,
}

impl Operator {
    /// Create an operator with an empty inbox
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            inbox: Mutex::new(Vec::new()),
        }
    }

    fn inbox(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Operator id, used as the recipient id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Operator role, e.g. "admin"
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Copy of every notification received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.inbox().clone()
    }
}

impl NotificationSink for Operator {
    fn recipient_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn receive_notification(&self, notification: &Notification) -> Result<(), AlertError> {
        self.inbox().push(notification.clone());
        info!("User {} received notification: {}", self.id, notification.content());
        Ok(())
    }
}
