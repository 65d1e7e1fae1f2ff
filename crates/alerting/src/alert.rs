//! Alert Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Low => "Low",
            AlertLevel::Medium => "Medium",
            AlertLevel::High => "High",
            AlertLevel::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// A triggered notice of a threshold breach
#[derive(Debug, Clone)]
pub struct Alert {
    kind: String,
    level: AlertLevel,
    timestamp: DateTime<Utc>,
    triggered_by: String,
    notified: Vec<String>,
}

/// Snapshot of an alert and the recipients reached so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDetails {
    #[serde(rename = "type")]
    pub kind: String,
    /// Severity
    pub level: AlertLevel,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// Entity that raised the alert
    pub triggered_by: String,
    /// Recipient ids reached, in delivery order
    pub notified_users: Vec<String>,
}

impl Alert {
    /// Create a new alert
    ///
    /// # Arguments
    /// * `kind` - Alert category (e.g. "Temperature", "Electricity Pricing")
    /// * `level` - Severity
    /// * `timestamp` - When the triggering condition was observed
    /// * `triggered_by` - Entity that raised the alert
    pub fn new(
        kind: impl Into<String>,
        level: AlertLevel,
        timestamp: DateTime<Utc>,
        triggered_by: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            level,
            timestamp,
            triggered_by: triggered_by.into(),
            notified: Vec::new(),
        }
    }

    /// Create an alert stamped with the current time
    pub fn now(kind: impl Into<String>, level: AlertLevel, triggered_by: impl Into<String>) -> Self {
        Self::new(kind, level, Utc::now(), triggered_by)
    }

    /// Alert category
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Severity
    pub fn level(&self) -> AlertLevel {
        self.level
    }

    /// When the triggering condition was observed
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Entity that raised the alert
    pub fn triggered_by(&self) -> &str {
        &self.triggered_by
    }

    /// Recipient ids notified so far, in delivery order
    pub fn notified(&self) -> &[String] {
        &self.notified
    }

    /// Content line delivered to each recipient
    pub fn notification_content(&self) -> String {
        format!("Alert: {} - Level: {}", self.kind, self.level)
    }

    pub(crate) fn mark_notified(&mut self, recipient: &str) {
        self.notified.push(recipient.to_string());
    }

    /// Copy out the alert's current state
    pub fn details(&self) -> AlertDetails {
        AlertDetails {
            kind: self.kind.clone(),
            level: self.level,
            timestamp: self.timestamp,
            triggered_by: self.triggered_by.clone(),
            notified_users: self.notified.clone(),
        }
    }
}
