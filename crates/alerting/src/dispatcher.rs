//! Alert Dispatcher Implementation

use crate::alert::{Alert, AlertDetails, AlertLevel};
use crate::notification::{Notification, Subscriber};
use crate::AlertError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Delivers triggered alerts to subscribers and keeps a log of what was sent
pub struct AlertDispatcher {
    /// Delivered alerts, oldest first
    history: Mutex<Vec<AlertDetails>>,
    /// Alerts triggered with at least one subscriber
    trigger_count: AtomicU64,
}

impl AlertDispatcher {
    /// Create a new alert dispatcher
    pub fn new() -> Self {
        info!("Creating alert dispatcher");
        Self {
            history: Mutex::new(Vec::new()),
            trigger_count: AtomicU64::new(0),
        }
    }

    /// Build an alert stamped now and deliver it
    pub fn raise(
        &self,
        kind: &str,
        level: AlertLevel,
        triggered_by: &str,
        subscribers: &[Subscriber],
    ) -> Result<AlertDetails, AlertError> {
        let mut alert = Alert::now(kind, level, triggered_by);
        self.trigger(&mut alert, subscribers)?;
        Ok(alert.details())
    }

    /// Deliver an alert to each subscriber in order.
    ///
    /// Subscribers without a recipient id are skipped. A sink error stops
    /// delivery and is returned; recipients already reached stay notified.
    pub fn trigger(&self, alert: &mut Alert, subscribers: &[Subscriber]) -> Result<(), AlertError> {
        info!("Alert Triggered: {} - Level: {}", alert.kind(), alert.level());

        if subscribers.is_empty() {
            warn!("No users to notify");
            return Ok(());
        }

        self.trigger_count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("fleet_alerts_triggered_total").increment(1);

        let result = Self::notify(alert, subscribers);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.details());
        result
    }

    fn notify(alert: &mut Alert, subscribers: &[Subscriber]) -> Result<(), AlertError> {
        let content = alert.notification_content();

        for subscriber in subscribers {
            let recipient = match subscriber.recipient_id() {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    debug!("Skipping subscriber without recipient identity");
                    continue;
                }
            };

            let notification =
                Notification::new(content.clone(), alert.timestamp()).addressed_to(&recipient);
            subscriber.receive_notification(&notification)?;
            alert.mark_notified(&recipient);
            metrics::counter!("fleet_notifications_delivered_total").increment(1);
        }

        Ok(())
    }

    /// Alerts delivered so far
    pub fn history(&self) -> Vec<AlertDetails> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of alerts triggered with a non-empty subscriber list
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count.load(Ordering::Relaxed)
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
