//! Alerting System
//!
//! Provides alert records, the notification sink contract, and fan-out of
//! triggered alerts to subscribed sinks.

mod alert;
mod dispatcher;
mod notification;

pub use alert::{Alert, AlertDetails, AlertLevel};
pub use dispatcher::AlertDispatcher;
pub use notification::{Notification, NotificationSink, Operator, Subscriber};

use thiserror::Error;

/// Alert delivery errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlertError {
    /// Payload without string content, or rejected by a sink
    #[error("Invalid notification payload: {0}")]
    InvalidPayload(String),
}
