use std::fmt;
use std::sync::Arc;

use crate::domain::simulation::vehicle_event::VehicleEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => f.write_str("info"),
            NotificationLevel::Success => f.write_str("success"),
            NotificationLevel::Error => f.write_str("error"),
        }
    }
}

/// Outcome of one event dispatch, or a run-level message when `event` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub event: Option<VehicleEvent>,
    pub delay_ms: Option<u64>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification { level: NotificationLevel::Info, message: message.into(), event: None, delay_ms: None }
    }

    pub fn submitted(event: VehicleEvent, delay_ms: u64, message: impl Into<String>) -> Self {
        Notification { level: NotificationLevel::Success, message: message.into(), event: Some(event), delay_ms: Some(delay_ms) }
    }

    pub fn failed(event: VehicleEvent, delay_ms: u64, message: impl Into<String>) -> Self {
        Notification { level: NotificationLevel::Error, message: message.into(), event: Some(event), delay_ms: Some(delay_ms) }
    }
}

/// Side channel for submission outcomes. Must not block: it is called from timer tasks.
pub trait NotificationSink: fmt::Debug + Send + Sync {
    fn notify(&self, notification: Notification);
}

pub type SharedNotificationSink = Arc<dyn NotificationSink>;

/// Writes every notification to the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        let subject = notification.event.as_ref().map(|e| format!("{} {}: ", e.license_plate, e.event_type())).unwrap_or_default();

        match notification.level {
            NotificationLevel::Info => log::info!("{}{}", subject, notification.message),
            NotificationLevel::Success => log::debug!("{}{}", subject, notification.message),
            NotificationLevel::Error => log::error!("{}{}", subject, notification.message),
        }
    }
}

/// Forwards each notification to several sinks.
#[derive(Debug, Default, Clone)]
pub struct CompositeNotifier {
    sinks: Vec<SharedNotificationSink>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        CompositeNotifier { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: SharedNotificationSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for CompositeNotifier {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}
