//! Alerts
//!
//! Operator notifications. Delivery is best effort: a sink never fails the
//! monitoring run.
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

pub trait AlertSink {
    fn notify(&self, subject: &str, body: &str);
}

/// Writes alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&self, subject: &str, body: &str) {
        warn!("[ALERT] {}\n{}", subject, body);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// Keeps every alert in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    alerts: Rc<RefCell<Vec<Alert>>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        RecordingAlertSink::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.borrow().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn notify(&self, subject: &str, body: &str) {
        self.alerts.borrow_mut().push(Alert {
            subject: subject.to_string(),
            body: body.to_string(),
        });
    }
}
