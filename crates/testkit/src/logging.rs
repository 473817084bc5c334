//! Logger doubles.

use account_client_ports::{LogEvent, LogFields, LoggerPort};
use std::sync::{Arc, Mutex};

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// Logger that keeps every event; children share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
    base_fields: LogFields,
}

impl RecordingLogger {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event logged so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Names of every event logged so far, in order.
    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.event.into_string())
            .collect()
    }

    /// First event named `name`.
    pub fn find(&self, name: &str) -> Option<LogEvent> {
        self.events()
            .into_iter()
            .find(|event| event.event.as_ref() == name)
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, mut event: LogEvent) {
        if !self.base_fields.is_empty() {
            let mut fields = self.base_fields.clone();
            fields.extend(event.fields.take().unwrap_or_default());
            event.fields = Some(fields);
        }
        self.events.lock().unwrap().push(event);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut base_fields = self.base_fields.clone();
        base_fields.extend(fields);
        Box::new(Self {
            events: Arc::clone(&self.events),
            base_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_ports::log_fields;
    use serde_json::json;

    #[test]
    fn children_share_the_buffer() {
        let logger = RecordingLogger::new();
        let child = logger.child(log_fields([("operation", json!("get"))]));

        logger.info("account.get.start", "parent", None);
        child.debug("account.call.start", "child", None);

        assert_eq!(logger.event_names(), vec!["account.get.start", "account.call.start"]);
        let event = logger.find("account.call.start").unwrap();
        assert_eq!(event.fields.unwrap()["operation"], json!("get"));
    }
}
