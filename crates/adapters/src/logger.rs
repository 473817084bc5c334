//! Structured JSON logger adapter.

use crate::log_sink::LogSink;
use account_client_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use account_client_shared::{REDACTED, is_secret_key, redact_json};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn render(&self, event: LogEvent) -> String {
        let mut fields = Map::new();
        for (key, value) in self.base_fields.iter().chain(event.fields.iter().flatten()) {
            let value = if is_secret_key(key) {
                Value::String(REDACTED.to_string())
            } else {
                let mut value = value.clone();
                redact_json(&mut value);
                value
            };
            fields.insert(key.to_string(), value);
        }

        let mut payload = Map::new();
        payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
        payload.insert("level".to_string(), Value::from(event.level.as_str()));
        payload.insert("event".to_string(), Value::from(event.event.as_ref()));
        payload.insert("message".to_string(), Value::from(event.message.as_ref()));
        if !fields.is_empty() {
            payload.insert("fields".to_string(), Value::Object(fields));
        }
        if let Some(mut error) = event.error {
            redact_json(&mut error);
            payload.insert("error".to_string(), error);
        }

        serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| {
                "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n"
                    .to_string()
            },
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        )
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = self.render(event);
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use account_client_ports::log_fields;
    use account_client_shared::{ErrorCode, ErrorEnvelope};
    use serde_json::json;

    fn parse(line: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    #[test]
    fn json_logger_redacts_sensitive_fields() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Debug);

        logger.log(LogEvent {
            event: "account.create.start".into(),
            level: LogLevel::Info,
            message: "creating user".into(),
            fields: Some(log_fields([
                ("bearerToken", json!("secret")),
                ("variables", json!({ "data": { "email": "a@b.io", "password": "hunter22" } })), // pragma: allowlist secret
            ])),
            error: Some(json!({ "metadata": { "token": "should-hide", "value": 7 } })),
        });

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        let payload = parse(&lines[0])?;
        assert_eq!(payload["fields"]["bearerToken"], json!(REDACTED));
        assert_eq!(payload["fields"]["variables"]["data"]["password"], json!(REDACTED));
        assert_eq!(payload["fields"]["variables"]["data"]["email"], json!("a@b.io"));
        assert_eq!(payload["error"]["metadata"]["token"], json!(REDACTED));
        assert_eq!(payload["error"]["metadata"]["value"], json!(7));
        Ok(())
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        logger.debug("account.get.start", "ignored", None);
        logger.info("account.get.done", "ignored", None);
        logger.warn("account.get.rejected", "kept", None);

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn failure_carries_error_envelope() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone());
        let error = ErrorEnvelope::expected(ErrorCode::new("account", "field_required"), "At least one user field required");

        logger.failure("account.get.failed", &error, None);

        let payload = parse(&sink.take()[0])?;
        assert_eq!(payload["level"], json!("warn"));
        assert_eq!(payload["message"], json!("At least one user field required"));
        assert_eq!(payload["error"]["code"]["code"], json!("field_required"));
        Ok(())
    }

    #[test]
    fn child_logger_merges_fields() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone())
            .with_base_fields(log_fields([("client", json!("account-client"))]));

        let child = logger.child(log_fields([("operation", json!("find"))]));
        child.info("account.find.done", "child log", None);

        let payload = parse(&sink.take()[0])?;
        assert_eq!(payload["fields"]["client"], json!("account-client"));
        assert_eq!(payload["fields"]["operation"], json!("find"));
        Ok(())
    }
}
