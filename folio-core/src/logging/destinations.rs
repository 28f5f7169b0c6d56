//! Log destinations and the structured entry written to them

use std::collections::BTreeMap;

use serde_json::Value;

use crate::logging::{LogLevel, LoggingConfig};

/// Where log lines go
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    /// Keeps stdout free for command output (used by `folio render`)
    Stderr,
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Usually the module path; `folio::access` for access lines
    pub target: String,
    /// Key-values attached at the call site, then config context fields
    pub fields: BTreeMap<String, Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            message: message.into(),
            target: target.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn from_log_record(record: &log::Record, config: &LoggingConfig) -> Self {
        let mut entry = Self::new(record.level().into(), record.args().to_string(), record.target());

        let mut collector = FieldCollector(&mut entry.fields);
        let _ = record.key_values().visit(&mut collector);

        for (key, value) in &config.context_fields {
            entry.fields.entry(key.clone()).or_insert_with(|| Value::String(value.clone()));
        }
        entry
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

struct FieldCollector<'a>(&'a mut BTreeMap<String, Value>);

impl<'kvs> log::kv::VisitSource<'kvs> for FieldCollector<'_> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        let json = if let Some(n) = value.to_u64() {
            Value::from(n)
        } else if let Some(n) = value.to_i64() {
            Value::from(n)
        } else if let Some(b) = value.to_bool() {
            Value::Bool(b)
        } else {
            Value::String(value.to_string())
        };
        self.0.insert(key.as_str().to_string(), json);
        Ok(())
    }
}
