//! Line formats

use std::str::FromStr;

use serde_json::Value;

use crate::logging::destinations::LogEntry;

/// How log lines are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `2024-01-15 10:30:00.000 INFO  [folio::site] message key=value`
    #[default]
    Human,
    /// One JSON object per line
    Json,
    /// `timestamp=.. level=INFO target=.. message=".." key=value`
    Logfmt,
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Human => format_human(entry),
            LogFormat::Json => format_json(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            "logfmt" => Ok(LogFormat::Logfmt),
            other => Err(format!("unknown log format '{}' (expected human, json or logfmt)", other)),
        }
    }
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = serde_json::Map::new();
    json.insert("timestamp".to_string(), Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), Value::String(entry.level.to_string()));
    json.insert("target".to_string(), Value::String(entry.target.clone()));
    json.insert("message".to_string(), Value::String(entry.message.clone()));

    for (key, value) in &entry.fields {
        json.entry(key.clone()).or_insert_with(|| value.clone());
    }

    Value::Object(json).to_string()
}

fn format_human(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut line = format!("{} {:5} [{}] {}", timestamp, entry.level, entry.target, entry.message);

    for (key, value) in &entry.fields {
        line.push_str(&format!(" {}={}", key, plain(value)));
    }
    line
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", entry.level),
        format!("target={}", entry.target),
        format!("message={}", quoted(&entry.message)),
    ];

    for (key, value) in &entry.fields {
        let rendered = match value {
            Value::String(s) => quoted(s),
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => quoted(&other.to_string()),
        };
        parts.push(format!("{}={}", key, rendered));
    }
    parts.join(" ")
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
