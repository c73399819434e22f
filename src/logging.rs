use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: i64,
    pub level: String,
    pub event: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogContext<'a> {
    pub scenario: Option<&'a str>,
    pub seed: Option<u32>,
    pub tick: Option<u64>,
}

pub fn build_log_line(
    level: &str,
    event: &str,
    run_id: &str,
    context: LogContext<'_>,
    details: Value,
) -> StructuredLogLine {
    StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: context.scenario.map(|value| value.to_string()),
        seed: context.seed,
        tick: context.tick,
        details,
    }
}

/// Writes one JSON log line to stderr. Stdout is reserved for snapshots and results.
pub fn emit_log(level: &str, event: &str, run_id: &str, context: LogContext<'_>, details: Value) {
    let log_line = build_log_line(level, event, run_id, context, details);
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_context_fields_are_omitted() {
        let line = build_log_line(
            "info",
            "session_started",
            "play-1",
            LogContext::default(),
            json!({ "seed": 1 }),
        );
        let value = serde_json::to_value(&line).expect("log line should serialize");
        assert_eq!(value["event"], "session_started");
        assert_eq!(value["runId"], "play-1");
        assert!(value.get("scenario").is_none());
        assert!(value.get("tick").is_none());
        assert!(value["timestampMs"].as_i64().is_some());
    }

    #[test]
    fn context_fields_are_serialized_when_present() {
        let line = build_log_line(
            "warn",
            "anomaly_detected",
            "sim-1",
            LogContext {
                scenario: Some("standard"),
                seed: Some(9),
                tick: Some(12),
            },
            json!({}),
        );
        let value = serde_json::to_value(&line).expect("log line should serialize");
        assert_eq!(value["scenario"], "standard");
        assert_eq!(value["seed"], 9);
        assert_eq!(value["tick"], 12);
    }

    #[test]
    fn rfc3339_stamp_is_utc() {
        assert!(now_rfc3339().ends_with('Z'));
    }
}
