//! Lifecycle events emitted while a pipeline runs.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::StageKind;

/// An event emitted during a pipeline run.
///
/// Events are consumed by an [`EventSink`](crate::events::EventSink).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    /// The event type (e.g., "stage.started", "pipeline.failed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (RFC 3339).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl StageEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns the event payload as a JSON object.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        serde_json::Value::Object(self.data.clone().into_iter().collect())
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn stage_started(stage: StageKind, command: &str) -> Self {
        Self::new("stage.started")
            .add_data("stage", serde_json::json!(stage))
            .add_data("command", serde_json::json!(command))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn stage_completed(stage: StageKind, duration_ms: f64) -> Self {
        Self::new("stage.completed")
            .add_data("stage", serde_json::json!(stage))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn stage_failed(stage: StageKind, error: &str, exit_code: i32) -> Self {
        Self::new("stage.failed")
            .add_data("stage", serde_json::json!(stage))
            .add_data("error", serde_json::json!(error))
            .add_data("exit_code", serde_json::json!(exit_code))
    }

    /// Creates a "pipeline.started" event.
    #[must_use]
    pub fn pipeline_started(run_id: &str, workload: &str) -> Self {
        Self::new("pipeline.started")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("workload", serde_json::json!(workload))
    }

    /// Creates a "pipeline.completed" event.
    #[must_use]
    pub fn pipeline_completed(run_id: &str, duration_ms: f64) -> Self {
        Self::new("pipeline.completed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "pipeline.failed" event.
    #[must_use]
    pub fn pipeline_failed(run_id: &str, exit_code: i32) -> Self {
        Self::new("pipeline.failed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("exit_code", serde_json::json!(exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_started_event() {
        let event = StageEvent::stage_started(StageKind::InstrumentedBuild, "cargo pgo build");
        assert_eq!(event.event_type, "stage.started");
        assert_eq!(event.data["stage"], serde_json::json!("instrumented_build"));
        assert_eq!(event.data["command"], serde_json::json!("cargo pgo build"));
    }

    #[test]
    fn test_event_serializes_type_field() {
        let event = StageEvent::pipeline_failed("run-1", 3);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "pipeline.failed");
        assert_eq!(json["data"]["exit_code"], 3);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_payload_is_object() {
        let event = StageEvent::stage_completed(StageKind::OptimizedBuild, 12.0);
        let payload = event.payload();
        assert_eq!(payload["duration_ms"], 12.0);
    }
}
