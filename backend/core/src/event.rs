use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable audit record for one pipeline stage boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub id: Uuid,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: RunEventKind,
    pub payload: serde_json::Value,
}

/// Stage boundaries of a run, in pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// An operator trigger was accepted
    RunStarted,
    /// The locator produced an absolute image reference
    ImageResolved,
    /// The image was handed to the recognition client
    RecognitionAttempted,
    /// The service returned a usable result
    RecognitionSucceeded,
    /// All recognition attempts were exhausted
    RecognitionFailed,
    /// The fill pass finished, successfully or not
    FieldsFilled,
    /// The run reached `Succeeded`
    RunCompleted,
    /// The run reached `Failed`
    RunFailed,
}

impl RunEvent {
    pub fn new(run_id: Uuid, kind: RunEventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            timestamp: Utc::now(),
            kind,
            payload,
        }
    }
}

impl std::fmt::Display for RunEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_run_id_and_kind() {
        let run_id = Uuid::new_v4();
        let event = RunEvent::new(
            run_id,
            RunEventKind::ImageResolved,
            serde_json::json!({"image_url": "https://host/scan.jpg"}),
        );
        assert_eq!(event.run_id, run_id);
        assert_eq!(event.kind, RunEventKind::ImageResolved);
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(RunEventKind::RunStarted.to_string(), "run_started");
        assert_eq!(
            RunEventKind::RecognitionFailed.to_string(),
            "recognition_failed"
        );
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = RunEvent::new(
            Uuid::new_v4(),
            RunEventKind::FieldsFilled,
            serde_json::json!({"filled": 5}),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: RunEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, RunEventKind::FieldsFilled);
        assert_eq!(back.payload["filled"], 5);
    }
}
