use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved document image address: absolute and fragment-free.
///
/// Produced by the locator's normalization step; consumed once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the field mapping: a semantic key from the recognition
/// result and the id of the form input it lands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTarget {
    pub key: String,
    pub target: String,
}

impl FieldTarget {
    pub fn new(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
        }
    }
}

/// Ordered, immutable key→target mapping table. Declaration order is the
/// fill order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<FieldTarget>,
}

/// Field keys of the scanned loan-application document, in fill order.
const STANDARD_KEYS: [&str; 16] = [
    "first_name",
    "last_name",
    "email",
    "ssn",
    "phone",
    "bank_name",
    "account_no",
    "loan_amount",
    "address",
    "city",
    "state",
    "zip",
    "dob",
    "licence_no",
    "licence_state",
    "ip",
];

impl FieldMapping {
    pub fn new(entries: Vec<FieldTarget>) -> Self {
        Self { entries }
    }

    /// The standard sixteen-field document schema, each key targeting the
    /// input with the same id.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_KEYS
                .iter()
                .map(|key| FieldTarget::new(*key, *key))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[FieldTarget] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::standard()
    }
}

/// Structured response from the recognition service: a flat map of field
/// keys to values plus an overall confidence and an optional error marker.
/// Transient; never stored between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl RecognitionResult {
    /// The string value for a field key, if one is present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Tally of one fill pass: how many inputs were written and which field
/// keys had no usable target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    pub filled: usize,
    pub missing: Vec<String>,
}

impl FillOutcome {
    pub fn record_written(&mut self) {
        self.filled += 1;
    }

    pub fn record_missing(&mut self, key: impl Into<String>) {
        self.missing.push(key.into());
    }

    pub fn any_filled(&self) -> bool {
        self.filled > 0
    }
}

/// The orchestrator's run state. Exactly one exists per orchestrator; a
/// trigger while `Running` is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed(String),
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Succeeded => write!(f, "succeeded"),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Recognition service call policy: endpoint, per-attempt timeout, and the
/// bounded linear retry schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionPolicy {
    /// Full URL the image reference is POSTed to.
    pub endpoint: String,
    /// Per-attempt timeout in seconds, enforced by cancellation.
    pub attempt_timeout_secs: u64,
    /// Attempt ceiling; the last error is surfaced once exhausted.
    pub max_attempts: u32,
    /// Base inter-attempt delay; the wait grows linearly with the attempt
    /// index.
    pub retry_base_delay_ms: u64,
}

impl Default for RecognitionPolicy {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/ocr".to_string(),
            attempt_timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 2_000,
        }
    }
}

/// Where the locator looks for the document image, in probe order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProbe {
    /// Id of the designated image element.
    pub element_id: String,
    /// Accepted source extensions for the file-extension fallback.
    pub extensions: Vec<String>,
    /// Partial-id fallback: first image whose id contains this fragment.
    pub id_fragment: String,
}

impl Default for ImageProbe {
    fn default() -> Self {
        Self {
            element_id: "document_image".to_string(),
            extensions: [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            id_fragment: "doc".to_string(),
        }
    }
}

/// Presentation policy for operator notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyPolicy {
    /// How long the transient banner stays on the page.
    pub banner_ttl_secs: u64,
}

impl Default for NotifyPolicy {
    fn default() -> Self {
        Self {
            banner_ttl_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mapping_has_sixteen_ordered_entries() {
        let mapping = FieldMapping::standard();
        assert_eq!(mapping.len(), 16);
        assert_eq!(mapping.entries()[0].key, "first_name");
        assert_eq!(mapping.entries()[15].key, "ip");
        for entry in mapping.entries() {
            assert_eq!(entry.key, entry.target);
        }
    }

    #[test]
    fn recognition_result_flattens_field_keys() {
        let raw = r#"{"first_name": "Ada", "last_name": null, "confidence": 81.25, "raw_text": "ADA LOVELACE"}"#;
        let result: RecognitionResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.field("first_name"), Some("Ada"));
        assert_eq!(result.field("last_name"), None);
        assert_eq!(result.field("absent"), None);
        assert_eq!(result.confidence, Some(81.25));
        assert!(result.error.is_none());
    }

    #[test]
    fn recognition_result_surfaces_error_marker() {
        let raw = r#"{"error": "could not fetch image", "confidence": 0.0}"#;
        let result: RecognitionResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.error.as_deref(), Some("could not fetch image"));
    }

    #[test]
    fn fill_outcome_tallies() {
        let mut outcome = FillOutcome::default();
        assert!(!outcome.any_filled());
        outcome.record_written();
        outcome.record_missing("ssn");
        assert!(outcome.any_filled());
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.missing, vec!["ssn".to_string()]);
    }

    #[test]
    fn run_state_display() {
        assert_eq!(RunState::Idle.to_string(), "idle");
        assert_eq!(
            RunState::Failed("no image".into()).to_string(),
            "failed: no image"
        );
    }

    #[test]
    fn policy_defaults_match_contract() {
        let policy = RecognitionPolicy::default();
        assert_eq!(policy.attempt_timeout_secs, 30);
        assert_eq!(policy.max_attempts, 3);
        let notify = NotifyPolicy::default();
        assert_eq!(notify.banner_ttl_secs, 15);
    }
}
