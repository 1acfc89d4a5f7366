//! Typed config schema and validation.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use scanfill_core::{FieldMapping, ImageProbe, NotifyPolicy, RecognitionPolicy};

/// Full scanfill configuration, as read from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanfillConfig {
    pub recognition: RecognitionPolicy,
    pub image: ImageProbe,
    /// Ordered field mapping; declaration order is fill order.
    pub fields: FieldMapping,
    pub notify: NotifyPolicy,
    pub page: PageConfig,
    pub logging: LoggingConfig,
}

/// How to attach to the host page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// DevTools WebSocket address of the tab carrying the form.
    pub ws_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling NDJSON logs; console-only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

/// One finding from config validation.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigIssue>,
    pub errors: Vec<ConfigIssue>,
}

impl ValidationReport {
    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ConfigIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ConfigIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Deep-validate a config. Errors make the config unusable; warnings are
/// logged and tolerated.
pub fn validate(config: &ScanfillConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.recognition.endpoint.trim().is_empty() {
        report.error("recognition.endpoint", "endpoint must not be empty");
    } else if !config.recognition.endpoint.starts_with("http://")
        && !config.recognition.endpoint.starts_with("https://")
    {
        report.error("recognition.endpoint", "endpoint must be an http(s) URL");
    }
    if config.recognition.max_attempts == 0 {
        report.error("recognition.max_attempts", "at least one attempt is required");
    }
    if config.recognition.attempt_timeout_secs == 0 {
        report.error("recognition.attempt_timeout_secs", "timeout must be positive");
    }

    if config.fields.is_empty() {
        report.error("fields", "field mapping must not be empty");
    }
    let mut seen_keys = HashSet::new();
    let mut seen_targets = HashSet::new();
    for entry in config.fields.entries() {
        if !seen_keys.insert(entry.key.as_str()) {
            report.error("fields", format!("duplicate field key '{}'", entry.key));
        }
        if !seen_targets.insert(entry.target.as_str()) {
            report.warn(
                "fields",
                format!("multiple keys target input '{}'", entry.target),
            );
        }
    }

    if config.image.element_id.trim().is_empty()
        && config.image.extensions.is_empty()
        && config.image.id_fragment.trim().is_empty()
    {
        report.error("image", "all locator probes are disabled");
    }

    if config.notify.banner_ttl_secs == 0 {
        report.warn("notify.banner_ttl_secs", "banner will be dismissed immediately");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanfill_core::FieldTarget;

    #[test]
    fn default_config_validates_clean() {
        let report = validate(&ScanfillConfig::default());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn empty_endpoint_is_an_error() {
        let mut config = ScanfillConfig::default();
        config.recognition.endpoint = String::new();
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "recognition.endpoint"));
    }

    #[test]
    fn duplicate_field_keys_are_errors() {
        let mut config = ScanfillConfig::default();
        config.fields = FieldMapping::new(vec![
            FieldTarget::new("ssn", "ssn"),
            FieldTarget::new("ssn", "ssn_confirm"),
        ]);
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("duplicate"));
    }

    #[test]
    fn shared_targets_are_warnings_only() {
        let mut config = ScanfillConfig::default();
        config.fields = FieldMapping::new(vec![
            FieldTarget::new("state", "state"),
            FieldTarget::new("licence_state", "state"),
        ]);
        let report = validate(&config);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn yaml_roundtrip_keeps_field_order() {
        let config = ScanfillConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: ScanfillConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.fields, config.fields);
        assert_eq!(back.recognition.max_attempts, 3);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "recognition:\n  endpoint: https://ocr.internal/ocr\n";
        let config: ScanfillConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.recognition.endpoint, "https://ocr.internal/ocr");
        assert_eq!(config.recognition.attempt_timeout_secs, 30);
        assert_eq!(config.fields.len(), 16);
    }
}
