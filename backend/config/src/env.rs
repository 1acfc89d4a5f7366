//! `${VAR}` environment substitution for config values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched, and only string
//! leaves of the value tree are processed. A referenced variable that is
//! unset or empty is an error naming the config path it appeared at.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references throughout a config value tree.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        // Primitives pass through unchanged.
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error.get_or_insert(MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"recognition": {"endpoint": "${SCANFILL_ENDPOINT}"}});
        let env = env(&[("SCANFILL_ENDPOINT", "http://ocr.internal/ocr")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["recognition"]["endpoint"], "http://ocr.internal/ocr");
    }

    #[test]
    fn substitutes_within_larger_string() {
        let v = json!({"endpoint": "http://${OCR_HOST}:8000/ocr"});
        let env = env(&[("OCR_HOST", "10.0.0.7")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["endpoint"], "http://10.0.0.7:8000/ocr");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"page": {"ws_endpoint": "${MISSING_WS}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING_WS"));
        assert!(msg.contains("page.ws_endpoint"));
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain $5 string"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "plain $5 string");
    }

    #[test]
    fn lowercase_names_are_not_references() {
        let v = json!({"key": "${not_a_var}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${not_a_var}");
    }
}
