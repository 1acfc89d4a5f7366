//! `scanfill-config` — scanfill runtime configuration.
//!
//! Provides:
//! - Typed config schema (recognition policy, image probes, field mapping,
//!   notification policy, page attachment, logging)
//! - YAML read/write with atomic rename
//! - `${ENV_VAR}` substitution
//! - Deep validation with a warnings/errors report

pub mod env;
pub mod io;
pub mod schema;

pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{validate, ConfigIssue, ScanfillConfig, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, and validate a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<ScanfillConfig> {
    let raw_config = load_config(path).await?;

    // Serialize to Value for the env substitution pass.
    let mut value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: ScanfillConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(error) = report.errors.first() {
        anyhow::bail!("invalid config at {}: {}", error.path, error.message);
    }

    Ok(config)
}
