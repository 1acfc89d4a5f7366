//! Form filler: writes one recognized value into one target input, in a
//! fixed side-effect sequence that defensive host pages still accept.

use anyhow::Result;
use tracing::{debug, warn};

use scanfill_core::{FillOutcome, Page};

use crate::mapper::MappedField;

/// Handler names detached before writing. Removing the host page's
/// paste/selection blockers is a deliberate, documented side effect of
/// `fill`, not a workaround.
const INTERCEPTOR_EVENTS: [&str; 3] = ["paste", "selectstart", "select"];

/// Compatibility signals dispatched after assignment, in this order:
/// keystroke input, value change, key release, focus loss.
const COMPAT_EVENTS: [&str; 4] = ["input", "change", "keyup", "blur"];

/// Marker attribute so the operator can audit machine-filled inputs.
const MARKER_ATTRIBUTE: &str = "data-scanfill";

const MARKER_BACKGROUND: &str = "#e8f5e9";
const MARKER_BORDER: &str = "1px solid #34a853";

/// Result of one fill call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    Written,
    TargetMissing,
}

#[derive(Debug, Default)]
pub struct FormFiller;

impl FormFiller {
    pub fn new() -> Self {
        Self
    }

    /// Write `value` into the input with id `target`.
    ///
    /// Sequence: existence check, interceptor removal, focus, assignment,
    /// compatibility events, filled marker. Idempotent — refilling simply
    /// overwrites the value and re-applies the marker.
    pub async fn fill(&self, page: &dyn Page, target: &str, value: &str) -> Result<FillStatus> {
        if !page.input_exists(target).await? {
            return Ok(FillStatus::TargetMissing);
        }

        let interceptors: Vec<String> =
            INTERCEPTOR_EVENTS.iter().map(|e| e.to_string()).collect();
        page.clear_input_handlers(target, &interceptors).await?;
        page.focus_input(target).await?;
        page.set_input_value(target, value).await?;
        for event in COMPAT_EVENTS {
            page.fire_input_event(target, event).await?;
        }
        page.set_input_attribute(target, MARKER_ATTRIBUTE, "1").await?;
        page.set_input_style(target, "backgroundColor", MARKER_BACKGROUND)
            .await?;
        page.set_input_style(target, "border", MARKER_BORDER).await?;

        debug!(target, chars = value.len(), "Filled input");
        Ok(FillStatus::Written)
    }

    /// Fill every mapped field, accumulating the outcome. Per-field
    /// failures — missing targets and write errors alike — are collected,
    /// never fatal to the remaining fields.
    pub async fn fill_all(
        &self,
        page: &dyn Page,
        fields: impl Iterator<Item = MappedField>,
    ) -> FillOutcome {
        let mut outcome = FillOutcome::default();
        for field in fields {
            match self.fill(page, &field.target, &field.value).await {
                Ok(FillStatus::Written) => outcome.record_written(),
                Ok(FillStatus::TargetMissing) => {
                    debug!(key = %field.key, target = %field.target, "Target input not found");
                    outcome.record_missing(field.key);
                }
                Err(err) => {
                    warn!(key = %field.key, target = %field.target, error = %err, "Write failed");
                    outcome.record_missing(field.key);
                }
            }
        }
        outcome
    }
}
