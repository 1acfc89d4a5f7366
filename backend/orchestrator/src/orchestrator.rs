//! The process orchestrator state machine.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use scanfill_core::{
    FieldMapping, FillOutcome, Page, Recognizer, RunEvent, RunEventKind, RunState, ScanfillError,
    Severity,
};
use scanfill_fill::{mapped_fields, FormFiller};
use scanfill_locator::ImageLocator;
use scanfill_notify::NotificationPresenter;

/// What a trigger produced.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// The run went through the full sequence; see the report.
    Completed(RunReport),
    /// A run was already in flight — the trigger was a no-op.
    AlreadyRunning,
}

/// Summary of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Terminal state the run reached before the machine re-armed.
    pub state: RunState,
    pub outcome: FillOutcome,
}

/// Sequences one extraction run end to end. Owns the only `RunState`;
/// the state mutex, held for the whole run, is the single-flight guard.
pub struct ProcessOrchestrator {
    page: Arc<dyn Page>,
    recognizer: Arc<dyn Recognizer>,
    locator: ImageLocator,
    filler: FormFiller,
    presenter: NotificationPresenter,
    mapping: FieldMapping,
    state: Mutex<RunState>,
    events_tx: Option<mpsc::Sender<RunEvent>>,
}

impl ProcessOrchestrator {
    pub fn new(
        page: Arc<dyn Page>,
        recognizer: Arc<dyn Recognizer>,
        locator: ImageLocator,
        presenter: NotificationPresenter,
        mapping: FieldMapping,
    ) -> Self {
        Self {
            page,
            recognizer,
            locator,
            filler: FormFiller::new(),
            presenter,
            mapping,
            state: Mutex::new(RunState::Idle),
            events_tx: None,
        }
    }

    /// Attach an audit channel; one `RunEvent` per stage boundary.
    pub fn with_events(mut self, events_tx: mpsc::Sender<RunEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    /// Run the pipeline once. A trigger while a run is in flight is a
    /// no-op; nothing escapes this method uncaught — every fault becomes a
    /// notification and a `Failed` report.
    pub async fn trigger(&self) -> TriggerOutcome {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Trigger ignored; a run is already in flight");
                return TriggerOutcome::AlreadyRunning;
            }
        };
        *state = RunState::Running;

        let run_id = Uuid::new_v4();
        info!(%run_id, "Run started");
        self.emit(run_id, RunEventKind::RunStarted, json!({})).await;
        self.notify("Reading the scanned document…", Severity::Info)
            .await;

        let (terminal, outcome) = match self.run(run_id).await {
            Ok(outcome) if outcome.any_filled() => {
                let message = success_message(&outcome, self.mapping.len());
                self.notify(&message, Severity::Success).await;
                self.emit(
                    run_id,
                    RunEventKind::RunCompleted,
                    json!({"filled": outcome.filled}),
                )
                .await;
                (RunState::Succeeded, outcome)
            }
            Ok(outcome) => {
                self.notify(
                    "No fields could be filled from the recognized document.",
                    Severity::Warning,
                )
                .await;
                self.emit(
                    run_id,
                    RunEventKind::RunFailed,
                    json!({"reason": "no fields filled"}),
                )
                .await;
                (RunState::Failed("no fields filled".to_string()), outcome)
            }
            Err(err) => {
                let (reason, message) = describe_failure(&err);
                self.notify(&message, Severity::Error).await;
                self.emit(
                    run_id,
                    RunEventKind::RunFailed,
                    json!({"reason": reason.clone(), "detail": err.to_string()}),
                )
                .await;
                (RunState::Failed(reason), FillOutcome::default())
            }
        };

        info!(%run_id, state = %terminal, "Run finished");
        // Terminal state travels in the report; the machine re-arms
        // immediately so the next trigger is accepted.
        *state = RunState::Idle;

        TriggerOutcome::Completed(RunReport {
            run_id,
            state: terminal,
            outcome,
        })
    }

    /// The happy-path sequence; stage-level failures bubble to `trigger`.
    async fn run(&self, run_id: Uuid) -> Result<FillOutcome, ScanfillError> {
        let image = self.locator.locate(self.page.as_ref()).await?;
        self.emit(
            run_id,
            RunEventKind::ImageResolved,
            json!({"image_url": image.as_str()}),
        )
        .await;

        self.emit(run_id, RunEventKind::RecognitionAttempted, json!({}))
            .await;
        let result = match self.recognizer.recognize(&image).await {
            Ok(result) => {
                self.emit(
                    run_id,
                    RunEventKind::RecognitionSucceeded,
                    json!({"confidence": result.confidence}),
                )
                .await;
                result
            }
            Err(err) => {
                self.emit(
                    run_id,
                    RunEventKind::RecognitionFailed,
                    json!({"error": err.to_string()}),
                )
                .await;
                return Err(err);
            }
        };

        let outcome = self
            .filler
            .fill_all(self.page.as_ref(), mapped_fields(&result, &self.mapping))
            .await;
        self.emit(
            run_id,
            RunEventKind::FieldsFilled,
            json!({"filled": outcome.filled, "missing": outcome.missing.clone()}),
        )
        .await;
        Ok(outcome)
    }

    /// Notification failures are logged, never propagated — the run's own
    /// outcome must not depend on the banner.
    async fn notify(&self, message: &str, severity: Severity) {
        if let Err(err) = self
            .presenter
            .notify(self.page.as_ref(), message, severity)
            .await
        {
            warn!(error = %err, "Failed to render notification");
        }
    }

    async fn emit(&self, run_id: Uuid, kind: RunEventKind, payload: serde_json::Value) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(RunEvent::new(run_id, kind, payload)).await;
        }
    }
}

/// Map a stage failure to its `Failed` reason and operator message.
fn describe_failure(err: &ScanfillError) -> (String, String) {
    match err {
        ScanfillError::ImageNotFound => (
            "no image".to_string(),
            "No scanned document image was found on this page.".to_string(),
        ),
        ScanfillError::RecognitionTransport(_) | ScanfillError::RecognitionApplication(_) => (
            "recognition failed".to_string(),
            format!("Document recognition failed: {err}"),
        ),
        other => (other.to_string(), format!("Extraction stopped: {other}")),
    }
}

fn success_message(outcome: &FillOutcome, total: usize) -> String {
    let mut message = format!(
        "Filled {} of {} fields from the scanned document.",
        outcome.filled, total
    );
    if !outcome.missing.is_empty() {
        message.push_str(&format!(
            " No inputs found for: {}.",
            outcome.missing.join(", ")
        ));
    }
    message
}
