//! `scanfill-orchestrator` — sequences locate → recognize → map → fill →
//! notify, guarantees at most one run at a time, and maps every failure to
//! an operator-visible message.

pub mod orchestrator;

pub use orchestrator::{ProcessOrchestrator, RunReport, TriggerOutcome};
