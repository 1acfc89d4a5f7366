//! `scanfill-recognition` — the resilient call to the external recognition
//! service: per-attempt timeout, bounded linear-backoff retry, last error
//! surfaced unchanged.

pub mod client;
pub mod retry;

pub use client::RecognitionClient;
pub use retry::{run_attempts, RetryPolicy};
