use thiserror::Error;

/// Top-level error taxonomy for the scanfill pipeline.
///
/// Stage-level failures (locator, recognition) abort the run; field-level
/// problems never become errors — they are collected in `FillOutcome`.
#[derive(Debug, Error)]
pub enum ScanfillError {
    /// Every locator probe came up empty. Aborts the run, non-fatal to the
    /// process.
    #[error("no document image found on the page")]
    ImageNotFound,

    /// Network-level recognition failure, including the per-attempt timeout.
    #[error("recognition transport failure: {0}")]
    RecognitionTransport(String),

    /// The service answered, but with a non-success status or an explicit
    /// error payload.
    #[error("recognition service error: {0}")]
    RecognitionApplication(String),

    /// A page-scripting call failed at a stage boundary.
    #[error("page scripting failed: {0}")]
    Page(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScanfillError {
    /// Whether the recognition client should spend another attempt on this
    /// failure. Transport and application failures retry identically.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ScanfillError::RecognitionTransport(_) | ScanfillError::RecognitionApplication(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_application_failures_retry_identically() {
        assert!(ScanfillError::RecognitionTransport("timed out".into()).retryable());
        assert!(ScanfillError::RecognitionApplication("status 500".into()).retryable());
        assert!(!ScanfillError::ImageNotFound.retryable());
        assert!(!ScanfillError::Page("eval failed".into()).retryable());
    }

    #[test]
    fn error_messages_name_the_stage() {
        assert_eq!(
            ScanfillError::ImageNotFound.to_string(),
            "no document image found on the page"
        );
        assert!(ScanfillError::RecognitionTransport("connection refused".into())
            .to_string()
            .contains("connection refused"));
    }
}
