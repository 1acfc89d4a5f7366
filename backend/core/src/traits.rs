use async_trait::async_trait;

use crate::error::ScanfillError;
use crate::types::{ImageReference, RecognitionResult};

/// The external recognition service, behind a seam so the orchestrator can
/// be tested without a network.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Convert an image reference into structured field values. Retry
    /// policy is the implementation's concern; the error returned is the
    /// last one observed.
    async fn recognize(&self, image: &ImageReference)
        -> Result<RecognitionResult, ScanfillError>;
}
