//! HTTP client for the recognition service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use scanfill_core::{
    ImageReference, RecognitionPolicy, RecognitionResult, Recognizer, ScanfillError,
};
use scanfill_logging::redact_sensitive_data;

use crate::retry::{run_attempts, RetryPolicy};

/// Recognition service client. One `POST` per attempt, each attempt
/// cancelled at the policy's timeout; retries follow the linear schedule.
/// Holds no state between runs beyond the connection pool.
pub struct RecognitionClient {
    client: Client,
    endpoint: String,
    attempt_timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct RecognitionRequest<'a> {
    image_url: &'a str,
}

impl RecognitionClient {
    pub fn new(policy: &RecognitionPolicy) -> Self {
        Self {
            client: Client::new(),
            endpoint: policy.endpoint.clone(),
            attempt_timeout: Duration::from_secs(policy.attempt_timeout_secs),
            retry: RetryPolicy::from(policy),
        }
    }

    /// One request/response cycle. Transport failures, non-2xx statuses,
    /// and explicit error payloads all come back as retryable errors.
    async fn attempt(&self, image: &ImageReference) -> Result<RecognitionResult, ScanfillError> {
        let exchange = async {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&RecognitionRequest {
                    image_url: image.as_str(),
                })
                .send()
                .await
                .map_err(|e| ScanfillError::RecognitionTransport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScanfillError::RecognitionApplication(format!(
                    "service answered {status}"
                )));
            }

            let result: RecognitionResult = response
                .json()
                .await
                .map_err(|e| ScanfillError::RecognitionTransport(format!(
                    "undecodable response: {e}"
                )))?;

            // The service signals its own failures in-band; error payloads
            // can echo recognized text, so redact before surfacing.
            if let Some(error) = result.error.as_deref().filter(|e| !e.trim().is_empty()) {
                return Err(ScanfillError::RecognitionApplication(
                    redact_sensitive_data(error),
                ));
            }

            Ok(result)
        };

        match tokio::time::timeout(self.attempt_timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ScanfillError::RecognitionTransport(format!(
                "attempt timed out after {}s",
                self.attempt_timeout.as_secs()
            ))),
        }
    }

    /// Probe the service's health endpoint (a sibling of the recognition
    /// endpoint) and return its status payload.
    pub async fn check_health(&self) -> anyhow::Result<serde_json::Value> {
        let health_url = url::Url::parse(&self.endpoint)?.join("health")?;
        let response = self.client.get(health_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("health probe at {health_url} answered {status}");
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(
        &self,
        image: &ImageReference,
    ) -> Result<RecognitionResult, ScanfillError> {
        debug!(endpoint = %self.endpoint, image = %image, "Submitting image for recognition");
        run_attempts(&self.retry, |attempt| {
            debug!(attempt, max = self.retry.max_attempts, "Issuing recognition request");
            self.attempt(image)
        })
        .await
    }
}
