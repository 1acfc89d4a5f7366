use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// The seam between the pipeline and the host page.
///
/// Every DOM read and write the pipeline performs goes through this trait;
/// the production implementation scripts an attached browser tab, the
/// in-memory [`crate::fake::FakePage`] backs the test suite. Inputs are
/// addressed by element id. Mutating calls on an absent input are no-ops —
/// callers that care check `input_exists` first.
#[async_trait]
pub trait Page: Send + Sync {
    /// Full URL of the page, used to absolutize relative image addresses.
    async fn current_url(&self) -> Result<String>;

    /// Raw `src` of the image element with the given id, if there is one.
    async fn image_source_by_id(&self, id: &str) -> Result<Option<String>>;

    /// Raw `src` of the first image whose fragment-stripped source ends
    /// with one of the given extensions.
    async fn image_source_by_extension(&self, extensions: &[String]) -> Result<Option<String>>;

    /// Raw `src` of the first image whose id contains the given fragment.
    async fn image_source_by_id_fragment(&self, fragment: &str) -> Result<Option<String>>;

    async fn input_exists(&self, id: &str) -> Result<bool>;

    /// Detach the named event handlers from the input. This deliberately
    /// removes host-page interceptors (paste/selection blockers) so a
    /// programmatic write is not rejected.
    async fn clear_input_handlers(&self, id: &str, events: &[String]) -> Result<()>;

    async fn focus_input(&self, id: &str) -> Result<()>;

    async fn set_input_value(&self, id: &str, value: &str) -> Result<()>;

    /// Dispatch a synthetic event on the input, bubbling and cancelable.
    async fn fire_input_event(&self, id: &str, event: &str) -> Result<()>;

    async fn set_input_attribute(&self, id: &str, name: &str, value: &str) -> Result<()>;

    async fn set_input_style(&self, id: &str, property: &str, value: &str) -> Result<()>;

    /// Create-or-update the notification banner; the page dismisses it
    /// itself after `ttl`.
    async fn show_banner(&self, text: &str, style: &str, ttl: Duration) -> Result<()>;

    /// Raise a blocking acknowledgment the operator must dismiss.
    async fn show_alert(&self, text: &str) -> Result<()>;
}
