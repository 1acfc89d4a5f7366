//! In-memory [`Page`] used by the test suites of the downstream crates.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::page::Page;

/// Observable state of one fake form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeInput {
    pub value: String,
    pub focused: bool,
    pub attributes: HashMap<String, String>,
    pub styles: HashMap<String, String>,
    /// Synthetic events dispatched on this input, in order.
    pub fired_events: Vec<String>,
    /// Handler names detached from this input, in order.
    pub cleared_handlers: Vec<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    /// (element id, raw src) in document order.
    images: Vec<(String, String)>,
    inputs: HashMap<String, FakeInput>,
    /// (text, style) of every banner shown.
    banners: Vec<(String, String)>,
    alerts: Vec<String>,
}

/// A scripted page that records every operation performed on it.
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: url.into(),
                ..Default::default()
            }),
        }
    }

    pub fn with_image(mut self, id: impl Into<String>, src: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .images
            .push((id.into(), src.into()));
        self
    }

    pub fn with_input(mut self, id: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .inputs
            .insert(id.into(), FakeInput::default());
        self
    }

    pub async fn input(&self, id: &str) -> Option<FakeInput> {
        self.state.lock().await.inputs.get(id).cloned()
    }

    pub async fn banners(&self) -> Vec<(String, String)> {
        self.state.lock().await.banners.clone()
    }

    pub async fn alerts(&self) -> Vec<String> {
        self.state.lock().await.alerts.clone()
    }
}

#[async_trait]
impl Page for FakePage {
    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().await.url.clone())
    }

    async fn image_source_by_id(&self, id: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .images
            .iter()
            .find(|(image_id, _)| image_id == id)
            .map(|(_, src)| src.clone()))
    }

    async fn image_source_by_extension(&self, extensions: &[String]) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .images
            .iter()
            .find(|(_, src)| {
                let bare = src.split('#').next().unwrap_or("").to_lowercase();
                extensions.iter().any(|ext| bare.ends_with(&ext.to_lowercase()))
            })
            .map(|(_, src)| src.clone()))
    }

    async fn image_source_by_id_fragment(&self, fragment: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .images
            .iter()
            .find(|(image_id, _)| image_id.contains(fragment))
            .map(|(_, src)| src.clone()))
    }

    async fn input_exists(&self, id: &str) -> Result<bool> {
        Ok(self.state.lock().await.inputs.contains_key(id))
    }

    async fn clear_input_handlers(&self, id: &str, events: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(input) = state.inputs.get_mut(id) {
            input.cleared_handlers.extend(events.iter().cloned());
        }
        Ok(())
    }

    async fn focus_input(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        for (input_id, input) in state.inputs.iter_mut() {
            input.focused = input_id == id;
        }
        Ok(())
    }

    async fn set_input_value(&self, id: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(input) = state.inputs.get_mut(id) {
            input.value = value.to_string();
        }
        Ok(())
    }

    async fn fire_input_event(&self, id: &str, event: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(input) = state.inputs.get_mut(id) {
            input.fired_events.push(event.to_string());
        }
        Ok(())
    }

    async fn set_input_attribute(&self, id: &str, name: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(input) = state.inputs.get_mut(id) {
            input.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn set_input_style(&self, id: &str, property: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(input) = state.inputs.get_mut(id) {
            input.styles.insert(property.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn show_banner(&self, text: &str, style: &str, _ttl: Duration) -> Result<()> {
        let mut state = self.state.lock().await;
        state.banners.push((text.to_string(), style.to_string()));
        Ok(())
    }

    async fn show_alert(&self, text: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.alerts.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_input_operations_in_order() {
        let page = FakePage::new("https://host/apply").with_input("ssn");
        page.set_input_value("ssn", "123-45-6789").await.unwrap();
        page.fire_input_event("ssn", "input").await.unwrap();
        page.fire_input_event("ssn", "change").await.unwrap();

        let input = page.input("ssn").await.unwrap();
        assert_eq!(input.value, "123-45-6789");
        assert_eq!(input.fired_events, vec!["input", "change"]);
    }

    #[tokio::test]
    async fn mutations_on_absent_inputs_are_noops() {
        let page = FakePage::new("https://host/apply");
        page.set_input_value("nope", "x").await.unwrap();
        assert!(page.input("nope").await.is_none());
    }

    #[tokio::test]
    async fn extension_probe_ignores_fragments_and_case() {
        let page = FakePage::new("https://host/apply")
            .with_image("hero", "banner.svg")
            .with_image("scan", "uploads/doc.JPG#zoom");
        let src = page
            .image_source_by_extension(&[".jpg".to_string()])
            .await
            .unwrap();
        assert_eq!(src.as_deref(), Some("uploads/doc.JPG#zoom"));
    }
}
