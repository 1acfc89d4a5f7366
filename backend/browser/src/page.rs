//! The CDP-backed page implementation.
//!
//! Every operation is one `Runtime.evaluate` with a small guarded script;
//! a script that finds no matching element is a no-op, matching the page
//! trait's contract.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use scanfill_core::Page;

use crate::cdp_client::CdpClient;

const BANNER_ELEMENT_ID: &str = "scanfill-banner";

pub struct CdpPage {
    client: CdpClient,
}

impl CdpPage {
    pub fn new(client: CdpClient) -> Self {
        Self { client }
    }

    /// Attach to a tab's debugger WebSocket and enable the runtime domain.
    pub async fn attach(ws_endpoint: &str) -> Result<Self> {
        let client = CdpClient::connect(ws_endpoint).await?;
        client.send_command("Runtime.enable", json!({})).await?;
        Ok(Self::new(client))
    }

    /// Evaluate an expression in the page and return its by-value result.
    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .client
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("exception")
                .and_then(|e| e.get("description"))
                .and_then(Value::as_str)
                .unwrap_or("unknown script exception");
            return Err(anyhow!("page script failed: {text}"));
        }
        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn evaluate_string(&self, expression: &str) -> Result<String> {
        match self.evaluate(expression).await? {
            Value::String(s) => Ok(s),
            other => Err(anyhow!("expected a string result, got {other}")),
        }
    }

    async fn evaluate_opt_string(&self, expression: &str) -> Result<Option<String>> {
        match self.evaluate(expression).await? {
            Value::String(s) => Ok(Some(s)),
            Value::Null => Ok(None),
            other => Err(anyhow!("expected a string or null result, got {other}")),
        }
    }

    async fn evaluate_unit(&self, expression: &str) -> Result<()> {
        self.evaluate(expression).await.map(|_| ())
    }
}

/// A string rendered as a JS literal, quoting and escapes included.
fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// A string slice rendered as a JS array literal.
fn js_str_array(items: &[String]) -> String {
    Value::Array(items.iter().cloned().map(Value::String).collect()).to_string()
}

#[async_trait]
impl Page for CdpPage {
    async fn current_url(&self) -> Result<String> {
        self.evaluate_string("location.href").await
    }

    async fn image_source_by_id(&self, id: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); \
             return el && el.tagName === 'IMG' ? el.getAttribute('src') : null; }})()",
            id = js_str(id),
        );
        self.evaluate_opt_string(&script).await
    }

    async fn image_source_by_extension(&self, extensions: &[String]) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const exts = {exts}.map(e => e.toLowerCase()); \
             for (const img of document.images) {{ \
               const src = img.getAttribute('src') || ''; \
               const bare = src.split('#')[0].toLowerCase(); \
               if (exts.some(e => bare.endsWith(e))) return src; \
             }} return null; }})()",
            exts = js_str_array(extensions),
        );
        self.evaluate_opt_string(&script).await
    }

    async fn image_source_by_id_fragment(&self, fragment: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const frag = {frag}; \
             for (const img of document.images) {{ \
               if (img.id && img.id.includes(frag)) return img.getAttribute('src'); \
             }} return null; }})()",
            frag = js_str(fragment),
        );
        self.evaluate_opt_string(&script).await
    }

    async fn input_exists(&self, id: &str) -> Result<bool> {
        let script = format!("document.getElementById({}) !== null", js_str(id));
        match self.evaluate(&script).await? {
            Value::Bool(b) => Ok(b),
            other => Err(anyhow!("expected a boolean result, got {other}")),
        }
    }

    async fn clear_input_handlers(&self, id: &str, events: &[String]) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); if (!el) return; \
             for (const ev of {events}) {{ \
               el['on' + ev] = null; el.removeAttribute('on' + ev); \
             }} }})()",
            id = js_str(id),
            events = js_str_array(events),
        );
        self.evaluate_unit(&script).await
    }

    async fn focus_input(&self, id: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); if (el) el.focus(); }})()",
            id = js_str(id),
        );
        self.evaluate_unit(&script).await
    }

    async fn set_input_value(&self, id: &str, value: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); if (el) el.value = {value}; }})()",
            id = js_str(id),
            value = js_str(value),
        );
        self.evaluate_unit(&script).await
    }

    async fn fire_input_event(&self, id: &str, event: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); if (!el) return; \
             el.dispatchEvent(new Event({event}, {{ bubbles: true, cancelable: true }})); }})()",
            id = js_str(id),
            event = js_str(event),
        );
        self.evaluate_unit(&script).await
    }

    async fn set_input_attribute(&self, id: &str, name: &str, value: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); \
             if (el) el.setAttribute({name}, {value}); }})()",
            id = js_str(id),
            name = js_str(name),
            value = js_str(value),
        );
        self.evaluate_unit(&script).await
    }

    async fn set_input_style(&self, id: &str, property: &str, value: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); \
             if (el) el.style[{prop}] = {value}; }})()",
            id = js_str(id),
            prop = js_str(property),
            value = js_str(value),
        );
        self.evaluate_unit(&script).await
    }

    async fn show_banner(&self, text: &str, style: &str, ttl: Duration) -> Result<()> {
        // Upsert a single banner element; re-showing resets the dismissal
        // timer so a newer message always gets its full time on screen.
        let script = format!(
            "(() => {{ \
             let el = document.getElementById({banner_id}); \
             if (!el) {{ el = document.createElement('div'); el.id = {banner_id}; \
               document.body.appendChild(el); }} \
             el.textContent = {text}; \
             el.setAttribute('style', {style}); \
             if (window.__scanfillBannerTimer) clearTimeout(window.__scanfillBannerTimer); \
             window.__scanfillBannerTimer = setTimeout(() => {{ \
               el.remove(); window.__scanfillBannerTimer = null; }}, {ttl_ms}); \
             }})()",
            banner_id = js_str(BANNER_ELEMENT_ID),
            text = js_str(text),
            style = js_str(style),
            ttl_ms = ttl.as_millis(),
        );
        self.evaluate_unit(&script).await
    }

    async fn show_alert(&self, text: &str) -> Result<()> {
        // Deferred so the evaluate call returns before the modal blocks the
        // page's script context.
        let script = format!("setTimeout(() => alert({}), 0)", js_str(text));
        self.evaluate_unit(&script).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_str_escapes_quotes_and_newlines() {
        assert_eq!(js_str("plain"), r#""plain""#);
        assert_eq!(js_str(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(js_str("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn js_str_array_renders_a_literal() {
        let items = vec![".jpg".to_string(), ".png".to_string()];
        assert_eq!(js_str_array(&items), r#"[".jpg",".png"]"#);
    }
}
