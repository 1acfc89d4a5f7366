//! Chrome DevTools Protocol client.
//!
//! Attaches to a running Chromium instance over its debugger WebSocket and
//! issues JSON-RPC commands. One client scripts one tab; responses are
//! matched to callers by command id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CdpClient {
    sink: Mutex<WsSink>,
    pending: PendingMap,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
}

impl CdpClient {
    /// Attach to the debugger WebSocket of an already-running tab, e.g.
    /// `ws://127.0.0.1:9222/devtools/page/<id>`.
    pub async fn connect(ws_endpoint: &str) -> Result<Self> {
        info!(endpoint = ws_endpoint, "Connecting to CDP websocket");
        let (stream, _) = connect_async(ws_endpoint)
            .await
            .with_context(|| format!("failed to attach to {ws_endpoint}"))?;
        let (sink, source) = stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader = tokio::spawn(route_responses(source, pending.clone()));

        Ok(Self {
            sink: Mutex::new(sink),
            pending,
            next_id: AtomicU64::new(1),
            reader,
        })
    }

    /// Issue one protocol command and wait for its reply. A protocol-level
    /// error object becomes an `Err`; so does a reply that never arrives
    /// within the command timeout.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let payload = json!({ "id": id, "method": method, "params": params });
        debug!(id, method, "Sending CDP command");
        self.sink
            .lock()
            .await
            .send(Message::Text(payload.to_string()))
            .await
            .with_context(|| format!("failed to send {method}"))?;

        let reply = match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                bail!("browser connection closed while waiting for {method}")
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                bail!("no reply to {method} within {}s", COMMAND_TIMEOUT.as_secs())
            }
        };

        if let Some(error) = reply.get("error") {
            return Err(anyhow!("{method} failed: {error}"));
        }
        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Reads the socket for the client's lifetime and completes the oneshot
/// matching each reply's id. Events (messages without an id) are ignored.
async fn route_responses(
    mut source: futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    pending: PendingMap,
) {
    while let Some(message) = source.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "CDP websocket read failed");
                break;
            }
        };
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            warn!("Discarding undecodable CDP frame");
            continue;
        };
        if let Some(id) = value.get("id").and_then(Value::as_u64) {
            if let Some(tx) = pending.lock().await.remove(&id) {
                let _ = tx.send(value);
            }
        }
    }
    // Wake every waiter so callers fail fast instead of timing out.
    pending.lock().await.clear();
}
