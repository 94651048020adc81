//! Live fan-out of the latest predictions.
//!
//! The scheduler publishes a whole snapshot per cycle into a `watch`
//! channel; each WebSocket client gets the current snapshot on connect and
//! every later one as JSON text frames. Slow clients only ever see the
//! newest snapshot, never a backlog.

use crate::pipeline::PredictionRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSnapshot {
    pub generated_at: Option<DateTime<Utc>>,
    pub predictions: Vec<PredictionRecord>,
}

impl PredictionSnapshot {
    pub fn new(predictions: Vec<PredictionRecord>) -> Self {
        Self {
            generated_at: Some(Utc::now()),
            predictions,
        }
    }
}

/// Holds the latest snapshot; any number of subscribers may watch it.
#[derive(Clone)]
pub struct PredictionHub {
    tx: watch::Sender<Arc<PredictionSnapshot>>,
}

impl PredictionHub {
    pub fn new(initial: PredictionSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Replace the current snapshot. Works with zero subscribers.
    pub fn publish(&self, snapshot: PredictionSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PredictionSnapshot>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Arc<PredictionSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

fn snapshot_message(snapshot: &PredictionSnapshot) -> Result<Message> {
    let json = serde_json::to_string(snapshot).context("failed to serialize snapshot")?;
    Ok(Message::Text(json))
}

/// Bind `bind_addr` and serve clients until the task is dropped.
pub async fn serve(bind_addr: &str, hub: PredictionHub) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind stream server on {}", bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "prediction stream listening");
    serve_listener(listener, hub).await
}

pub async fn serve_listener(listener: TcpListener, hub: PredictionHub) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("stream accept failed: {:#}", e);
                continue;
            }
        };
        let rx = hub.subscribe();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, peer, rx).await {
                tracing::debug!(%peer, "stream client ended with error: {:#}", e);
            }
        });
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    mut rx: watch::Receiver<Arc<PredictionSnapshot>>,
) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .context("WS handshake failed")?;
    let (mut write, mut read) = ws.split();
    tracing::debug!(%peer, "stream client connected");

    let current = rx.borrow_and_update().clone();
    write.send(snapshot_message(&current)?).await.context("WS send failed")?;

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    // Hub dropped: the process is shutting down.
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                let latest = rx.borrow_and_update().clone();
                write.send(snapshot_message(&latest)?).await.context("WS send failed")?;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(anyhow::anyhow!(e).context("WS read error")),
                }
            }
        }
    }

    tracing::debug!(%peer, "stream client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let hub = PredictionHub::new(PredictionSnapshot::default());
        assert_eq!(hub.subscriber_count(), 0);
        hub.publish(PredictionSnapshot::new(Vec::new()));
        assert!(hub.latest().generated_at.is_some());
    }

    #[tokio::test]
    async fn test_subscriber_sees_latest_snapshot() {
        let hub = PredictionHub::new(PredictionSnapshot::default());
        let mut rx = hub.subscribe();
        hub.publish(PredictionSnapshot::new(Vec::new()));
        rx.changed().await.unwrap();
        assert!(rx.borrow().generated_at.is_some());
    }

    #[tokio::test]
    async fn test_ws_client_receives_current_then_new_snapshot() {
        let hub = PredictionHub::new(PredictionSnapshot::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_listener(listener, hub.clone()));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();

        let first = ws.next().await.unwrap().unwrap();
        let snap: PredictionSnapshot = serde_json::from_str(first.to_text().unwrap()).unwrap();
        assert!(snap.generated_at.is_none());

        hub.publish(PredictionSnapshot::new(Vec::new()));
        let second = ws.next().await.unwrap().unwrap();
        let snap: PredictionSnapshot = serde_json::from_str(second.to_text().unwrap()).unwrap();
        assert!(snap.generated_at.is_some());

        ws.close(None).await.unwrap();
        server.abort();
    }
}
