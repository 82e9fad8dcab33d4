//! Realtime service: a WebSocket subscription to resource channels.
//!
//! Each [`Realtime::subscribe`] call opens its own connection to
//! `<realtime endpoint>/realtime?project=..&channels[]=..`, replaying the session cookies so
//! user-scoped channels (`account`, `teams`) are authorized. A background task keeps the
//! connection alive with a `{"type":"ping"}` frame every [`HEARTBEAT_INTERVAL`] and hands
//! every `event` frame to the callback. There is no reconnection: once the socket closes,
//! [`Subscription::is_connected`] turns false and stays false.

pub mod models;


use crate::core::{Client, Error};
use futures::{SinkExt, StreamExt};
use models::{Envelope, ErrorData, RealtimeEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

const PING: &str = r#"{"type":"ping"}"#;

#[derive(Clone)]
pub struct Realtime {
    client: Client,
}

impl Realtime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn url(&self, channels: &[String]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}/realtime", self.client.realtime_endpoint()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("project", self.client.project_id());
            for channel in channels {
                query.append_pair("channels[]", channel);
            }
        }
        Ok(url)
    }

    /// Connects and starts delivering events for `channels` to `callback`.
    ///
    /// The callback runs on the subscription task; keep it short.
    pub async fn subscribe<F>(&self, channels: &[&str], callback: F) -> Result<Subscription, Error>
    where
        F: Fn(RealtimeEvent) + Send + Sync + 'static,
    {
        if channels.is_empty() {
            return Err(Error::Config("at least one realtime channel is required".into()));
        }
        let channels: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
        let url = self.url(&channels)?;

        let mut request = url.as_str().into_client_request()?;
        if let Some(cookie) = self.client.cookies().header_value() {
            request.headers_mut().insert(COOKIE, cookie);
        }

        let (socket, _) = tokio_tungstenite::connect_async(request).await?;
        tracing::info!(channels = ?channels, "realtime connected");

        let connected = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&connected);
        let (mut write, mut read) = socket.split();

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + HEARTBEAT_INTERVAL;
            let mut heartbeat = tokio::time::interval_at(start, HEARTBEAT_INTERVAL);
            loop {
                tokio::select! {
                    _ = heartbeat.tick() => {
                        if let Err(err) = write.send(Message::Text(PING.to_string())).await {
                            tracing::warn!(error = %err, "realtime heartbeat failed");
                            break;
                        }
                    }
                    frame = read.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            dispatch(&text, &callback);
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "realtime connection failed");
                            break;
                        }
                    }
                }
            }
            flag.store(false, Ordering::SeqCst);
            tracing::info!("realtime disconnected");
        });

        Ok(Subscription {
            channels,
            connected,
            task: Some(task),
        })
    }
}

/// Handles one text frame. Returns `true` when the callback was invoked.
pub(crate) fn dispatch<F>(text: &str, callback: &F) -> bool
where
    F: Fn(RealtimeEvent),
{
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable realtime frame");
            return false;
        }
    };
    match envelope.kind.as_str() {
        "event" => match serde_json::from_value::<RealtimeEvent>(envelope.data) {
            Ok(event) => {
                callback(event);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "malformed realtime event");
                false
            }
        },
        "error" => {
            let data: ErrorData = serde_json::from_value(envelope.data).unwrap_or_default();
            tracing::warn!(code = data.code, message = %data.message, "realtime error");
            false
        }
        "connected" => {
            tracing::debug!(data = %envelope.data, "realtime subscription confirmed");
            false
        }
        "pong" => false,
        other => {
            tracing::debug!(kind = other, "ignoring realtime frame");
            false
        }
    }
}

/// Handle to a running subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    channels: Vec<String>,
    connected: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Stops the subscription task. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.connected.store(false, Ordering::SeqCst);
            tracing::debug!(channels = ?self.channels, "realtime unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
