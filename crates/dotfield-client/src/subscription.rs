//! The long-lived server-push subscription.

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{info, warn};

use dotfield_core::protocol::WorldEvent;
use dotfield_core::{DotfieldError, Result};

use crate::decode::decode;
use crate::sse::event_stream;

/// One SSE subscription to the world endpoint.
///
/// There is deliberately no auto-reconnect: channel loss surfaces as a
/// [`WorldEvent::Disconnected`] and the session ends. Reconnection policy
/// belongs to the operator, not this layer.
pub struct Subscription {
    client: reqwest::Client,
    endpoint: String,
}

impl Subscription {
    pub fn new(endpoint: impl Into<String>, connect_timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .build()
            .map_err(|e| DotfieldError::Stream(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open the push channel and decode it into world events.
    ///
    /// The stream starts with `Connected`, ends with `Disconnected`, and in
    /// between yields every decodable wire event in arrival order. Malformed
    /// payloads are logged and dropped; the world is never touched by them.
    pub async fn open(&self) -> Result<Pin<Box<dyn Stream<Item = WorldEvent> + Send>>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| DotfieldError::Stream(format!("connect to {}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DotfieldError::Stream(format!(
                "subscription rejected: HTTP {status}"
            )));
        }
        info!(endpoint = %self.endpoint, "Push channel open");

        let decoded = event_stream(response).filter_map(|item| async move {
            match item {
                Ok(sse) => match decode(&sse) {
                    Ok(world_event) => world_event,
                    Err(e) => {
                        warn!(error = %e, data = %sse.data, "Dropping malformed event payload");
                        None
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Push channel failed");
                    None
                }
            }
        });

        let stream = futures::stream::once(async { WorldEvent::Connected })
            .chain(decoded)
            .chain(futures::stream::once(async { WorldEvent::Disconnected }));

        Ok(Box::pin(stream))
    }
}
