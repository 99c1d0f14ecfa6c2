//! Dotfield wire protocol.
//!
//! The server pushes named SSE events; each carries a JSON payload. The
//! transport layer deserializes payloads into these structs and hands the
//! reconciler a typed [`WorldEvent`].

use serde::{Deserialize, Serialize};

/// SSE event name announcing this client's own connection id.
pub const EVENT_SELF_ANNOUNCE: &str = "newConnection";
/// SSE event name removing a departed peer.
pub const EVENT_REMOVE: &str = "removeConnection";
/// SSE event name carrying the authoritative peer count.
pub const EVENT_PEER_COUNT: &str = "numClients";

/// Payload of the default (unnamed) SSE event: a position upsert.
///
/// The server also sends `type` and `time` fields on this payload; they carry
/// no client-side meaning and deserialization ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPayload {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Payload of `newConnection` and `removeConnection` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPayload {
    pub id: String,
}

/// Payload of `numClients` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerCountPayload {
    #[serde(rename = "numClients")]
    pub num_clients: u64,
}

/// A typed message for the reconciler.
///
/// `Connected`/`Disconnected` never appear on the wire; the transport
/// synthesizes them around the lifetime of the subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// Insert or overwrite the entity keyed by `id`.
    Upsert { id: String, x: f64, y: f64 },
    /// Delete the entity keyed by `id`; absent ids are a no-op.
    Remove { id: String },
    /// The server announced this client's own id.
    SelfAnnounce { id: String },
    /// The server's authoritative count of connected peers.
    PeerCount { count: u64 },
    /// The subscription is established.
    Connected,
    /// The subscription ended or failed.
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_payload_ignores_extra_fields() {
        let raw = r#"{"id":"c-1","type":"position","time":"12:00:00","x":42,"y":7}"#;
        let payload: UpsertPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.id, "c-1");
        assert_eq!(payload.x, 42.0);
        assert_eq!(payload.y, 7.0);
    }

    #[test]
    fn test_peer_count_payload_field_name() {
        let payload: PeerCountPayload = serde_json::from_str(r#"{"numClients":5}"#).unwrap();
        assert_eq!(payload.num_clients, 5);
    }

    #[test]
    fn test_upsert_payload_missing_field_is_an_error() {
        let result = serde_json::from_str::<UpsertPayload>(r#"{"id":"c-1","x":1}"#);
        assert!(result.is_err());
    }
}
