//! Mapping from named SSE events to [`WorldEvent`]s.

use tracing::debug;

use dotfield_core::protocol::{
    ConnectionPayload, PeerCountPayload, UpsertPayload, WorldEvent, EVENT_PEER_COUNT,
    EVENT_REMOVE, EVENT_SELF_ANNOUNCE,
};
use dotfield_core::Result;

use crate::sse::SseEvent;

/// Decode one SSE event.
///
/// Unknown event names are ignorable (`Ok(None)`), never fatal. A payload
/// that fails to deserialize is an error; the caller logs it and leaves the
/// world untouched.
pub fn decode(event: &SseEvent) -> Result<Option<WorldEvent>> {
    match event.event.as_deref() {
        // The default unnamed event (reqwest gives us `None`; the wire name
        // "message" is equivalent) is a position upsert.
        None | Some("") | Some("message") => {
            let payload: UpsertPayload = serde_json::from_str(&event.data)?;
            Ok(Some(WorldEvent::Upsert {
                id: payload.id,
                x: payload.x,
                y: payload.y,
            }))
        }
        Some(EVENT_SELF_ANNOUNCE) => {
            let payload: ConnectionPayload = serde_json::from_str(&event.data)?;
            Ok(Some(WorldEvent::SelfAnnounce { id: payload.id }))
        }
        Some(EVENT_REMOVE) => {
            let payload: ConnectionPayload = serde_json::from_str(&event.data)?;
            Ok(Some(WorldEvent::Remove { id: payload.id }))
        }
        Some(EVENT_PEER_COUNT) => {
            let payload: PeerCountPayload = serde_json::from_str(&event.data)?;
            Ok(Some(WorldEvent::PeerCount {
                count: payload.num_clients,
            }))
        }
        Some(other) => {
            debug!(event = other, "Ignoring unknown event name");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sse(event: Option<&str>, data: &str) -> SseEvent {
        SseEvent {
            event: event.map(String::from),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_decode_unnamed_event_as_upsert() {
        let decoded = decode(&sse(
            None,
            r#"{"id":"c-9","type":"position","time":"now","x":12,"y":34}"#,
        ))
        .unwrap();
        assert_eq!(
            decoded,
            Some(WorldEvent::Upsert {
                id: "c-9".into(),
                x: 12.0,
                y: 34.0
            })
        );
    }

    #[test]
    fn test_decode_self_announce() {
        let decoded = decode(&sse(Some("newConnection"), r#"{"id":"me"}"#)).unwrap();
        assert_eq!(decoded, Some(WorldEvent::SelfAnnounce { id: "me".into() }));
    }

    #[test]
    fn test_decode_remove() {
        let decoded = decode(&sse(Some("removeConnection"), r#"{"id":"c-2"}"#)).unwrap();
        assert_eq!(decoded, Some(WorldEvent::Remove { id: "c-2".into() }));
    }

    #[test]
    fn test_decode_peer_count() {
        let decoded = decode(&sse(Some("numClients"), r#"{"numClients":4}"#)).unwrap();
        assert_eq!(decoded, Some(WorldEvent::PeerCount { count: 4 }));
    }

    #[test]
    fn test_unknown_event_name_is_ignored() {
        let decoded = decode(&sse(Some("serverGossip"), r#"{"whatever":true}"#)).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(decode(&sse(None, "not json")).is_err());
        assert!(decode(&sse(Some("newConnection"), r#"{"noId":1}"#)).is_err());
    }
}
