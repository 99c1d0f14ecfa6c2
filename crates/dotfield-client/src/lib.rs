//! SSE transport for Dotfield.
//!
//! Turns one long-lived server-push subscription into a stream of typed
//! [`WorldEvent`](dotfield_core::protocol::WorldEvent)s: the [`sse`] module
//! parses the wire framing, [`decode`] maps named events to world events, and
//! [`subscription`] owns the HTTP connection.

pub mod decode;
pub mod sse;
pub mod subscription;

pub use decode::decode;
pub use sse::{SseEvent, SseParser};
pub use subscription::Subscription;
