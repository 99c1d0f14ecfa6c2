//! End-to-end pipeline: raw SSE bytes → parser → decode → world → raster.

use dotfield_canvas::{Bitmap, Color, DotRenderer};
use dotfield_client::{decode, SseParser};
use dotfield_world::World;

/// A session transcript the way the server frames it, including a comment
/// keep-alive, an unknown event name, and one corrupt payload.
const TRANSCRIPT: &str = "event:newConnection\n\
data:{\"id\":\"me\"}\n\
\n\
data:{\"id\":\"me\",\"type\":\"position\",\"time\":\"t0\",\"x\":10,\"y\":20}\n\
\n\
data:{\"id\":\"other\",\"type\":\"position\",\"time\":\"t1\",\"x\":200,\"y\":300}\n\
\n\
: keep-alive\n\
\n\
event:serverGossip\n\
data:{\"noise\":true}\n\
\n\
data:{this is not json}\n\
\n\
data:{\"id\":\"other\",\"type\":\"position\",\"time\":\"t2\",\"x\":250,\"y\":350}\n\
\n\
event:numClients\n\
data:{\"numClients\":2}\n\
\n\
event:removeConnection\n\
data:{\"id\":\"gone\"}\n\
\n";

#[test]
fn test_transcript_reconciles_and_renders() {
    let mut parser = SseParser::new();
    let mut world = World::new();
    let mut dropped = 0;

    // Feed in tiny chunks so events straddle chunk boundaries.
    for chunk in TRANSCRIPT.as_bytes().chunks(7) {
        for sse in parser.feed(chunk) {
            match decode(&sse) {
                Ok(Some(event)) => {
                    world.apply(event);
                }
                Ok(None) => {}
                Err(_) => dropped += 1,
            }
        }
    }

    // The corrupt payload was dropped without touching the map.
    assert_eq!(dropped, 1);
    assert_eq!(world.entity_count(), 2);
    assert_eq!(world.self_id(), Some("me"));
    assert_eq!(world.peer_count(), 2);

    // "other" moved; only its last position survives.
    let other = world.entity("other").unwrap();
    assert_eq!((other.x, other.y), (250.0, 350.0));

    let mut renderer = DotRenderer::new(Bitmap::new(500, 500));
    renderer.redraw(&world);
    let bitmap = renderer.surface().unwrap();

    // One highlighted square for "me", one default square for "other",
    // nothing at the stale position.
    assert_eq!(bitmap.count(Color::ORANGE), 100);
    assert_eq!(bitmap.count(Color::BLACK), 100);
    assert_eq!(bitmap.pixel(10, 20), Some(Color::ORANGE));
    assert_eq!(bitmap.pixel(250, 350), Some(Color::BLACK));
    assert_eq!(bitmap.pixel(200, 300), Some(Color::CLEAR));
}
