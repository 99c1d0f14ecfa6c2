//! Stream reconciler — applies server-push events to an in-memory world.
//!
//! The [`World`] is the single source of truth for what gets rendered: a map
//! of entities keyed by connection id plus scalar session state (the viewer's
//! own id, the server's peer count, transport liveness). A [`Reconciler`]
//! wraps it and notifies a registered [`WorldObserver`] synchronously after
//! every committed mutation that changes visible content.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use dotfield_core::protocol::WorldEvent;
use dotfield_core::types::Entity;

/// Classification of an applied event.
///
/// `Visual` means the raster would look different and a redraw is owed.
/// `Session` covers observable state the renderer does not paint from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Visual,
    Session,
    Unchanged,
}

/// The reconciled view of the remote stream.
#[derive(Debug, Default)]
pub struct World {
    entities: HashMap<String, Entity>,
    self_id: Option<String>,
    peer_count: u64,
    connected: bool,
    last_event_at: Option<DateTime<Utc>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to completion. Events are handled strictly serially;
    /// there is no partial mutation to observe.
    pub fn apply(&mut self, event: WorldEvent) -> Applied {
        match event {
            WorldEvent::Upsert { id, x, y } => {
                self.touch();
                self.entities.insert(id.clone(), Entity::new(id, x, y));
                Applied::Visual
            }
            WorldEvent::Remove { id } => {
                self.touch();
                // Removing an id we never saw is a no-op, not an error.
                if self.entities.remove(&id).is_some() {
                    Applied::Visual
                } else {
                    debug!(%id, "Remove for unknown entity ignored");
                    Applied::Unchanged
                }
            }
            WorldEvent::SelfAnnounce { id } => {
                self.touch();
                // Re-announcement overwrites; the highlight follows the id.
                if self.self_id.as_deref() == Some(id.as_str()) {
                    Applied::Unchanged
                } else {
                    self.self_id = Some(id);
                    Applied::Visual
                }
            }
            WorldEvent::PeerCount { count } => {
                self.touch();
                if self.peer_count == count {
                    Applied::Unchanged
                } else {
                    self.peer_count = count;
                    Applied::Session
                }
            }
            WorldEvent::Connected => {
                if self.connected {
                    Applied::Unchanged
                } else {
                    self.connected = true;
                    Applied::Session
                }
            }
            WorldEvent::Disconnected => {
                if self.connected {
                    self.connected = false;
                    Applied::Session
                } else {
                    Applied::Unchanged
                }
            }
        }
    }

    /// All visible entities. Iteration order is unspecified.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// This client's own id, once the server has announced it.
    pub fn self_id(&self) -> Option<&str> {
        self.self_id.as_deref()
    }

    /// Last peer count announced by the server. The server is authoritative;
    /// this is not derived from the map size.
    pub fn peer_count(&self) -> u64 {
        self.peer_count
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    fn touch(&mut self) {
        self.last_event_at = Some(Utc::now());
    }
}

/// Observer notified after each committed visual mutation.
pub trait WorldObserver: Send {
    fn state_changed(&mut self, world: &World);
}

/// Owns the world and fans mutations out to the observer.
pub struct Reconciler {
    world: World,
    observer: Option<Box<dyn WorldObserver>>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            observer: None,
        }
    }

    /// Register the single observer. Registered once at startup.
    pub fn set_observer(&mut self, observer: Box<dyn WorldObserver>) {
        self.observer = Some(observer);
    }

    /// Apply one event and, if it changed visible content, notify the
    /// observer before the next event is handled.
    pub fn apply(&mut self, event: WorldEvent) -> Applied {
        let applied = self.world.apply(event);
        match applied {
            Applied::Visual => {
                if let Some(observer) = &mut self.observer {
                    observer.state_changed(&self.world);
                }
            }
            Applied::Session => {
                debug!(
                    peer_count = self.world.peer_count(),
                    connected = self.world.connected(),
                    "Session state changed"
                );
            }
            Applied::Unchanged => {}
        }
        applied
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(id: &str, x: f64, y: f64) -> WorldEvent {
        WorldEvent::Upsert {
            id: id.into(),
            x,
            y,
        }
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let mut world = World::new();
        world.apply(upsert("a", 1.0, 2.0));
        world.apply(upsert("a", 3.0, 4.0));
        world.apply(upsert("a", 5.0, 6.0));

        assert_eq!(world.entity_count(), 1);
        let entity = world.entity("a").unwrap();
        assert_eq!((entity.x, entity.y), (5.0, 6.0));
    }

    #[test]
    fn test_remove_unknown_id_is_a_noop() {
        let mut world = World::new();
        world.apply(upsert("a", 1.0, 2.0));

        let applied = world.apply(WorldEvent::Remove { id: "ghost".into() });
        assert_eq!(applied, Applied::Unchanged);
        assert_eq!(world.entity_count(), 1);
        assert!(world.entity("a").is_some());
    }

    #[test]
    fn test_upsert_then_remove_leaves_nothing() {
        let mut world = World::new();
        world.apply(upsert("a", 1.0, 2.0));
        let applied = world.apply(WorldEvent::Remove { id: "a".into() });

        assert_eq!(applied, Applied::Visual);
        assert_eq!(world.entity_count(), 0);
        assert!(world.entity("a").is_none());
    }

    #[test]
    fn test_peer_count_replaces_rather_than_accumulates() {
        let mut world = World::new();
        world.apply(WorldEvent::PeerCount { count: 5 });
        world.apply(WorldEvent::PeerCount { count: 3 });
        assert_eq!(world.peer_count(), 3);
    }

    #[test]
    fn test_self_announce_overwrites() {
        let mut world = World::new();
        assert!(world.self_id().is_none());

        assert_eq!(
            world.apply(WorldEvent::SelfAnnounce { id: "a".into() }),
            Applied::Visual
        );
        assert_eq!(world.self_id(), Some("a"));

        // Same id again changes nothing the renderer would paint.
        assert_eq!(
            world.apply(WorldEvent::SelfAnnounce { id: "a".into() }),
            Applied::Unchanged
        );

        assert_eq!(
            world.apply(WorldEvent::SelfAnnounce { id: "b".into() }),
            Applied::Visual
        );
        assert_eq!(world.self_id(), Some("b"));
    }

    #[test]
    fn test_out_of_bounds_positions_are_stored_as_is() {
        let mut world = World::new();
        world.apply(upsert("a", -40.0, 9000.5));
        let entity = world.entity("a").unwrap();
        assert_eq!((entity.x, entity.y), (-40.0, 9000.5));
    }

    #[test]
    fn test_connect_disconnect_session_state() {
        let mut world = World::new();
        assert!(!world.connected());
        assert_eq!(world.apply(WorldEvent::Connected), Applied::Session);
        assert!(world.connected());
        assert_eq!(world.apply(WorldEvent::Connected), Applied::Unchanged);
        assert_eq!(world.apply(WorldEvent::Disconnected), Applied::Session);
        assert!(!world.connected());
    }

    #[test]
    fn test_event_burst_scenario() {
        let mut world = World::new();
        world.apply(upsert("1", 10.0, 20.0));
        world.apply(upsert("2", 30.0, 40.0));
        world.apply(WorldEvent::Remove { id: "1".into() });
        world.apply(WorldEvent::PeerCount { count: 1 });

        assert_eq!(world.entity_count(), 1);
        let survivor = world.entity("2").unwrap();
        assert_eq!((survivor.x, survivor.y), (30.0, 40.0));
        assert_eq!(world.peer_count(), 1);
    }

    #[test]
    fn test_last_event_at_tracks_wire_events() {
        let mut world = World::new();
        assert!(world.last_event_at().is_none());
        world.apply(upsert("a", 0.0, 0.0));
        assert!(world.last_event_at().is_some());
    }

    /// Counts notifications and remembers the entity count at each one.
    struct RecordingObserver {
        seen: std::sync::Arc<std::sync::Mutex<Vec<usize>>>,
    }

    impl WorldObserver for RecordingObserver {
        fn state_changed(&mut self, world: &World) {
            self.seen.lock().unwrap().push(world.entity_count());
        }
    }

    #[test]
    fn test_reconciler_notifies_once_per_visual_mutation() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut reconciler = Reconciler::new();
        reconciler.set_observer(Box::new(RecordingObserver { seen: seen.clone() }));

        reconciler.apply(upsert("1", 1.0, 1.0));
        reconciler.apply(upsert("2", 2.0, 2.0));
        reconciler.apply(WorldEvent::Remove { id: "1".into() });
        // Session-only and no-op events do not notify.
        reconciler.apply(WorldEvent::PeerCount { count: 7 });
        reconciler.apply(WorldEvent::Remove { id: "ghost".into() });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[1, 2, 1]);
        assert_eq!(reconciler.world().peer_count(), 7);
    }
}
