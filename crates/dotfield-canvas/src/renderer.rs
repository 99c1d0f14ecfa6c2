//! Full-repaint dot renderer.

use tracing::{debug, trace};

use dotfield_world::{World, WorldObserver};

use crate::surface::{Color, Surface};

/// Default edge length of a painted dot, in surface units.
pub const DEFAULT_DOT_SIZE: u32 = 10;

/// Paints the world onto an injected surface, one square per entity.
///
/// Every redraw is a full repaint: clear, then paint the whole map. Removed
/// entities therefore leave no stale pixels behind. The renderer never
/// mutates the world and performs no I/O beyond the surface operations.
pub struct DotRenderer<S: Surface> {
    surface: Option<S>,
    dot_size: u32,
    dot_color: Color,
    self_color: Color,
}

impl<S: Surface> DotRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Some(surface),
            dot_size: DEFAULT_DOT_SIZE,
            dot_color: Color::BLACK,
            self_color: Color::ORANGE,
        }
    }

    /// A renderer with no surface yet; redraws are skipped until one is
    /// attached.
    pub fn detached() -> Self {
        Self {
            surface: None,
            dot_size: DEFAULT_DOT_SIZE,
            dot_color: Color::BLACK,
            self_color: Color::ORANGE,
        }
    }

    pub fn with_dot_size(mut self, dot_size: u32) -> Self {
        self.dot_size = dot_size;
        self
    }

    pub fn attach(&mut self, surface: S) {
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Repaint the surface from a snapshot of the world.
    ///
    /// Iteration order over the map is unspecified; only the final raster
    /// matters. A missing surface is a recoverable skip, not an error.
    pub fn redraw(&mut self, world: &World) {
        let Some(surface) = self.surface.as_mut() else {
            debug!("Redraw skipped: no surface attached");
            return;
        };

        surface.clear();
        let self_id = world.self_id();
        for entity in world.entities() {
            let color = if Some(entity.id.as_str()) == self_id {
                self.self_color
            } else {
                self.dot_color
            };
            surface.fill_rect(
                entity.x.floor() as i64,
                entity.y.floor() as i64,
                self.dot_size,
                self.dot_size,
                color,
            );
        }
        trace!(entities = world.entity_count(), "Redraw complete");
    }
}

impl<S: Surface + Send> WorldObserver for DotRenderer<S> {
    fn state_changed(&mut self, world: &World) {
        self.redraw(world);
    }
}
