//! Raster surface and full-repaint dot renderer.

pub mod renderer;
pub mod surface;

pub use renderer::DotRenderer;
pub use surface::{Bitmap, Color, Surface};
