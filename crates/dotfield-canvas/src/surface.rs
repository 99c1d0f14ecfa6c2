//! 2D raster surface abstraction.
//!
//! The renderer only ever issues two operations against a surface: clear and
//! fill-rectangle. [`Bitmap`] is the in-memory implementation a host can blit
//! from; anything that can honor the same two operations (a window, a
//! terminal cell grid) can stand in behind the [`Surface`] trait.

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent; the cleared state of a surface.
    pub const CLEAR: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    /// Default dot color.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Highlight color for the viewer's own dot.
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
}

/// A fixed-size 2D drawing surface.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Reset every pixel to the cleared state.
    fn clear(&mut self);

    /// Fill a `w`×`h` rectangle anchored at `(x, y)`.
    ///
    /// Coordinates may lie partially or fully outside the surface; the
    /// rectangle is clipped to bounds and out-of-bounds pixels are dropped
    /// silently.
    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color);
}

/// An owned pixel buffer, row-major.
#[derive(Debug, Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::CLEAR; (width as usize) * (height as usize)],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Raw pixel data, row-major, for host blitting.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Number of pixels currently holding `color`.
    pub fn count(&self, color: Color) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(Color::CLEAR);
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        if x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i64).min(self.width as i64);
        let y1 = (y + h as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for row in y0..y1 {
            let start = (row as usize) * (self.width as usize) + (x0 as usize);
            let end = (row as usize) * (self.width as usize) + (x1 as usize);
            self.pixels[start..end].fill(color);
        }
    }
}
