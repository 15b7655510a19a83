use serde::{Deserialize, Serialize};
use shoalviz_core::{BBox, Point};

/// Pixel dimensions of a drawing surface and the normalized-to-pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a normalized position into pixels. Nothing is clamped.
    pub fn to_pixels(&self, x: f64, y: f64) -> Point {
        Point::new(x * self.width, y * self.height)
    }

    /// Convert a normalized extent into pixels.
    pub fn scale_size(&self, w: f64, h: f64) -> (f64, f64) {
        (w * self.width, h * self.height)
    }

    /// The whole surface in pixels.
    pub fn bounds(&self) -> BBox {
        BBox::from_origin_size(0.0, 0.0, self.width, self.height)
    }
}
