//! Preview/original coordinate mapping.
//!
//! One scale factor is computed per selection session and every collected
//! click is divided by it on arrival, so polygons are always stored in
//! full-resolution pixel coordinates.

/// A point in original (full-resolution) image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ratio of the preview display size to the full-resolution render size.
///
/// Always in `(0, 1]`: pages are shrunk to fit the viewport, never
/// enlarged. The invariant the whole tool rests on is
/// `original = display / factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Compute the factor that fits a `img_w` x `img_h` render inside the
    /// viewport, preserving aspect ratio.
    ///
    /// Returns 1.0 when the render already fits both dimensions.
    pub fn fit(img_w: u32, img_h: u32, viewport_w: u32, viewport_h: u32) -> Self {
        let ratio_w = viewport_w as f64 / img_w as f64;
        let ratio_h = viewport_h as f64 / img_h as f64;
        let ratio = ratio_w.min(ratio_h);
        ScaleFactor(ratio.min(1.0))
    }

    /// Map a display-coordinate click back to original image coordinates.
    pub fn to_original(&self, display_x: f64, display_y: f64) -> Point {
        Point::new(display_x / self.0, display_y / self.0)
    }

    /// Preview dimensions for a `w` x `h` render, rounded per axis.
    pub fn scaled_dimensions(&self, w: u32, h: u32) -> (u32, u32) {
        let new_w = (w as f64 * self.0).round() as u32;
        let new_h = (h as f64 * self.0).round() as u32;
        (new_w.max(1), new_h.max(1))
    }

    /// True when the render fits the viewport unscaled; the preview is
    /// then written without resampling.
    pub fn is_identity(&self) -> bool {
        self.0 == 1.0
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
