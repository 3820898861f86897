//! Render target element as seen by the renderer.

/// CSS class set on the canvas (and document) when shading falls back.
pub const FALLBACK_CLASS: &str = "fallback";

pub trait Canvas {
    /// On-screen size in CSS pixels.
    fn client_size(&self) -> (f64, f64);

    fn device_pixel_ratio(&self) -> f64;

    /// Resizes the drawing buffer, in device pixels.
    fn set_buffer_size(&self, width: u32, height: u32);

    /// Adds [`FALLBACK_CLASS`] so page styling can replace the animation.
    fn mark_fallback(&self);
}

/// Device-pixel size of a CSS size: `floor(css * ratio)`, at least 1.
pub fn device_size(css: (f64, f64), ratio: f64) -> (u32, u32) {
    let scale = |v: f64| ((v * ratio).floor().max(1.0)) as u32;
    (scale(css.0), scale(css.1))
}
