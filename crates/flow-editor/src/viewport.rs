//! Camera: the pan/zoom transform between screen and world space.
//!
//! `screen = translate(pan) ∘ scale(s) · world`, with `s` clamped to the
//! configured zoom range.

use flow_core::config::EditorConfig;
use kurbo::{Affine, Point, Size, Vec2};

/// Zoom step of the zoom-in button and shortcut.
pub const ZOOM_IN_STEP: f64 = 1.1;
pub const ZOOM_OUT_STEP: f64 = 0.9;
/// Zoom step per Ctrl/⌘ + wheel notch.
pub const WHEEL_ZOOM_IN: f64 = 1.08;
pub const WHEEL_ZOOM_OUT: f64 = 0.92;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan: Vec2,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// World → screen transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale)
    }

    #[must_use]
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.scale, (p.y - self.pan.y) / self.scale)
    }

    #[must_use]
    pub fn world_to_screen(&self, p: Point) -> Point {
        self.transform() * p
    }

    /// Convert a screen-pixel tolerance to world units.
    pub fn world_tolerance(&self, screen_px: f64) -> f64 {
        screen_px / self.scale
    }

    /// Zoom by `factor`, keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64, config: &EditorConfig) {
        let world = self.screen_to_world(screen);
        self.scale = config.clamp_zoom(self.scale * factor);
        self.pan = screen.to_vec2() - world.to_vec2() * self.scale;
    }

    /// Zoom about the centre of a viewport of `size`.
    pub fn zoom_from_center(&mut self, factor: f64, size: Size, config: &EditorConfig) {
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        self.zoom_at(center, factor, config);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// World point at the centre of a viewport of `size`.
    pub fn world_center(&self, size: Size) -> Point {
        self.screen_to_world(Point::new(size.width / 2.0, size.height / 2.0))
    }
}
