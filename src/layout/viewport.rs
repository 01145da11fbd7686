//! Pan/zoom state for viewing a laid-out map.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::layout::tidy::Bounds;

/// Wheel and toolbar zoom factors.
pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportOptions {
    pub min_scale: f64,
    /// Multiplier per wheel notch
    pub zoom_step: f64,
    /// Share of the viewport a fitted map occupies
    pub fit_ratio: f64,
    /// Screen y of the root after a fit
    pub top_margin: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            zoom_step: 1.1,
            fit_ratio: 0.9,
            top_margin: 50.0,
        }
    }
}

/// Translation and uniform scale mapping world (layout) space to the screen.
///
/// `screen = translate + world * scale`
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    translate: Vec2,
    scale: f64,
    size: Size,
    options: ViewportOptions,
    pan_anchor: Option<Point>,
}

impl Viewport {
    pub fn new(size: Size, options: ViewportOptions) -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
            size,
            options,
            pan_anchor: None,
        }
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    pub fn transform(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform().inverse() * screen
    }

    /// Rescale by `factor` keeping the world point under `point` in place.
    pub fn zoom_at(&mut self, point: Point, factor: f64) {
        let new_scale = (self.scale * factor).max(self.options.min_scale);
        let ratio = new_scale / self.scale;
        let anchor = point.to_vec2();
        self.translate = anchor - (anchor - self.translate) * ratio;
        self.scale = new_scale;
        trace!(scale = self.scale, "zoom at point");
    }

    /// Scroll wheel: positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f64, point: Point) {
        let factor = if delta_y > 0.0 {
            1.0 / self.options.zoom_step
        } else {
            self.options.zoom_step
        };
        self.zoom_at(point, factor);
    }

    /// Rescale about the transform origin, leaving translation untouched.
    pub fn zoom_by(&mut self, factor: f64) {
        self.scale = (self.scale * factor).max(self.options.min_scale);
    }

    pub fn begin_pan(&mut self, point: Point) {
        self.pan_anchor = Some(point);
    }

    /// Move by the distance dragged since the last event; ignored when not panning.
    pub fn drag_to(&mut self, point: Point) {
        if let Some(anchor) = self.pan_anchor {
            self.translate += point - anchor;
            self.pan_anchor = Some(point);
        }
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Fit `bounds` into the viewport and center it horizontally.
    ///
    /// Layout x is a node's center, so half a slot is added to keep the
    /// leftmost box in view. A map no wider than one slot is shown at scale 1.
    pub fn reset_to_fit(&mut self, bounds: Bounds, horizontal_spacing: f64) {
        let scale = if bounds.width <= horizontal_spacing || bounds.height <= 0.0 {
            1.0
        } else {
            let fit = (self.size.width / bounds.width).min(self.size.height / bounds.height);
            (fit * self.options.fit_ratio).max(self.options.min_scale)
        };

        let x = (self.size.width - bounds.width * scale) / 2.0 + horizontal_spacing * scale / 2.0;
        self.translate = Vec2::new(x, self.options.top_margin);
        self.scale = scale;
        self.pan_anchor = None;
        trace!(scale, x, "viewport reset to fit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn viewport() -> Viewport {
        Viewport::new(Size::new(960.0, 500.0), ViewportOptions::default())
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a - b).hypot() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn given_point_when_zooming_then_world_point_stays_under_cursor() {
        let mut vp = viewport();
        vp.zoom_at(Point::new(10.0, 10.0), 1.7);
        let cursor = Point::new(300.0, 200.0);
        let before = vp.screen_to_world(cursor);

        vp.wheel(-1.0, cursor);
        assert!((vp.scale() - 1.7 * 1.1).abs() < EPS);
        assert_close(vp.world_to_screen(before), cursor);

        vp.wheel(1.0, cursor);
        assert_close(vp.world_to_screen(before), cursor);
    }

    #[test]
    fn given_min_scale_when_zooming_out_then_clamped_and_point_still_fixed() {
        let mut vp = viewport();
        let cursor = Point::new(480.0, 250.0);
        let before = vp.screen_to_world(cursor);

        vp.zoom_at(cursor, 0.01);

        assert_eq!(vp.scale(), 0.1);
        assert_close(vp.world_to_screen(before), cursor);
    }

    #[test]
    fn given_toolbar_zoom_when_applied_then_translation_unchanged() {
        let mut vp = viewport();
        vp.begin_pan(Point::new(0.0, 0.0));
        vp.drag_to(Point::new(30.0, 40.0));
        vp.end_pan();

        vp.zoom_by(ZOOM_IN_FACTOR);
        vp.zoom_by(ZOOM_OUT_FACTOR);

        assert_eq!(vp.translate(), Vec2::new(30.0, 40.0));
        assert!((vp.scale() - 0.96).abs() < EPS);
    }

    #[test]
    fn given_drag_when_panning_then_translation_follows_pointer() {
        let mut vp = viewport();
        vp.drag_to(Point::new(50.0, 50.0));
        assert_eq!(vp.translate(), Vec2::ZERO, "no pan without begin_pan");

        vp.begin_pan(Point::new(100.0, 100.0));
        vp.drag_to(Point::new(110.0, 95.0));
        vp.drag_to(Point::new(130.0, 90.0));
        assert!(vp.is_panning());
        vp.end_pan();
        vp.drag_to(Point::new(500.0, 500.0));

        assert_eq!(vp.translate(), Vec2::new(30.0, -10.0));
    }

    #[test]
    fn given_wide_map_when_fitting_then_scaled_to_ninety_percent() {
        let mut vp = viewport();
        let bounds = Bounds { width: 1920.0, height: 480.0 };

        vp.reset_to_fit(bounds, 170.0);

        // min(960/1920, 500/480) * 0.9
        assert!((vp.scale() - 0.45).abs() < EPS);
        let expected_x = (960.0 - 1920.0 * 0.45) / 2.0 + 170.0 * 0.45 / 2.0;
        assert!((vp.translate().x - expected_x).abs() < EPS);
        assert_eq!(vp.translate().y, 50.0);
    }

    #[test]
    fn given_single_slot_map_when_fitting_then_centered_at_unit_scale() {
        let mut vp = viewport();
        vp.reset_to_fit(Bounds { width: 170.0, height: 120.0 }, 170.0);

        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.world_to_screen(Point::ZERO), Point::new(480.0, 50.0));
    }
}
