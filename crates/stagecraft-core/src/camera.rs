//! # Camera Module
//!
//! A 2D view onto the world.
//!
//! ## Key Types
//! - `Camera`: Center position, zoom and viewport size. Converts between
//!   screen and world coordinates and answers visibility queries.
//!
//! The camera holds no drawing state of its own; `apply` hands its bounds to
//! the draw context as an orthographic projection with y pointing down.

use crate::render::DrawContext;
use crate::settings::GameSettings;
use glam::Vec2;
use tracing::debug;

/// Multiplier used by `zoom_in`/`zoom_out` when callers have no preference.
pub const DEFAULT_ZOOM_STEP: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec2,
    /// 1.0 is unscaled; 2.0 shows half as much of the world.
    zoom: f32,
    viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

impl Camera {
    /// A camera centered on the world origin.
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: Vec2::new(viewport_width.max(1) as f32, viewport_height.max(1) as f32),
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Maps world units one-to-one onto viewport pixels, with the world
    /// origin at the top-left corner.
    pub fn pixel_perfect(width: u32, height: u32) -> Self {
        let camera = Self::new(width, height);
        camera.with_position(camera.viewport / 2.0)
    }

    /// Centers the camera on the middle of a world region.
    pub fn bounded(width: u32, height: u32, min: Vec2, max: Vec2) -> Self {
        Self::new(width, height).with_position((min + max) / 2.0)
    }

    /// A pixel-perfect camera over the configured viewport.
    pub fn from_settings(settings: &GameSettings) -> Self {
        let (w, h) = viewport_of(settings);
        Self::pixel_perfect(w, h)
    }

    /// Takes the viewport size from settings, keeping position and zoom.
    pub fn update_from_settings(&mut self, settings: &GameSettings) {
        let (w, h) = viewport_of(settings);
        self.set_viewport_size(w, h);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn center_on(&mut self, target: Vec2) {
        self.position = target;
    }

    /// Moves a `smoothness` fraction of the way to `target`. Values outside
    /// `(0, 1)` snap straight to it.
    pub fn follow(&mut self, target: Vec2, smoothness: f32) {
        if smoothness > 0.0 && smoothness < 1.0 {
            self.position = self.position.lerp(target, smoothness);
        } else {
            self.position = target;
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom must be positive and finite; anything else resets it to 1.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            debug!(zoom, "invalid zoom; resetting to 1");
            1.0
        };
    }

    pub fn zoom_in(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn zoom_out(&mut self, factor: f32) {
        self.set_zoom(self.zoom / factor);
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Half the visible world extent on each axis.
    fn half_extent(&self) -> Vec2 {
        self.viewport / self.zoom / 2.0
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.half_extent().x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.half_extent().x
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.half_extent().y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.half_extent().y
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + Vec2::new(self.left(), self.top())
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - Vec2::new(self.left(), self.top())) * self.zoom
    }

    /// Edges count as visible.
    pub fn is_point_visible(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// True if the rectangle overlaps the view at all.
    pub fn is_rect_visible(&self, top_left: Vec2, bottom_right: Vec2) -> bool {
        !(bottom_right.x < self.left()
            || top_left.x > self.right()
            || bottom_right.y < self.top()
            || top_left.y > self.bottom())
    }

    /// Projects the visible world region onto the viewport.
    pub fn apply(&self, ctx: &mut dyn DrawContext) {
        ctx.set_projection(self.left(), self.right(), self.bottom(), self.top());
    }

    /// Restores a screen-space projection: one unit per viewport pixel,
    /// origin top-left.
    pub fn reset(&self, ctx: &mut dyn DrawContext) {
        ctx.set_projection(0.0, self.viewport.x, self.viewport.y, 0.0);
    }
}

fn viewport_of(settings: &GameSettings) -> (u32, u32) {
    let g = &settings.graphics;
    (
        u32::try_from(g.viewport_width).unwrap_or(1),
        u32::try_from(g.viewport_height).unwrap_or(1),
    )
}
