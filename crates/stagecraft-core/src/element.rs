//! # Element Module
//!
//! The `Element` trait implemented by every visual payload.

use crate::animation::AnimationTrack;
use crate::errors::RenderError;
use crate::input::InputState;
use crate::node::Sprite2D;
use crate::render::DrawContext;
use crate::types::{Color, Transform2D};

/// The visual payload of a scene-graph node.
///
/// Concrete shapes and sprites implement this trait. Optional capabilities
/// (a 2D transform, a tint, an animation track, sprite-sheet data) are
/// exposed as facets that return `None` unless the element has them, so
/// callers never downcast.
pub trait Element: std::fmt::Debug {
    /// Advances element-local state (e.g. sprite animation).
    fn update(&mut self, _dt: f32) {}

    /// Draws the element. Only the element itself; children are drawn by
    /// the scene graph.
    fn render(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError>;

    fn handle_input(&mut self, _input: &InputState) {}

    /// Moves decoded resources (textures) into the draw context.
    fn upload_resources(&mut self, _ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        Ok(())
    }

    fn transform(&self) -> Option<&Transform2D> {
        None
    }

    fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        None
    }

    fn color(&self) -> Option<Color> {
        None
    }

    fn set_color(&mut self, _color: Color) {}

    /// The animation facet. Elements that return `Some` accept clips from
    /// scene files.
    fn animator(&self) -> Option<&AnimationTrack> {
        None
    }

    fn animator_mut(&mut self) -> Option<&mut AnimationTrack> {
        None
    }

    /// Sprite-sheet facet.
    fn as_sprite(&self) -> Option<&Sprite2D> {
        None
    }

    fn as_sprite_mut(&mut self) -> Option<&mut Sprite2D> {
        None
    }
}
