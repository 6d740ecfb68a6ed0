//! # Node Module
//!
//! Concrete elements: the scene root, shapes and sprites.

use crate::element::Element;
use crate::errors::RenderError;
use crate::render::DrawContext;
use crate::types::Transform2D;

pub mod shape;
pub use shape::{Rectangle, Triangle};

pub mod sprite;
pub use sprite::Sprite2D;

/// The element behind a scene's root node. Draws nothing.
#[derive(Debug, Default, Clone)]
pub struct RootElement;

impl Element for RootElement {
    fn render(&self, _ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        Ok(())
    }
}

// Helper to push a node transform into the draw context
pub(crate) fn apply_transform(ctx: &mut dyn DrawContext, t: &Transform2D) {
    ctx.set_transform(t.position.x, t.position.y, t.rotation, t.scale.x, t.scale.y);
}
