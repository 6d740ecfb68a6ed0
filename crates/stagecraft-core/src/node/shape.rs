//! # Shape Module
//!
//! Flat-colored `Triangle` and `Rectangle` elements.

use crate::element::Element;
use crate::errors::RenderError;
use crate::node::apply_transform;
use crate::render::{DrawContext, Rect};
use crate::types::{Color, Transform2D};

// --- Triangle ---
/// An isosceles triangle centered on its position, apex up.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub transform: Transform2D,
    pub color: Color,
    pub width: f32,
    pub height: f32,
}

impl Triangle {
    pub fn new(transform: Transform2D, color: Color) -> Self {
        Self {
            transform,
            color,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Element for Triangle {
    fn render(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        apply_transform(ctx, &self.transform);
        ctx.set_color(self.color);
        ctx.draw_triangle(-hw, -hh, hw, -hh, 0.0, hh);
        ctx.reset_transform();
        Ok(())
    }

    fn transform(&self) -> Option<&Transform2D> {
        Some(&self.transform)
    }

    fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        Some(&mut self.transform)
    }

    fn color(&self) -> Option<Color> {
        Some(self.color)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

// --- Rectangle ---
/// An axis-aligned rectangle anchored at its position (bottom-left corner).
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub transform: Transform2D,
    pub color: Color,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(transform: Transform2D, color: Color) -> Self {
        Self {
            transform,
            color,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Element for Rectangle {
    fn render(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        apply_transform(ctx, &self.transform);
        ctx.set_color(self.color);
        ctx.draw_rectangle(Rect::new(0.0, 0.0, self.width, self.height));
        ctx.reset_transform();
        Ok(())
    }

    fn transform(&self) -> Option<&Transform2D> {
        Some(&self.transform)
    }

    fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        Some(&mut self.transform)
    }

    fn color(&self) -> Option<Color> {
        Some(self.color)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
