//! # Render Module
//!
//! The abstract drawing interface the scene graph renders through, and a
//! recording implementation of it.
//!
//! The concrete GPU driver lives outside this crate. Elements only ever see a
//! `&mut dyn DrawContext` handed down by `Scene::render`, so no drawing state
//! is global.

use crate::errors::RenderError;
use crate::types::Color;
use std::collections::BTreeMap;

/// Handle to a texture owned by a draw context.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Destination rectangle in local (transformed) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Normalized texture coordinates of a sprite-sheet cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TexRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl TexRect {
    pub const FULL: TexRect = TexRect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };
}

/// Immediate-mode 2D drawing interface.
pub trait DrawContext {
    fn clear(&mut self, color: Color);

    /// Sets an orthographic projection mapping the given world region onto
    /// the viewport.
    fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32);

    /// Sets the model transform. Rotation is in degrees.
    fn set_transform(&mut self, x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32);
    fn reset_transform(&mut self);
    fn set_color(&mut self, color: Color);

    fn draw_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32);
    fn draw_rectangle(&mut self, rect: Rect);
    fn draw_sprite(&mut self, texture: TextureId, dest: Rect, uv: TexRect);

    fn create_texture(&mut self) -> Result<TextureId, RenderError>;
    /// Uploads tightly packed RGBA8 pixels.
    fn upload_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
        linear_filtering: bool,
    ) -> Result<(), RenderError>;
    fn delete_texture(&mut self, texture: TextureId);
}

/// A draw call captured by [`RecordingContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Projection {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
    SetTransform {
        x: f32,
        y: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
    },
    ResetTransform,
    SetColor(Color),
    Triangle([f32; 6]),
    Rectangle(Rect),
    Sprite {
        texture: TextureId,
        dest: Rect,
        uv: TexRect,
    },
    UploadTexture {
        texture: TextureId,
        width: u32,
        height: u32,
    },
    DeleteTexture(TextureId),
}

/// A `DrawContext` that records every call instead of rasterizing.
///
/// Used by the headless CLI and by tests to assert traversal order.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    textures: BTreeMap<TextureId, (u32, u32)>,
    next_texture: u32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the recorded commands and starts a fresh recording.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Live textures and their dimensions.
    pub fn textures(&self) -> &BTreeMap<TextureId, (u32, u32)> {
        &self.textures
    }

    /// Number of primitives (triangles, rectangles, sprites) recorded.
    pub fn primitive_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Triangle(_) | DrawCommand::Rectangle(_) | DrawCommand::Sprite { .. }
                )
            })
            .count()
    }
}

impl DrawContext for RecordingContext {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.commands.push(DrawCommand::Projection {
            left,
            right,
            bottom,
            top,
        });
    }

    fn set_transform(&mut self, x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) {
        self.commands.push(DrawCommand::SetTransform {
            x,
            y,
            rotation,
            scale_x,
            scale_y,
        });
    }

    fn reset_transform(&mut self) {
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn draw_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.commands
            .push(DrawCommand::Triangle([x1, y1, x2, y2, x3, y3]));
    }

    fn draw_rectangle(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rectangle(rect));
    }

    fn draw_sprite(&mut self, texture: TextureId, dest: Rect, uv: TexRect) {
        self.commands.push(DrawCommand::Sprite { texture, dest, uv });
    }

    fn create_texture(&mut self) -> Result<TextureId, RenderError> {
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.textures.insert(id, (0, 0));
        Ok(id)
    }

    fn upload_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
        _linear_filtering: bool,
    ) -> Result<(), RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::TextureUpload(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        match self.textures.get_mut(&texture) {
            Some(size) => *size = (width, height),
            None => {
                return Err(RenderError::TextureUpload(format!(
                    "unknown texture {texture:?}"
                )))
            }
        }
        self.commands.push(DrawCommand::UploadTexture {
            texture,
            width,
            height,
        });
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            self.commands.push(DrawCommand::DeleteTexture(texture));
        }
    }
}
