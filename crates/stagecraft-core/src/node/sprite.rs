//! # Sprite Module
//!
//! `Sprite2D`, a textured quad showing one cell of a sprite sheet.

use crate::animation::AnimationTrack;
use crate::element::Element;
use crate::errors::{AnimationError, RenderError};
use crate::node::apply_transform;
use crate::render::{DrawContext, Rect, TexRect, TextureId};
use crate::systems::assets::TextureData;
use crate::types::{Color, Transform2D};
use tracing::{debug, trace};

/// A texture uploaded to the draw context.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UploadedTexture {
    id: TextureId,
    width: u32,
    height: u32,
}

// --- Sprite2D ---
/// A textured quad showing one cell of a sprite sheet.
///
/// The sheet is split into `hframes` columns and `vframes` rows; `frame`
/// counts cells left to right, top to bottom. While a clip is active the
/// sprite's animation track drives `frame`.
///
/// Textures are decoded at load time and handed to the draw context by
/// `upload_resources`. Until then the sprite draws a green placeholder.
#[derive(Debug)]
pub struct Sprite2D {
    pub transform: Transform2D,
    image_path: String,
    hframes: u32,
    vframes: u32,
    frame: u32,
    tint: Option<Color>,
    linear_filtering: bool,
    animator: AnimationTrack,
    pending: Option<TextureData>,
    texture: Option<UploadedTexture>,
}

impl Sprite2D {
    pub fn new(transform: Transform2D) -> Self {
        Self {
            transform,
            image_path: String::new(),
            hframes: 1,
            vframes: 1,
            frame: 0,
            tint: None,
            linear_filtering: false,
            animator: AnimationTrack::new(),
            pending: None,
            texture: None,
        }
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn set_image_path(&mut self, path: impl Into<String>) {
        self.image_path = path.into();
    }

    /// Queues decoded pixels for the next `upload_resources`.
    pub fn set_texture_data(&mut self, data: TextureData) {
        self.pending = Some(data);
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn has_pending_texture(&self) -> bool {
        self.pending.is_some()
    }

    pub fn texture_id(&self) -> Option<TextureId> {
        self.texture.map(|t| t.id)
    }

    pub fn hframes(&self) -> u32 {
        self.hframes
    }

    pub fn vframes(&self) -> u32 {
        self.vframes
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Cell count, saturating at `u32::MAX` for oversized sheets.
    pub fn total_frames(&self) -> u32 {
        self.hframes.saturating_mul(self.vframes)
    }

    /// Column count, at least 1.
    pub fn set_hframes(&mut self, hframes: u32) {
        self.hframes = hframes.max(1);
        self.frame %= self.total_frames();
    }

    /// Row count, at least 1.
    pub fn set_vframes(&mut self, vframes: u32) {
        self.vframes = vframes.max(1);
        self.frame %= self.total_frames();
    }

    /// Selects a cell; indices past the end wrap around.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame % self.total_frames();
    }

    pub fn tint(&self) -> Option<Color> {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Option<Color>) {
        self.tint = tint;
    }

    pub fn set_linear_filtering(&mut self, linear: bool) {
        self.linear_filtering = linear;
    }

    pub fn animator(&self) -> &AnimationTrack {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut AnimationTrack {
        &mut self.animator
    }

    pub fn play_animation(&mut self, name: &str) -> Result<(), AnimationError> {
        self.animator.play(name)
    }

    pub fn stop_animation(&mut self) {
        self.animator.stop();
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.animator.active_clip_name()
    }

    /// Texture coordinates of the current cell. The v axis is flipped so
    /// row 0 sits at the top of the image.
    pub fn frame_uv(&self) -> TexRect {
        let cell_w = 1.0 / self.hframes as f32;
        let cell_h = 1.0 / self.vframes as f32;
        let x = self.frame % self.hframes;
        let y = (self.frame / self.hframes) % self.vframes;

        let left = x as f32 * cell_w;
        let top = 1.0 - y as f32 * cell_h;
        TexRect {
            left,
            top,
            right: left + cell_w,
            bottom: top - cell_h,
        }
    }

    /// Size of one cell in texels, once a texture is uploaded.
    pub fn frame_size(&self) -> Option<(f32, f32)> {
        self.texture.map(|t| {
            (
                t.width as f32 / self.hframes as f32,
                t.height as f32 / self.vframes as f32,
            )
        })
    }
}

impl Element for Sprite2D {
    fn update(&mut self, dt: f32) {
        if self.animator.active_clip_name().is_none() {
            return;
        }
        self.animator.update(dt);
        let next = self.animator.current_frame_index();
        if next != self.frame {
            trace!(from = self.frame, to = next, "sprite frame changed");
            self.set_frame(next);
        }
    }

    fn render(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        apply_transform(ctx, &self.transform);
        match (self.texture, self.frame_size()) {
            (Some(texture), Some((w, h))) => {
                ctx.set_color(self.tint.unwrap_or(Color::WHITE));
                let dest = Rect::new(-w / 2.0, -h / 2.0, w, h);
                ctx.draw_sprite(texture.id, dest, self.frame_uv());
            }
            _ => {
                ctx.set_color(Color::GREEN);
                ctx.draw_rectangle(Rect::new(-0.5, -0.5, 1.0, 1.0));
            }
        }
        ctx.reset_transform();
        Ok(())
    }

    fn upload_resources(&mut self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        let Some(data) = &self.pending else {
            return Ok(());
        };
        let id = ctx.create_texture()?;
        if let Err(e) = ctx.upload_texture(
            id,
            data.width,
            data.height,
            &data.pixels,
            self.linear_filtering,
        ) {
            ctx.delete_texture(id);
            return Err(e);
        }
        if let Some(old) = self.texture.take() {
            ctx.delete_texture(old.id);
        }
        debug!(path = %self.image_path, texture = id.0, "sprite texture uploaded");
        self.texture = Some(UploadedTexture {
            id,
            width: data.width,
            height: data.height,
        });
        self.pending = None;
        Ok(())
    }

    fn transform(&self) -> Option<&Transform2D> {
        Some(&self.transform)
    }

    fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        Some(&mut self.transform)
    }

    fn color(&self) -> Option<Color> {
        self.tint
    }

    fn set_color(&mut self, color: Color) {
        self.tint = Some(color);
    }

    fn animator(&self) -> Option<&AnimationTrack> {
        Some(&self.animator)
    }

    fn animator_mut(&mut self) -> Option<&mut AnimationTrack> {
        Some(&mut self.animator)
    }

    fn as_sprite(&self) -> Option<&Sprite2D> {
        Some(self)
    }

    fn as_sprite_mut(&mut self) -> Option<&mut Sprite2D> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uv_flips_rows() {
        let mut sprite = Sprite2D::new(Transform2D::default());
        sprite.set_hframes(4);
        sprite.set_vframes(2);
        sprite.set_frame(5);
        let uv = sprite.frame_uv();
        assert_eq!(uv.left, 0.25);
        assert_eq!(uv.right, 0.5);
        assert_eq!(uv.top, 0.5);
        assert_eq!(uv.bottom, 0.0);
    }

    #[test]
    fn test_oversized_sheet_saturates() {
        let mut sprite = Sprite2D::new(Transform2D::default());
        sprite.set_hframes(70_000);
        sprite.set_vframes(70_000);
        assert_eq!(sprite.total_frames(), u32::MAX);
        sprite.set_frame(60_000 * 70_000);
        assert_eq!(sprite.frame(), 60_000 * 70_000);
        let uv = sprite.frame_uv();
        assert!(uv.left < uv.right);
    }

    #[test]
    fn test_frame_setters_clamp_and_wrap() {
        let mut sprite = Sprite2D::new(Transform2D::default());
        sprite.set_hframes(0);
        assert_eq!(sprite.hframes(), 1);
        sprite.set_hframes(3);
        sprite.set_frame(7);
        assert_eq!(sprite.frame(), 1);
    }
}
