//! # Assets Module
//!
//! Texture decoding through an [`AssetLoader`](crate::AssetLoader).

use crate::AssetLoader;
use anyhow::Context;
use tracing::{debug, instrument};

/// Decoded RGBA8 pixels waiting to be uploaded to a draw context.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// A solid-color texture, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Loads an image through the asset loader and decodes it to RGBA8.
#[instrument(level = "debug", skip(loader))]
pub fn decode_texture(loader: &dyn AssetLoader, path: &str) -> anyhow::Result<TextureData> {
    let bytes = loader.load_bytes(path)?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode image '{path}'"))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    debug!(width, height, "texture decoded");
    Ok(TextureData {
        width,
        height,
        pixels: image.into_raw(),
    })
}
