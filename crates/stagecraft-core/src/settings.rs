//! # Settings Module
//!
//! Runtime configuration loaded from JSON.
//!
//! Every section and field is optional in the file; missing values take the
//! defaults below. `validate` reports every out-of-range field at once.

use crate::errors::SettingsError;
use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "stagecraft".to_string(),
            resizable: true,
            vsync: true,
            fullscreen: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub clear_color: Color,
    pub texture_filtering: TextureFilter,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            viewport_width: 320,
            viewport_height: 180,
            clear_color: Color::rgb(0.1, 0.1, 0.1),
            texture_filtering: TextureFilter::Nearest,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub target_fps: i32,
    pub debug_mode: bool,
    pub show_fps: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            target_fps: 60,
            debug_mode: false,
            show_fps: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub window: WindowSettings,
    pub graphics: GraphicsSettings,
    pub game: GameplaySettings,
}

impl GameSettings {
    /// Reads settings from a JSON file and validates them.
    #[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&text)?;
        info!(
            window = %format!("{}x{}", settings.window.width, settings.window.height),
            fps = settings.game.target_fps,
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks ranges, listing every invalid field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut problems = Vec::new();
        if self.window.width <= 0 || self.window.height <= 0 {
            problems.push("window dimensions must be positive".to_string());
        }
        if self.graphics.viewport_width <= 0 || self.graphics.viewport_height <= 0 {
            problems.push("viewport dimensions must be positive".to_string());
        }
        let c = self.graphics.clear_color;
        if [c.r, c.g, c.b, c.a].iter().any(|v| !(0.0..=1.0).contains(v)) {
            problems.push("clear color channels must be within 0..1".to_string());
        }
        if self.game.target_fps <= 0 {
            problems.push("target fps must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Invalid(problems))
        }
    }

    /// Seconds per frame at the target rate.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.game.target_fps.max(1) as f32
    }

    pub fn linear_filtering(&self) -> bool {
        self.graphics.texture_filtering == TextureFilter::Linear
    }
}
