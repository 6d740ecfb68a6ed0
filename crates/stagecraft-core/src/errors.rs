//! # Errors Module
//!
//! Error types for scene files, values, animation, rendering and settings.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading, building or writing scene files.
///
/// `SceneDescriptionLoader::load` never returns these; it reports them and
/// skips or defaults the affected file, node or field.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scene document is empty")]
    EmptyDocument,
    #[error("unknown node type '{0}'")]
    UnknownType(String),
    #[error("node entry has no 'type'")]
    MissingType,
}

/// A scalar could not be coerced to the requested type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot read '{raw}' as {expected}")]
pub struct ParseValueError {
    pub raw: String,
    pub expected: &'static str,
}

impl ParseValueError {
    pub fn new(raw: &str, expected: &'static str) -> Self {
        Self {
            raw: raw.to_string(),
            expected,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("animation clip '{0}' not found")]
    ClipNotFound(String),
    #[error("clip '{clip}' has invalid frame rate {rate}")]
    InvalidFrameRate { clip: String, rate: f32 },
    #[error("clip '{0}' has no displayable frames")]
    EmptyClip(String),
    #[error("clip '{0}' has more frames than a track can index")]
    TooManyFrames(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("texture upload failed: {0}")]
    TextureUpload(String),
    #[error("Recursion depth limit exceeded")]
    RecursionLimit,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {}", .0.join(", "))]
    Invalid(Vec<String>),
}
