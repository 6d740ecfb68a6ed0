//! # Stagecraft Core
//!
//! `stagecraft-core` is a declarative scene-description runtime for 2D
//! rendering: scene files describe nodes, sprite sheets and animation clips;
//! the runtime builds a scene graph from them and drives it frame by frame.
//!
//! ## Core Features
//!
//! *   **Scene Files**: An indentation-based format with mappings, `- ` sequences
//!     and inline `[a, b]` arrays, parsed into a generic [`TreeNode`].
//! *   **Type Registry**: Scene `type` names map to node constructors, some of
//!     which attach per-frame behaviors (rotation, oscillation, pulsing).
//! *   **Sprite Animation**: Named clips over one or more sprite-sheet frame
//!     runs with play/pause/resume/stop.
//! *   **Scene Graph**: Owned node hierarchy with pre-order update, render and
//!     input traversal.
//! *   **Abstract Rendering**: Nodes draw through a [`DrawContext`]; the GPU
//!     driver lives outside this crate.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagecraft_core::{RecordingContext, SceneDescriptionLoader};
//!
//! let loader = SceneDescriptionLoader::default();
//! let mut scene = loader.load("scenes/demo.yaml");
//!
//! let mut ctx = RecordingContext::new();
//! scene.upload_resources(&mut ctx).ok();
//! scene.update(1.0 / 60.0);
//! scene.render(&mut ctx).ok();
//! ```

/// Parsed document tree, value coercion and serialization.
pub mod document;

/// The indentation-based scene-file parser.
pub mod parser;

/// Sprite-sheet animation clips and playback.
pub mod animation;

/// Defines the base `Element` trait that all visual nodes implement.
pub mod element;

/// Per-frame behaviors composed onto nodes.
pub mod behavior;

/// Concrete elements (shapes, sprites, root).
pub mod node;

/// The scene graph.
pub mod scene;

/// Type-name to constructor registry.
pub mod registry;

/// Abstract drawing interface.
pub mod render;

/// Injected keyboard state.
pub mod input;

/// 2D view: screen/world conversion and culling.
pub mod camera;

/// JSON runtime settings.
pub mod settings;

/// Shared data structures.
pub mod types;

pub mod errors;
/// Scene loading, saving and asset decoding.
pub mod systems;

pub use animation::{AnimationClip, AnimationFrame, AnimationTrack, PlaybackState};
pub use camera::Camera;
pub use document::TreeNode;
pub use element::Element;
pub use errors::{AnimationError, ParseValueError, RenderError, SceneError, SettingsError};
pub use input::InputState;
pub use registry::{NodeParams, NodeTypeRegistry, Resolved};
pub use render::{DrawCommand, DrawContext, RecordingContext};
pub use scene::{Node, Scene};
pub use settings::GameSettings;
pub use systems::{SceneDescriptionLoader, SceneWriter};
pub use types::{Color, NodeId, Transform2D};

use anyhow::Result;
use std::path::PathBuf;
use tracing::instrument;

/// Environment variable naming an extra directory to search for assets.
pub const ASSET_ROOT_ENV: &str = "STAGECRAFT_ASSET_ROOT";

/// A trait for abstracting file system access.
///
/// This allows the runtime to be embedded where direct file system access
/// is restricted or virtualized (e.g. assets packed into an archive).
pub trait AssetLoader: Send + Sync {
    /// Loads the raw bytes of an asset.
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

/// Loads assets from the local filesystem.
///
/// A path is tried as given, then under `$STAGECRAFT_ASSET_ROOT`, then
/// under `assets/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAssetLoader;

impl DefaultAssetLoader {
    fn candidates(path: &str) -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(path)];
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV) {
            candidates.push(PathBuf::from(root).join(path));
        }
        candidates.push(PathBuf::from("assets").join(path));
        candidates
    }
}

impl AssetLoader for DefaultAssetLoader {
    #[instrument(level = "debug", skip(self), fields(path = path))]
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let candidates = Self::candidates(path);
        for candidate in &candidates {
            if let Ok(bytes) = std::fs::read(candidate) {
                return Ok(bytes);
            }
        }
        let tried: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
        Err(anyhow::anyhow!(
            "Asset not found: {} (checked {})",
            path,
            tried.join(", ")
        ))
    }
}
