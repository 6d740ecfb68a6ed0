//! # Scene Loader
//!
//! Turns a scene document into a populated [`Scene`].
//!
//! ## Responsibilities
//! - **Walk**: read `scene.name`, then build every entry of `nodes` (and,
//!   recursively, each entry's `children`) in document order.
//! - **Construct**: resolve `type` through the [`NodeTypeRegistry`] and
//!   apply the common fields, sprite-sheet fields and animation clips.
//! - **Fail soft**: an unreadable or empty file yields an empty scene named
//!   `"Error Scene"`; a bad entry is skipped; a bad field keeps its default.
//!   Every recovery is reported as a `warn!` event.

use crate::animation::{AnimationFrame, AnimationTrack, DEFAULT_FRAME_RATE};
use crate::document::{parse_f32, parse_flag, parse_i32, TreeNode};
use crate::errors::{ParseValueError, SceneError};
use crate::parser;
use crate::registry::{NodeParams, NodeTypeRegistry};
use crate::scene::{Node, Scene};
use crate::systems::assets::decode_texture;
use crate::types::Color;
use crate::{AssetLoader, DefaultAssetLoader};
use glam::Vec2;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the scene returned when a file cannot be used at all.
pub const ERROR_SCENE_NAME: &str = "Error Scene";
/// Name used when the document has no `scene.name`.
pub const DEFAULT_SCENE_NAME: &str = "Loaded Scene";

pub struct SceneDescriptionLoader {
    registry: NodeTypeRegistry,
    assets: Arc<dyn AssetLoader>,
    linear_filtering: bool,
}

impl Default for SceneDescriptionLoader {
    fn default() -> Self {
        Self::new(NodeTypeRegistry::with_builtins(), Arc::new(DefaultAssetLoader))
    }
}

impl std::fmt::Debug for SceneDescriptionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDescriptionLoader")
            .field("registry", &self.registry)
            .field("linear_filtering", &self.linear_filtering)
            .finish_non_exhaustive()
    }
}

impl SceneDescriptionLoader {
    pub fn new(registry: NodeTypeRegistry, assets: Arc<dyn AssetLoader>) -> Self {
        Self {
            registry,
            assets,
            linear_filtering: false,
        }
    }

    /// Sets the filtering requested for sprite textures.
    pub fn with_linear_filtering(mut self, linear: bool) -> Self {
        self.linear_filtering = linear;
        self
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeTypeRegistry {
        &mut self.registry
    }

    /// Loads a scene file. Never fails; see the module docs.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> Scene {
        match parser::read_file(path.as_ref()) {
            Ok(doc) => self.build(&doc),
            Err(e) => {
                warn!(error = %e, "scene file unreadable");
                Scene::new(ERROR_SCENE_NAME)
            }
        }
    }

    /// Loads a scene from in-memory text.
    pub fn load_str(&self, text: &str) -> Scene {
        self.build(&parser::parse(text))
    }

    /// Builds a scene from an already parsed document.
    pub fn build(&self, doc: &TreeNode) -> Scene {
        if doc.is_empty() {
            warn!(error = %SceneError::EmptyDocument, "nothing to load");
            return Scene::new(ERROR_SCENE_NAME);
        }

        let name = doc
            .get("scene")
            .and_then(|s| s.scalar_at("name"))
            .unwrap_or(DEFAULT_SCENE_NAME);
        let mut scene = Scene::new(name);

        let entries: &[TreeNode] = match doc.get("nodes") {
            Some(nodes) if nodes.is_sequence() => nodes.items(),
            Some(_) => {
                warn!("'nodes' is not a sequence; scene left empty");
                &[]
            }
            None => &[],
        };
        for (index, entry) in entries.iter().enumerate() {
            match self.build_node(entry) {
                Ok(node) => {
                    scene.add_node(node);
                }
                Err(e) => warn!(index, error = %e, "node skipped"),
            }
        }

        info!(
            scene = scene.name(),
            nodes = scene.node_count(),
            total = scene.total_node_count(),
            "scene loaded"
        );
        scene
    }

    /// Builds one node entry and its `children`.
    fn build_node(&self, entry: &TreeNode) -> Result<Node, SceneError> {
        let type_name = entry
            .scalar_at("type")
            .filter(|t| !t.is_empty())
            .ok_or(SceneError::MissingType)?;

        let params = NodeParams {
            name: entry.scalar_at("name").unwrap_or("Default").to_string(),
            position: field(entry, "position", Vec2::ZERO, vec2),
            scale: field(entry, "scale", Vec2::ONE, vec2),
            color: field(entry, "color", Color::WHITE, color),
        };
        let raw_params = raw_params(entry);
        let mut node = self.registry.create(type_name, &params, &raw_params)?;
        debug!(type_name, name = %params.name, "node constructed");

        if let Some(sprite) = node.element_mut().as_sprite_mut() {
            sprite.set_hframes(field(entry, "hframes", 1, positive_u32));
            sprite.set_vframes(field(entry, "vframes", 1, positive_u32));
            sprite.set_frame(field(entry, "frame", 0, non_negative_u32));
            sprite.set_linear_filtering(self.linear_filtering);
            if entry.get("color").is_some() {
                sprite.set_tint(Some(params.color));
            }
            let image_path = entry.scalar_at("image_path").unwrap_or("");
            if !image_path.is_empty() {
                sprite.set_image_path(image_path);
                match decode_texture(self.assets.as_ref(), image_path) {
                    Ok(data) => sprite.set_texture_data(data),
                    Err(e) => warn!(
                        path = image_path,
                        error = %format!("{e:#}"),
                        "texture unavailable; sprite will draw a placeholder"
                    ),
                }
            }
        }

        if let Some(animations) = entry.get("animations") {
            match node.element_mut().animator_mut() {
                Some(track) => populate_clips(track, animations),
                None => debug!(type_name, "node has no animation track; animations ignored"),
            }
        }

        let children = entry.get("children").map(TreeNode::items).unwrap_or(&[]);
        for (index, child) in children.iter().enumerate() {
            match self.build_node(child) {
                Ok(child) => {
                    node.add_child(child);
                }
                Err(e) => warn!(parent = node.name(), index, error = %e, "child skipped"),
            }
        }

        Ok(node)
    }

    /// Lists scene files (`.yaml`/`.yml`) in a directory, sorted by path.
    pub fn available_scenes(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, SceneError> {
        let dir = dir.as_ref();
        let io_err = |source| SceneError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut scenes = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_scene = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
            if is_scene && path.is_file() {
                scenes.push(path);
            }
        }
        scenes.sort();
        Ok(scenes)
    }
}

/// Adds every clip under an `animations` mapping to `track`.
///
/// A clip either lists its runs under `frames` (each `[start, count]`) or
/// uses `start_frame`/`frame_count` for a single run.
fn populate_clips(track: &mut AnimationTrack, animations: &TreeNode) {
    if !animations.is_mapping() {
        warn!("'animations' is not a mapping; ignored");
        return;
    }
    for (clip, data) in animations.entries() {
        let frames = match data.get("frames") {
            Some(runs) => runs
                .items()
                .iter()
                .filter_map(|run| match frame_run(run) {
                    Ok(run) => Some(run),
                    Err(e) => {
                        warn!(clip, error = %e, "frame run skipped");
                        None
                    }
                })
                .collect(),
            None => vec![AnimationFrame::new(
                field(data, "start_frame", 0, non_negative_u32),
                field(data, "frame_count", 1, positive_u32),
            )],
        };
        let frame_rate = field(data, "frame_rate", DEFAULT_FRAME_RATE, positive_f32);
        let looping = data.scalar_at("loop").map_or(true, parse_flag);

        if let Err(e) = track.add_clip(clip, frames, frame_rate, looping) {
            warn!(clip, error = %e, "clip skipped");
        }
    }
}

/// Reads an optional field, keeping `default` when it is absent or invalid.
fn field<T>(
    entry: &TreeNode,
    key: &str,
    default: T,
    read: impl Fn(&TreeNode) -> Result<T, ParseValueError>,
) -> T {
    match entry.get(key) {
        None => default,
        Some(value) => read(value).unwrap_or_else(|e| {
            warn!(field = key, error = %e, "invalid value; using default");
            default
        }),
    }
}

/// Components of an inline array, or of a comma-separated scalar.
fn components(value: &TreeNode) -> Vec<&str> {
    match value {
        TreeNode::Scalar(s) => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
        other => other.scalar_items(),
    }
}

fn floats(value: &TreeNode, min: usize, expected: &'static str) -> Result<Vec<f32>, ParseValueError> {
    let parts = components(value);
    if parts.len() < min {
        return Err(ParseValueError::new(&parts.join(", "), expected));
    }
    parts.iter().map(|p| parse_f32(p)).collect()
}

fn vec2(value: &TreeNode) -> Result<Vec2, ParseValueError> {
    let v = floats(value, 2, "[x, y]")?;
    Ok(Vec2::new(v[0], v[1]))
}

fn color(value: &TreeNode) -> Result<Color, ParseValueError> {
    let v = floats(value, 3, "[r, g, b]")?;
    let alpha = v.get(3).copied().unwrap_or(1.0);
    Ok(Color::new(v[0], v[1], v[2], alpha))
}

fn scalar(value: &TreeNode) -> Result<&str, ParseValueError> {
    value
        .as_scalar()
        .ok_or_else(|| ParseValueError::new("<block>", "scalar"))
}

fn non_negative_u32(value: &TreeNode) -> Result<u32, ParseValueError> {
    let raw = scalar(value)?;
    u32::try_from(parse_i32(raw)?).map_err(|_| ParseValueError::new(raw, "non-negative integer"))
}

fn positive_u32(value: &TreeNode) -> Result<u32, ParseValueError> {
    let raw = scalar(value)?;
    match non_negative_u32(value)? {
        0 => Err(ParseValueError::new(raw, "positive integer")),
        n => Ok(n),
    }
}

fn positive_f32(value: &TreeNode) -> Result<f32, ParseValueError> {
    let raw = scalar(value)?;
    match parse_f32(raw)? {
        v if v > 0.0 => Ok(v),
        _ => Err(ParseValueError::new(raw, "positive number")),
    }
}

fn frame_run(run: &TreeNode) -> Result<AnimationFrame, ParseValueError> {
    if run.is_mapping() {
        return Ok(AnimationFrame::new(
            field(run, "start_frame", 0, non_negative_u32),
            field(run, "frame_count", 1, positive_u32),
        ));
    }
    let parts = components(run);
    let [start, count] = parts.as_slice() else {
        return Err(ParseValueError::new(&parts.join(", "), "[start, count]"));
    };
    let start = u32::try_from(parse_i32(start)?)
        .map_err(|_| ParseValueError::new(start, "non-negative integer"))?;
    let count = match parse_i32(count)? {
        n if n > 0 => n as u32,
        _ => return Err(ParseValueError::new(count, "positive integer")),
    };
    Ok(AnimationFrame::new(start, count))
}

/// Raw behavior parameters: an inline array or a comma-separated scalar.
fn raw_params(entry: &TreeNode) -> Vec<String> {
    entry
        .get("params")
        .map(|p| components(p).into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}
