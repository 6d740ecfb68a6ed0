//! # Scene Writer
//!
//! Serializes a [`Scene`] back into a scene file the loader accepts.

use crate::animation::AnimationTrack;
use crate::document::{to_text, TreeNode};
use crate::errors::SceneError;
use crate::scene::{Node, Scene};
use crate::types::Color;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

/// Serializes a scene back into the format the loader reads.
///
/// Node types, names, transforms, colors, behavior parameters, sprite-sheet
/// fields, animation clips and nested children are written. Runtime state
/// (current rotation, playback position, motion applied by behaviors) is
/// not.
pub struct SceneWriter;

impl SceneWriter {
    pub fn to_tree(scene: &Scene) -> TreeNode {
        let mut doc = BTreeMap::new();
        doc.insert(
            "scene".to_string(),
            mapping([("name", TreeNode::scalar(scene.name()))]),
        );
        doc.insert(
            "nodes".to_string(),
            TreeNode::Sequence(scene.nodes().iter().map(node_tree).collect()),
        );
        TreeNode::Mapping(doc)
    }

    pub fn to_text(scene: &Scene) -> String {
        to_text(&Self::to_tree(scene))
    }

    #[instrument(level = "debug", skip(scene, path), fields(scene = scene.name(), path = %path.as_ref().display()))]
    pub fn save(scene: &Scene, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        let text = format!("# Scene: {}\n{}", scene.name(), Self::to_text(scene));
        std::fs::write(path, text).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(nodes = scene.total_node_count(), "scene saved");
        Ok(())
    }
}

fn mapping<const N: usize>(entries: [(&str, TreeNode); N]) -> TreeNode {
    TreeNode::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn numbers(values: &[f32]) -> TreeNode {
    TreeNode::Sequence(values.iter().map(|v| TreeNode::scalar(v.to_string())).collect())
}

fn color_tree(c: Color) -> TreeNode {
    if c.a == 1.0 {
        numbers(&[c.r, c.g, c.b])
    } else {
        numbers(&[c.r, c.g, c.b, c.a])
    }
}

fn node_tree(node: &Node) -> TreeNode {
    let mut out = BTreeMap::new();
    let mut put = |key: &str, value: TreeNode| {
        out.insert(key.to_string(), value);
    };

    put("type", TreeNode::scalar(node.type_name()));
    put("name", TreeNode::scalar(node.name()));

    let element = node.element();
    if let Some(mut t) = element.transform().copied() {
        for behavior in node.behaviors() {
            behavior.restore_authored(&mut t);
        }
        put("position", numbers(&[t.position.x, t.position.y]));
        put("scale", numbers(&[t.scale.x, t.scale.y]));
    }
    if let Some(c) = element.color() {
        put("color", color_tree(c));
    }

    let params: Vec<TreeNode> = node
        .behaviors()
        .iter()
        .flat_map(|b| b.params())
        .map(TreeNode::Scalar)
        .collect();
    if !params.is_empty() {
        put("params", TreeNode::Sequence(params));
    }

    if let Some(sprite) = element.as_sprite() {
        if !sprite.image_path().is_empty() {
            put("image_path", TreeNode::scalar(sprite.image_path()));
        }
        put("hframes", TreeNode::scalar(sprite.hframes().to_string()));
        put("vframes", TreeNode::scalar(sprite.vframes().to_string()));
        put("frame", TreeNode::scalar(sprite.frame().to_string()));
    }

    if let Some(track) = element.animator() {
        if track.clips().next().is_some() {
            put("animations", clips_tree(track));
        }
    }

    if !node.children().is_empty() {
        put(
            "children",
            TreeNode::Sequence(node.children().iter().map(node_tree).collect()),
        );
    }

    TreeNode::Mapping(out)
}

fn clips_tree(track: &AnimationTrack) -> TreeNode {
    let clips = track
        .clips()
        .map(|clip| {
            let mut data = BTreeMap::new();
            match clip.frames.as_slice() {
                [run] => {
                    data.insert("start_frame".to_string(), TreeNode::scalar(run.start_frame.to_string()));
                    data.insert("frame_count".to_string(), TreeNode::scalar(run.frame_count.to_string()));
                }
                runs => {
                    let runs = runs
                        .iter()
                        .map(|r| {
                            TreeNode::Sequence(vec![
                                TreeNode::scalar(r.start_frame.to_string()),
                                TreeNode::scalar(r.frame_count.to_string()),
                            ])
                        })
                        .collect();
                    data.insert("frames".to_string(), TreeNode::Sequence(runs));
                }
            }
            data.insert("frame_rate".to_string(), TreeNode::scalar(clip.frame_rate.to_string()));
            data.insert("loop".to_string(), TreeNode::scalar(clip.looping.to_string()));
            (clip.name.clone(), TreeNode::Mapping(data))
        })
        .collect();
    TreeNode::Mapping(clips)
}
