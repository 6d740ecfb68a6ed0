//! # Registry Module
//!
//! Maps the `type` names used in scene files to node constructors.
//!
//! ## Namespaces
//! - **Node factories** build a plain node from its common parameters
//!   (name, position, scale, color).
//! - **Behavior factories** also receive the entry's raw parameter strings
//!   and attach a configured behavior to the node they build. They coerce
//!   their own parameters; a bad value keeps that parameter's default.
//!
//! Lookups never fail hard: `resolve` returns `Resolved::NotFound` and the
//! caller decides how to report it.

use crate::behavior::{Oscillate, Pulse, Rotate};
use crate::errors::SceneError;
use crate::node::{Rectangle, Sprite2D, Triangle};
use crate::scene::Node;
use crate::types::{Color, Transform2D};
use glam::Vec2;
use std::collections::HashMap;
use tracing::debug;

/// Common construction parameters shared by every node type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeParams {
    pub name: String,
    pub position: Vec2,
    pub scale: Vec2,
    pub color: Color,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            color: Color::WHITE,
        }
    }
}

impl NodeParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn transform(&self) -> Transform2D {
        Transform2D::new(self.position, self.scale)
    }
}

pub type NodeFactory = Box<dyn Fn(&NodeParams) -> Node + Send + Sync>;
pub type BehaviorFactory = Box<dyn Fn(&NodeParams, &[String]) -> Node + Send + Sync>;

/// Outcome of a type lookup.
pub enum Resolved<'a> {
    Node(&'a NodeFactory),
    Behavior(&'a BehaviorFactory),
    NotFound,
}

impl Resolved<'_> {
    pub fn is_found(&self) -> bool {
        !matches!(self, Resolved::NotFound)
    }

    /// Runs whichever factory was found. Node factories ignore `raw_params`.
    pub fn build(&self, params: &NodeParams, raw_params: &[String]) -> Option<Node> {
        match self {
            Resolved::Node(factory) => Some(factory(params)),
            Resolved::Behavior(factory) => Some(factory(params, raw_params)),
            Resolved::NotFound => None,
        }
    }
}

#[derive(Default)]
pub struct NodeTypeRegistry {
    nodes: HashMap<String, NodeFactory>,
    behaviors: HashMap<String, BehaviorFactory>,
}

impl std::fmt::Debug for NodeTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTypeRegistry")
            .field("nodes", &sorted(self.nodes.keys()))
            .field("behaviors", &sorted(self.behaviors.keys()))
            .finish()
    }
}

fn sorted<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = keys.map(String::as_str).collect();
    names.sort_unstable();
    names
}

impl NodeTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in shapes, sprites and behavior composites.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_node_factory("Triangle", |p| {
            Node::new(&p.name, "Triangle", Box::new(Triangle::new(p.transform(), p.color)))
        });
        registry.register_node_factory("Rectangle", |p| {
            Node::new(&p.name, "Rectangle", Box::new(Rectangle::new(p.transform(), p.color)))
        });
        registry.register_node_factory("Sprite2D", |p| {
            Node::new(&p.name, "Sprite2D", Box::new(Sprite2D::new(p.transform())))
        });

        registry.register_behavior_factory("RotatingTriangle", |p, raw| {
            Node::new(&p.name, "RotatingTriangle", Box::new(Triangle::new(p.transform(), p.color)))
                .with_behavior(Box::new(Rotate::from_params(raw)))
        });
        registry.register_behavior_factory("OscillatingRectangle", |p, raw| {
            Node::new(&p.name, "OscillatingRectangle", Box::new(Rectangle::new(p.transform(), p.color)))
                .with_behavior(Box::new(Oscillate::from_params(raw, p.position.x)))
        });
        registry.register_behavior_factory("PulsingTriangle", |p, raw| {
            Node::new(&p.name, "PulsingTriangle", Box::new(Triangle::new(p.transform(), p.color)))
                .with_behavior(Box::new(Pulse::from_params(raw)))
        });

        registry
    }

    /// Registers a plain node constructor, replacing any previous one.
    pub fn register_node_factory<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&NodeParams) -> Node + Send + Sync + 'static,
    {
        debug!(type_name, "node factory registered");
        self.nodes.insert(type_name.to_string(), Box::new(factory));
    }

    /// Registers a behavior-carrying constructor, replacing any previous one.
    pub fn register_behavior_factory<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&NodeParams, &[String]) -> Node + Send + Sync + 'static,
    {
        debug!(type_name, "behavior factory registered");
        self.behaviors.insert(type_name.to_string(), Box::new(factory));
    }

    /// Looks up a type name. Node factories take precedence over behavior
    /// factories registered under the same name.
    pub fn resolve(&self, type_name: &str) -> Resolved<'_> {
        if let Some(f) = self.nodes.get(type_name) {
            return Resolved::Node(f);
        }
        if let Some(f) = self.behaviors.get(type_name) {
            return Resolved::Behavior(f);
        }
        Resolved::NotFound
    }

    pub fn has_node_type(&self, type_name: &str) -> bool {
        self.nodes.contains_key(type_name)
    }

    pub fn has_behavior_type(&self, type_name: &str) -> bool {
        self.behaviors.contains_key(type_name)
    }

    /// Every registered type name, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names = sorted(self.nodes.keys().chain(self.behaviors.keys()));
        names.dedup();
        names
    }

    /// Resolves and builds in one step.
    pub fn create(
        &self,
        type_name: &str,
        params: &NodeParams,
        raw_params: &[String],
    ) -> Result<Node, SceneError> {
        self.resolve(type_name)
            .build(params, raw_params)
            .ok_or_else(|| SceneError::UnknownType(type_name.to_string()))
    }
}
