//! # Scene Module
//!
//! The scene graph: `Node` owns its element, behaviors and children;
//! `Scene` owns the root. Update, render and input run parents first.

use crate::behavior::Behavior;
use crate::element::Element;
use crate::errors::RenderError;
use crate::input::InputState;
use crate::node::RootElement;
use crate::render::DrawContext;
use crate::types::NodeId;
use tracing::{debug, instrument, trace};

/// Nesting deeper than this aborts a render pass.
pub const MAX_RENDER_DEPTH: usize = 256;

/// A scene-graph node: an element, the behaviors composed onto it, and the
/// children it owns.
///
/// Children are owned exclusively; the parent link is a non-owning id that
/// is set by `add_child` and cleared by `remove_child`.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    type_name: String,
    parent: Option<NodeId>,
    children: Vec<Node>,
    element: Box<dyn Element>,
    behaviors: Vec<Box<dyn Behavior>>,
}

impl Node {
    /// Wraps an element in a fresh, unparented node.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, element: Box<dyn Element>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            type_name: type_name.into(),
            parent: None,
            children: Vec::new(),
            element,
            behaviors: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, behavior: Box<dyn Behavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behaviors.push(behavior);
    }

    pub fn behaviors(&self) -> &[Box<dyn Behavior>] {
        &self.behaviors
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The registry name this node was built from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn element(&self) -> &dyn Element {
        self.element.as_ref()
    }

    pub fn element_mut(&mut self) -> &mut dyn Element {
        self.element.as_mut()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Takes ownership of `child` and appends it after the existing children.
    pub fn add_child(&mut self, mut child: Node) -> NodeId {
        child.parent = Some(self.id);
        let id = child.id;
        trace!(parent = %self.id, child = %id, name = %child.name, "child added");
        self.children.push(child);
        id
    }

    /// Detaches the direct child with the given id and hands it back.
    pub fn remove_child(&mut self, id: NodeId) -> Option<Node> {
        let pos = self.children.iter().position(|c| c.id == id)?;
        let mut child = self.children.remove(pos);
        child.parent = None;
        Some(child)
    }

    /// Drops every child together with its subtree.
    pub fn remove_all_children(&mut self) {
        if !self.children.is_empty() {
            debug!(node = %self.name, count = self.children.len(), "removing all children");
        }
        self.children.clear();
    }

    /// Pre-order search by name, starting with this node.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// Updates the element, then its behaviors, then each child in order.
    pub fn update_recursive(&mut self, dt: f32) {
        self.element.update(dt);
        for behavior in &mut self.behaviors {
            behavior.on_update(self.element.as_mut(), dt);
        }
        for child in &mut self.children {
            child.update_recursive(dt);
        }
    }

    /// Draws this node, then each child in order.
    pub fn render_recursive(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        self.render_at_depth(ctx, 0)
    }

    fn render_at_depth(&self, ctx: &mut dyn DrawContext, depth: usize) -> Result<(), RenderError> {
        if depth > MAX_RENDER_DEPTH {
            return Err(RenderError::RecursionLimit);
        }
        self.element.render(ctx)?;
        for child in &self.children {
            child.render_at_depth(ctx, depth + 1)?;
        }
        Ok(())
    }

    pub fn handle_input_recursive(&mut self, input: &InputState) {
        self.element.handle_input(input);
        for child in &mut self.children {
            child.handle_input_recursive(input);
        }
    }

    pub fn upload_resources_recursive(&mut self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        self.element.upload_resources(ctx)?;
        for child in &mut self.children {
            child.upload_resources_recursive(ctx)?;
        }
        Ok(())
    }
}

/// A named scene: the root node and everything it owns.
#[derive(Debug)]
pub struct Scene {
    name: String,
    root: Node,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Node::new("Root", "Root", Box::new(RootElement)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Top-level nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        self.root.children()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.root.add_child(node)
    }

    /// Detaches the first top-level node with the given name.
    pub fn remove_node(&mut self, name: &str) -> Option<Node> {
        let id = self.root.children.iter().find(|n| n.name == name)?.id;
        self.root.remove_child(id)
    }

    pub fn clear(&mut self) {
        self.root.remove_all_children();
    }

    /// Number of top-level nodes.
    pub fn node_count(&self) -> usize {
        self.root.child_count()
    }

    /// Number of nodes at any depth, excluding the root.
    pub fn total_node_count(&self) -> usize {
        self.root.descendant_count()
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        self.root.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.root.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    pub fn update(&mut self, dt: f32) {
        self.root.update_recursive(dt);
    }

    #[instrument(level = "trace", skip_all, fields(scene = %self.name))]
    pub fn render(&self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        self.root.render_recursive(ctx)
    }

    pub fn handle_input(&mut self, input: &InputState) {
        self.root.handle_input_recursive(input);
    }

    /// Uploads decoded textures of every node to `ctx`.
    #[instrument(level = "debug", skip_all, fields(scene = %self.name))]
    pub fn upload_resources(&mut self, ctx: &mut dyn DrawContext) -> Result<(), RenderError> {
        self.root.upload_resources_recursive(ctx)
    }
}
