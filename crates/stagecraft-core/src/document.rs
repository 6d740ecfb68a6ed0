//! # Document Module
//!
//! The generic tree produced by the scene-file parser, the scalar coercion
//! helpers used by consumers of that tree, and a serializer back to text.
//!
//! A `TreeNode` is exactly one of scalar, mapping or sequence. Numeric and
//! boolean interpretation is left to the consumer: the parser only ever
//! produces strings.

use crate::errors::ParseValueError;
use std::collections::BTreeMap;
use std::fmt;

/// A parsed document node.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Scalar(String),
    Mapping(BTreeMap<String, TreeNode>),
    Sequence(Vec<TreeNode>),
}

impl Default for TreeNode {
    fn default() -> Self {
        TreeNode::empty()
    }
}

impl TreeNode {
    /// The sentinel returned for unreadable or empty input: an empty mapping.
    pub fn empty() -> Self {
        TreeNode::Mapping(BTreeMap::new())
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        TreeNode::Scalar(value.into())
    }

    /// Returns true for an empty mapping, an empty sequence or an empty scalar.
    pub fn is_empty(&self) -> bool {
        match self {
            TreeNode::Scalar(s) => s.is_empty(),
            TreeNode::Mapping(m) => m.is_empty(),
            TreeNode::Sequence(items) => items.is_empty(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TreeNode::Scalar(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, TreeNode::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TreeNode::Sequence(_))
    }

    /// Looks up a key if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        match self {
            TreeNode::Mapping(m) => m.get(key),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            TreeNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Shorthand for `get(key)` followed by `as_scalar()`.
    pub fn scalar_at(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TreeNode::as_scalar)
    }

    /// Sequence items; empty for scalars and mappings.
    pub fn items(&self) -> &[TreeNode] {
        match self {
            TreeNode::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Mapping entries in key order; empty for scalars and sequences.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.as_mapping()
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// The scalar items of a sequence, skipping nested structures.
    pub fn scalar_items(&self) -> Vec<&str> {
        self.items().iter().filter_map(TreeNode::as_scalar).collect()
    }
}

/// Reads a float, rejecting non-finite literals.
pub fn parse_f32(raw: &str) -> Result<f32, ParseValueError> {
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseValueError::new(raw, "number")),
    }
}

pub fn parse_i32(raw: &str) -> Result<i32, ParseValueError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ParseValueError::new(raw, "integer"))
}

/// Only the literal `true` enables a flag; anything else reads as false.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim() == "true"
}

/// Serializes a tree back to the indentation format accepted by the parser.
///
/// Sequences of plain scalars (and empty sequences) are written inline
/// (`[a, b]`, `[]`); everything else uses block form with two-space indentation.
pub fn to_text(node: &TreeNode) -> String {
    let mut out = String::new();
    match node {
        TreeNode::Mapping(m) => write_mapping(&mut out, m, 0),
        TreeNode::Sequence(items) => {
            for item in items {
                write_item(&mut out, item, 0);
            }
        }
        TreeNode::Scalar(s) => {
            out.push_str(&quote(s));
            out.push('\n');
        }
    }
    out
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self))
    }
}

fn write_mapping(out: &mut String, map: &BTreeMap<String, TreeNode>, indent: usize) {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        match value {
            TreeNode::Scalar(s) => {
                out.push_str(&format!("{pad}{key}: {}\n", quote(s)));
            }
            TreeNode::Sequence(items) if is_inline(items) => {
                out.push_str(&format!("{pad}{key}: {}\n", inline(items)));
            }
            TreeNode::Sequence(items) => {
                out.push_str(&format!("{pad}{key}:\n"));
                for item in items {
                    write_item(out, item, indent + 2);
                }
            }
            TreeNode::Mapping(inner) => {
                out.push_str(&format!("{pad}{key}:\n"));
                write_mapping(out, inner, indent + 2);
            }
        }
    }
}

fn write_item(out: &mut String, item: &TreeNode, indent: usize) {
    let pad = " ".repeat(indent);
    match item {
        // A bare `a:b` item would read back as a mapping entry.
        TreeNode::Scalar(s) if s.contains(':') => out.push_str(&format!("{pad}- \"{s}\"\n")),
        TreeNode::Scalar(s) => out.push_str(&format!("{pad}- {}\n", quote(s))),
        TreeNode::Sequence(items) if is_inline(items) => {
            out.push_str(&format!("{pad}- {}\n", inline(items)));
        }
        TreeNode::Sequence(items) => {
            out.push_str(&format!("{pad}-\n"));
            for nested in items {
                write_item(out, nested, indent + 2);
            }
        }
        TreeNode::Mapping(map) if map.is_empty() => out.push_str(&format!("{pad}-\n")),
        TreeNode::Mapping(map) => {
            // The first entry shares the dash line; the rest align under it.
            let mut body = String::new();
            write_mapping(&mut body, map, indent + 2);
            out.push_str(&pad);
            out.push_str("- ");
            out.push_str(&body[indent + 2..]);
        }
    }
}

fn is_inline(items: &[TreeNode]) -> bool {
    items.iter().all(|item| match item {
        TreeNode::Scalar(s) => {
            !s.is_empty() && !s.contains([',', '[', ']', '"', '\'']) && s.trim() == s
        }
        _ => false,
    })
}

fn inline(items: &[TreeNode]) -> String {
    let parts: Vec<&str> = items.iter().filter_map(TreeNode::as_scalar).collect();
    format!("[{}]", parts.join(", "))
}

fn quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.trim() != s
        || s.starts_with(['#', '[', '-', '"', '\''])
        || s.contains(": ");
    if needs_quotes {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}
