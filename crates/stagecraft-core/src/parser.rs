//! # Parser Module
//!
//! Reads the indentation-based scene format into a [`TreeNode`].
//!
//! ## Responsibilities
//! - **Structure**: nesting is decided purely by leading whitespace.
//! - **Entries**: `key: value` lines, `- item` sequence entries, and inline
//!   `[a, b, c]` arrays.
//! - **Leniency**: the parser never fails. Odd structure is logged and
//!   resolved as best it can; unreadable files yield an empty mapping.
//!
//! Blank lines and lines whose first non-blank character is `#` are ignored.
//! Scalars may be wrapped in single or double quotes, which are stripped.

use crate::document::TreeNode;
use crate::errors::SceneError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// A content line with its indentation measured.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

/// Single-pass recursive-descent parser over the content lines of a document.
pub struct StructuredTextParser<'a> {
    lines: Vec<Line<'a>>,
    cursor: usize,
}

impl<'a> StructuredTextParser<'a> {
    pub fn new(source: &'a str) -> Self {
        let lines = source
            .lines()
            .enumerate()
            .filter_map(|(i, raw)| {
                let text = raw.trim();
                if text.is_empty() || text.starts_with('#') {
                    return None;
                }
                let indent = raw.chars().take_while(|c| *c == ' ' || *c == '\t').count();
                Some(Line {
                    number: i + 1,
                    indent,
                    text,
                })
            })
            .collect();
        Self { lines, cursor: 0 }
    }

    /// Consumes the parser and returns the document root.
    pub fn parse(mut self) -> TreeNode {
        let Some(top) = self.peek_indent() else {
            return TreeNode::empty();
        };
        let mut root = self.parse_block(top);

        // Lines dedented below the first line's level still belong to the
        // document; fold them into the root.
        while let Some(line) = self.peek() {
            warn!(
                line = line.number,
                "indentation below document level; merging into root"
            );
            let block = self.parse_block(line.indent);
            root = merge(root, block);
        }
        root
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.cursor).copied()
    }

    fn peek_indent(&self) -> Option<usize> {
        self.peek().map(|l| l.indent)
    }

    /// Parses consecutive lines at `indent` (and anything nested under them).
    fn parse_block(&mut self, indent: usize) -> TreeNode {
        let mut entries: BTreeMap<String, TreeNode> = BTreeMap::new();
        let mut items: Vec<TreeNode> = Vec::new();
        let mut last_key: Option<String> = None;

        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                warn!(
                    line = line.number,
                    "unexpected indentation; attaching to previous entry"
                );
                let nested = self.parse_block(line.indent);
                attach_orphan(&mut entries, &mut items, last_key.as_deref(), nested);
                continue;
            }

            self.cursor += 1;
            if let Some(content) = item_content(line.text) {
                let item = self.parse_item(content, indent);
                items.push(item);
                last_key = None;
            } else {
                let (key, raw_value) = split_entry(line.text);
                let value = self.parse_entry_value(raw_value, indent, line.number);
                if entries.insert(key.to_string(), value).is_some() {
                    debug!(line = line.number, key, "duplicate key; last value wins");
                }
                last_key = Some(key.to_string());
            }
        }

        finish(entries, items, indent)
    }

    /// The value of a `key: value` line. A deeper block on the following
    /// lines takes precedence over an inline value.
    fn parse_entry_value(&mut self, raw: &str, indent: usize, number: usize) -> TreeNode {
        match self.peek_indent() {
            Some(next) if next > indent => {
                if !raw.is_empty() {
                    warn!(
                        line = number,
                        value = raw,
                        "inline value replaced by nested block"
                    );
                }
                self.parse_block(next)
            }
            _ => scalar_value(raw),
        }
    }

    /// Parses the body of a `- ` entry whose dash sits at `dash_indent`.
    fn parse_item(&mut self, content: &str, dash_indent: usize) -> TreeNode {
        let content_column = dash_indent + 2;
        let deeper = self.peek_indent().filter(|i| *i > dash_indent);

        if content.is_empty() {
            return match deeper {
                Some(i) => self.parse_block(i),
                None => TreeNode::scalar(""),
            };
        }

        if !is_mapping_entry(content) {
            if let Some(i) = deeper {
                warn!(
                    item = content,
                    "sequence item followed by nested block; using the block"
                );
                return self.parse_block(i);
            }
            return scalar_value(content);
        }

        let (key, raw_value) = split_entry(content);
        let mut map = BTreeMap::new();
        let first = match deeper {
            Some(i) if raw_value.is_empty() && i > content_column => self.parse_block(i),
            _ => scalar_value(raw_value),
        };
        map.insert(key.to_string(), first);

        // Continuation lines of the same item, e.g. further keys aligned under
        // the first one.
        if let Some(i) = self.peek_indent().filter(|i| *i > dash_indent) {
            match self.parse_block(i) {
                TreeNode::Mapping(rest) => map.extend(rest),
                other if other.is_empty() => {}
                _ => warn!(key, "sequence under a mapping item ignored"),
            }
        }
        TreeNode::Mapping(map)
    }
}

/// Parses a whole document. Never fails; see the module docs.
pub fn parse(text: &str) -> TreeNode {
    StructuredTextParser::new(text).parse()
}

/// Reads and parses a file, returning the empty sentinel if it cannot be read.
pub fn parse_file(path: impl AsRef<Path>) -> TreeNode {
    let path = path.as_ref();
    match read_file(path) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "falling back to empty document");
            TreeNode::empty()
        }
    }
}

/// Reads and parses a file, reporting IO failures.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn read_file(path: &Path) -> Result<TreeNode, SceneError> {
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&text))
}

fn item_content(text: &str) -> Option<&str> {
    if text == "-" {
        Some("")
    } else {
        text.strip_prefix("- ").map(str::trim)
    }
}

/// Splits at the first `:`. A line without a colon is a key with no value.
fn split_entry(text: &str) -> (&str, &str) {
    match text.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (text.trim(), ""),
    }
}

fn is_mapping_entry(content: &str) -> bool {
    !content.starts_with(['"', '\'', '[']) && content.contains(':')
}

/// Interprets a raw inline value: `[a, b]` becomes a sequence, anything else
/// an unquoted scalar.
fn scalar_value(raw: &str) -> TreeNode {
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|part| TreeNode::scalar(unquote(part.trim())))
                .collect()
        };
        return TreeNode::Sequence(items);
    }
    TreeNode::scalar(unquote(raw))
}

fn unquote(raw: &str) -> &str {
    for q in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn finish(entries: BTreeMap<String, TreeNode>, items: Vec<TreeNode>, indent: usize) -> TreeNode {
    match (entries.is_empty(), items.is_empty()) {
        (_, true) => TreeNode::Mapping(entries),
        (true, false) => TreeNode::Sequence(items),
        (false, false) => {
            warn!(
                indent,
                dropped = items.len(),
                "keys and sequence items mixed at one level; keeping the keys"
            );
            TreeNode::Mapping(entries)
        }
    }
}

fn attach_orphan(
    entries: &mut BTreeMap<String, TreeNode>,
    items: &mut Vec<TreeNode>,
    last_key: Option<&str>,
    nested: TreeNode,
) {
    match nested {
        TreeNode::Mapping(map) => {
            let target = last_key.and_then(|k| entries.get_mut(k));
            match target {
                Some(TreeNode::Mapping(existing)) => existing.extend(map),
                _ => entries.extend(map),
            }
        }
        TreeNode::Sequence(seq) => {
            if entries.is_empty() {
                items.extend(seq);
            } else {
                warn!(dropped = seq.len(), "orphaned sequence items ignored");
            }
        }
        TreeNode::Scalar(_) => {}
    }
}

fn merge(base: TreeNode, extra: TreeNode) -> TreeNode {
    match (base, extra) {
        (TreeNode::Mapping(mut a), TreeNode::Mapping(b)) => {
            a.extend(b);
            TreeNode::Mapping(a)
        }
        (TreeNode::Sequence(mut a), TreeNode::Sequence(b)) => {
            a.extend(b);
            TreeNode::Sequence(a)
        }
        (base, extra) if base.is_empty() => extra,
        (base, _) => {
            warn!("trailing block of a different kind ignored");
            base
        }
    }
}
