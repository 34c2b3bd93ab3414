use std::collections::HashMap;
use std::fmt;

use crate::parser::line::{CODE_BLOCK_TAG, CODE_LINE_PLACEHOLDER};

/// Handle into a [`Tree`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// A single output node: a tag name, classes, attributes, optional text
/// content, and ordered children.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Source nesting depth, recorded during tree building and cleared
    /// before the tree is handed to the caller.
    indent: Option<i32>,
}

/// An owned node arena. Nodes reference each other by index, so upward
/// walks (enclosing section, dedent reattachment) are plain index chases.
///
/// The first allocated node is the root; for a built section that is the
/// header node.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { nodes: Vec::new() }
    }

    /// Allocate a detached node with the given tag name.
    pub fn new_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
            indent: None,
        });
        id
    }

    /// The first allocated node. Meaningless on an empty tree.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        &self.nodes[id.0].classes
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id.0].classes.push(class.to_string());
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes[id.0].attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        self.nodes[id.0]
            .attrs
            .insert(key.to_string(), value.to_string());
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = Some(text.to_string());
    }

    /// Nearest node named `name` at or above `id`, walking parent links.
    pub fn enclosing(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if self.nodes[node.0].name == name {
                return Some(node);
            }
            cursor = self.nodes[node.0].parent;
        }
        None
    }

    pub(crate) fn indent(&self, id: NodeId) -> Option<i32> {
        self.nodes[id.0].indent
    }

    pub(crate) fn set_indent(&mut self, id: NodeId, indent: i32) {
        self.nodes[id.0].indent = Some(indent);
    }

    /// Strip the construction-only indent bookkeeping from every node.
    pub(crate) fn clear_indents(&mut self) {
        for node in &mut self.nodes {
            node.indent = None;
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self.nodes[id.0];
        let pad = "  ".repeat(depth);

        write!(f, "{}<{}", pad, node.name)?;
        if !node.classes.is_empty() {
            write!(f, " class=\"{}\"", node.classes.join(" "))?;
        }
        let mut keys: Vec<&String> = node.attrs.keys().collect();
        keys.sort();
        for key in keys {
            write!(f, " {}=\"{}\"", key, node.attrs[key])?;
        }
        writeln!(f, ">")?;

        if let Some(text) = &node.text {
            if node.name == CODE_BLOCK_TAG {
                // Code payloads carry the line-break placeholder; restore
                // the original lines verbatim.
                for line in text.split(CODE_LINE_PLACEHOLDER) {
                    writeln!(f, "{}  {}", pad, line)?;
                }
            } else {
                writeln!(f, "{}  {}", pad, text)?;
            }
        }
        for child in &node.children {
            self.fmt_node(f, *child, depth + 1)?;
        }
        writeln!(f, "{}</{}>", pad, node.name)
    }
}

/// Indented HTML-like dump of the tree, for inspection and `--check`-style
/// tooling. Not a byte-accurate HTML serializer.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        self.fmt_node(f, self.root(), 0)
    }
}
