pub mod code_block;

use std::collections::BTreeMap;
use std::ops::{Index, Range};

pub use code_block::CodeBlock;

/// Index of a node inside its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node per markdown heading.
#[derive(Debug, Clone)]
pub struct CommandNode {
    /// Heading text, whitespace-normalized.
    pub heading: String,
    /// Heading depth, 1 (`#`) to 6 (`######`).
    pub level: u8,
    /// First non-empty paragraph under the heading, if it came before any code block.
    pub description: Option<String>,
    /// Fenced code blocks directly under the heading, in document order.
    pub code_blocks: Vec<CodeBlock>,
    /// Bindings from key/value tables directly under the heading.
    pub env: BTreeMap<String, String>,
    /// Byte span from the heading up to the next heading of any level.
    pub span: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl CommandNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Heading tree stored as an arena. Nodes are kept in document order and
/// refer to each other by [`NodeId`], so a child reaches its ancestors
/// without holding a pointer to them.
#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    roots: Vec<NodeId>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading node under `parent`, or as a new root.
    pub(crate) fn push(
        &mut self,
        parent: Option<NodeId>,
        heading: String,
        level: u8,
        span_start: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            heading,
            level,
            description: None,
            code_blocks: Vec::new(),
            env: BTreeMap::new(),
            span: span_start..span_start,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self[id].parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self[parent].parent;
        }
        ancestors
    }

    /// Case-insensitive exact heading lookup. Depth-first in document order,
    /// a node is compared before its children.
    pub fn find(&self, heading: &str) -> Option<NodeId> {
        let wanted = heading.to_lowercase();
        self.roots
            .iter()
            .find_map(|&root| self.find_from(root, &wanted))
    }

    fn find_from(&self, id: NodeId, wanted: &str) -> Option<NodeId> {
        if self[id].heading.to_lowercase() == wanted {
            return Some(id);
        }
        self[id]
            .children
            .iter()
            .find_map(|&child| self.find_from(child, wanted))
    }

    /// All nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CommandNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeId> for CommandTree {
    type Output = CommandNode;

    fn index(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (CommandTree, NodeId, NodeId, NodeId) {
        let mut tree = CommandTree::new();
        let build = tree.push(None, "Build".to_string(), 1, 0);
        let release = tree.push(Some(build), "Release".to_string(), 2, 10);
        let test = tree.push(None, "Test".to_string(), 1, 20);
        (tree, build, release, test)
    }

    #[test]
    fn push_links_parents_and_roots() {
        let (tree, build, release, test) = sample();
        assert_eq!(tree.roots(), &[build, test]);
        assert_eq!(tree.children(build), &[release]);
        assert_eq!(tree.parent(release), Some(build));
        assert_eq!(tree.parent(test), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let (mut tree, build, release, _) = sample();
        let deep = tree.push(Some(release), "Strip".to_string(), 3, 15);
        assert_eq!(tree.ancestors(deep), vec![release, build]);
        assert!(tree.ancestors(build).is_empty());
    }

    #[test]
    fn find_ignores_case() {
        let (tree, build, release, _) = sample();
        assert_eq!(tree.find("BUILD"), Some(build));
        assert_eq!(tree.find("release"), Some(release));
        assert_eq!(tree.find("deploy"), None);
    }

    #[test]
    fn find_prefers_parent_then_document_order() {
        let mut tree = CommandTree::new();
        let first = tree.push(None, "Setup".to_string(), 1, 0);
        let nested = tree.push(Some(first), "Run".to_string(), 2, 5);
        tree.push(None, "Run".to_string(), 1, 10);
        assert_eq!(tree.find("run"), Some(nested));
        assert_eq!(tree.find("setup"), Some(first));
    }
}
