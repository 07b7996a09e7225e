//! Read-only traversal and queries over a [`Document`]

use crate::error::Result;
use crate::tree::Document;
use crate::types::{NodeId, NodeKind};

impl Document {
    /// Traverse a subtree depth-first, calling `visit` on every node.
    pub fn traverse_df<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &NodeKind) -> Result<()>,
    {
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            visit(id, &node.kind)?;

            // Push children in reverse order (so they're visited left-to-right)
            if let NodeKind::Tag(tag) = &node.kind {
                for &child in tag.children.iter().rev() {
                    stack.push(child);
                }
            }
        }

        Ok(())
    }

    /// All reachable nodes matching the predicate, in document order.
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.roots().iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if let Ok(kind) = self.kind(id) {
                if predicate(kind) {
                    found.push(id);
                }
                if let NodeKind::Tag(tag) = kind {
                    for &child in tag.children.iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }

        found
    }

    /// First reachable node matching the predicate, in document order.
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut stack: Vec<NodeId> = self.roots().iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if let Ok(kind) = self.kind(id) {
                if predicate(kind) {
                    return Some(id);
                }
                if let NodeKind::Tag(tag) = kind {
                    for &child in tag.children.iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }

        None
    }

    /// All tags with the given name, ASCII case-insensitive.
    pub fn find_by_tag(&self, name: &str) -> Vec<NodeId> {
        self.find(|kind| matches!(kind, NodeKind::Tag(tag) if tag.name.eq_ignore_ascii_case(name)))
    }
}
