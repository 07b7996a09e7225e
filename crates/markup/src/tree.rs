//! Arena-based canonical markup tree
//!
//! One `Document` owns every node it ever allocated, stored sequentially
//! in a `Vec` and addressed by `NodeId` indices. The parent back-reference
//! is an index too, never a second owning pointer, so there are no
//! reference cycles to manage: ownership flows strictly parent to children
//! through each tag's child list.
//!
//! ## Memory layout
//!
//! ```text
//! Document: Vec<Node>
//!           [Node0][Node1][Node2]...
//!            ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Mutation goes through `&mut self` methods, which is the whole
//! concurrency story: exclusive access to mutate, shared access to read.

use crate::error::{MarkupError, Result};
use crate::types::{AttrMap, Node, NodeId, NodeKind, TagData};
use crate::utils::escape_into;
use smallvec::SmallVec;

/// The canonical, parser-backend-independent markup tree.
///
/// A document is a forest: an ordered list of root nodes (a fragment may
/// parse to several top-level nodes) plus an optional doctype declaration.
/// Nodes detached by mutation stay allocated but unreachable; serializers
/// and the codec only ever walk from the roots.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    doctype: Option<String>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            doctype: None,
        }
    }

    /// Create a document with node capacity pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            roots: Vec::new(),
            doctype: None,
        }
    }

    /// Total number of allocated nodes (reachable or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The ordered root list.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// The document's doctype declaration, verbatim, if it has one.
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Set or clear the doctype declaration. Stored and later re-emitted
    /// verbatim; nothing is ever synthesized from it.
    pub fn set_doctype(&mut self, decl: Option<String>) {
        self.doctype = decl;
    }

    // ---- allocation ----------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node { parent: None, kind });
        id
    }

    /// Allocate a detached text node.
    pub fn new_text(&mut self, content: &str) -> NodeId {
        self.alloc(NodeKind::Text(content.to_string()))
    }

    /// Allocate a detached tag node with no attributes.
    pub fn new_tag(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Tag(TagData::new(name, AttrMap::default())))
    }

    /// Allocate a detached tag node with the given attributes.
    pub fn new_tag_with_attrs(&mut self, name: &str, attrs: AttrMap) -> NodeId {
        self.alloc(NodeKind::Tag(TagData::new(name, attrs)))
    }

    // ---- lookups -------------------------------------------------------

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id as usize)
            .ok_or(MarkupError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id as usize)
            .ok_or(MarkupError::NodeNotFound(id))
    }

    /// The node's payload, for read-only inspection and matching.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    fn tag(&self, id: NodeId) -> Result<&TagData> {
        match &self.node(id)?.kind {
            NodeKind::Tag(tag) => Ok(tag),
            kind => Err(MarkupError::KindMismatch {
                expected: "tag",
                actual: kind.label(),
            }),
        }
    }

    fn tag_mut(&mut self, id: NodeId) -> Result<&mut TagData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Tag(tag) => Ok(tag),
            kind => Err(MarkupError::KindMismatch {
                expected: "tag",
                actual: kind.label(),
            }),
        }
    }

    // ---- kind queries and accessors ------------------------------------

    /// Whether the node is a text node. The sole kind query that is legal
    /// on every node.
    pub fn is_text(&self, id: NodeId) -> Result<bool> {
        Ok(matches!(self.node(id)?.kind, NodeKind::Text(_)))
    }

    /// Text-only: the node's text content.
    pub fn text(&self, id: NodeId) -> Result<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => Ok(text),
            kind => Err(MarkupError::KindMismatch {
                expected: "text",
                actual: kind.label(),
            }),
        }
    }

    /// Text-only: replace the node's text content.
    pub fn set_text(&mut self, id: NodeId, content: &str) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(text) => {
                content.clone_into(text);
                Ok(())
            }
            kind => Err(MarkupError::KindMismatch {
                expected: "text",
                actual: kind.label(),
            }),
        }
    }

    /// Tag-only: the tag name.
    pub fn tag_name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.tag(id)?.name)
    }

    /// Tag-only: rename the tag. Identity, parent, and children are
    /// untouched.
    pub fn set_tag_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        name.clone_into(&mut self.tag_mut(id)?.name);
        Ok(())
    }

    // ---- attributes ----------------------------------------------------

    /// Tag-only: attribute names in insertion order.
    pub fn attribute_names(&self, id: NodeId) -> Result<impl Iterator<Item = &str>> {
        Ok(self.tag(id)?.attrs.keys().map(String::as_str))
    }

    /// Tag-only: whether the attribute exists, valueless or not.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> Result<bool> {
        Ok(self.tag(id)?.attrs.contains_key(name))
    }

    /// Tag-only: the attribute's value. `None` means absent *or* present
    /// without a value; `has_attribute` tells the two apart.
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self.tag(id)?.attrs.get(name).and_then(|v| v.as_deref()))
    }

    /// Tag-only: insert or overwrite an attribute. Overwriting with `None`
    /// turns it into a valueless attribute; the key keeps its position.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) -> Result<()> {
        self.tag_mut(id)?
            .attrs
            .insert(name.to_string(), value.map(str::to_string));
        Ok(())
    }

    /// Tag-only: remove an attribute; returns whether the key was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool> {
        // shift_remove keeps the remaining attributes in declaration order.
        Ok(self.tag_mut(id)?.attrs.shift_remove(name).is_some())
    }

    // ---- structure -----------------------------------------------------

    /// Tag-only: the live ordered child list.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.tag(id)?.children)
    }

    /// Parent of a node; `None` for roots and detached nodes.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Whether `node` lies inside the subtree rooted at `ancestor`
    /// (including `node == ancestor`). Walks the parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.node(id)?.parent;
        }
        Ok(false)
    }

    /// Unhook a node from whatever currently contains it: its parent's
    /// child list, or the root list for parentless nodes.
    fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => {
                if let NodeKind::Tag(tag) = &mut self.node_mut(parent)?.kind {
                    tag.children.retain(|c| *c != id);
                }
                self.node_mut(id)?.parent = None;
            }
            None => self.roots.retain(|r| *r != id),
        }
        Ok(())
    }

    /// Tag-only: append `child` as the last child of `parent`.
    ///
    /// A child attached elsewhere (another tag, or the root list) is moved:
    /// detached first, so every node stays in exactly one container.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Tag-only: insert `child` immediately before `before` in `parent`'s
    /// child list. A `before` of `None`, or one that is not currently a
    /// child of `parent`, appends at the end.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<()> {
        self.node(child)?;
        self.tag(parent)?;
        if self.is_ancestor_or_self(child, parent)? {
            return Err(MarkupError::CycleDetected(child));
        }
        self.detach(child)?;
        // Position is resolved after the detach so that moving a node
        // within the same parent lands where the caller asked.
        let tag = self.tag_mut(parent)?;
        match before.and_then(|b| tag.children.iter().position(|&c| c == b)) {
            Some(pos) => tag.children.insert(pos, child),
            None => tag.children.push(child),
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Tag-only: remove `child` from `parent`'s child list. Returns whether
    /// it was present; a removed child's parent reference is cleared.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        self.node(child)?;
        let tag = self.tag_mut(parent)?;
        let pos = match tag.children.iter().position(|&c| c == child) {
            Some(pos) => pos,
            None => return Ok(false),
        };
        tag.children.remove(pos);
        self.node_mut(child)?.parent = None;
        Ok(true)
    }

    /// Tag-only: detach every child, clearing each parent reference.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<()> {
        let children: SmallVec<[NodeId; 4]> = std::mem::take(&mut self.tag_mut(parent)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Append a node to the root list, detaching it from any previous
    /// container. Already a root: no-op.
    pub fn push_root(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        if self.roots.contains(&id) {
            return Ok(());
        }
        self.detach(id)?;
        self.roots.push(id);
        Ok(())
    }

    // ---- rendering and comparison --------------------------------------

    /// Recursively write the node's default textual form into `out`.
    ///
    /// Text is entity-escaped (`&` `<` `>` `"`); comment text (anything
    /// starting with `<!--`) is emitted verbatim. A tag
    /// with no children self-closes; a valueless attribute renders as the
    /// bare name.
    pub fn render_node(&self, id: NodeId, out: &mut String) -> Result<()> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => {
                if text.starts_with("<!--") {
                    out.push_str(text);
                } else {
                    escape_into(text, out);
                }
            }
            NodeKind::Tag(tag) => {
                out.push('<');
                out.push_str(&tag.name);
                for (name, value) in &tag.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        escape_into(value, out);
                        out.push('"');
                    }
                }
                if tag.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &tag.children {
                        self.render_node(child, out)?;
                    }
                    out.push_str("</");
                    out.push_str(&tag.name);
                    out.push('>');
                }
            }
        }
        Ok(())
    }

    /// Structural equality of the two root forests: same kinds, tag names
    /// and texts, attribute maps (order-independent) and child lists
    /// (order-dependent), recursively. The doctype is serializer metadata
    /// and does not participate.
    pub fn structural_eq(&self, other: &Document) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(&other.roots)
                .all(|(&a, &b)| self.subtree_eq(a, other, b))
    }

    fn subtree_eq(&self, a: NodeId, other: &Document, b: NodeId) -> bool {
        let (na, nb) = match (self.node(a), other.node(b)) {
            (Ok(na), Ok(nb)) => (na, nb),
            _ => return false,
        };
        match (&na.kind, &nb.kind) {
            (NodeKind::Text(ta), NodeKind::Text(tb)) => ta == tb,
            (NodeKind::Tag(ta), NodeKind::Tag(tb)) => {
                ta.name == tb.name
                    && ta.attrs == tb.attrs
                    && ta.children.len() == tb.children.len()
                    && ta
                        .children
                        .iter()
                        .zip(&tb.children)
                        .all(|(&ca, &cb)| self.subtree_eq(ca, other, cb))
            }
            _ => false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
