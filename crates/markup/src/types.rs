//! Core type definitions for the canonical markup tree
//!
//! Key design principles:
//! 1. Use u32 handles into an arena (4 bytes vs 8 bytes pointer)
//! 2. A tagged union for the node payload: a node is text *or* a tag,
//!    never a grab-bag of nullable fields
//! 3. Use SmallVec for child lists (most elements have few children)
//! 4. Insertion-ordered attribute maps, so re-serialization emits
//!    attributes the way the source document declared them

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Node identifier (index into the owning document's arena).
/// u32 allows 4 billion nodes, enough for any document.
pub type NodeId = u32;

/// Attribute map: name to optional value, insertion order preserved.
///
/// A `None` value is a present-but-valueless attribute (`<input disabled>`),
/// which is distinct from the attribute being absent altogether.
pub type AttrMap = IndexMap<String, Option<String>, ahash::RandomState>;

/// The payload of a tree node.
///
/// Text nodes also carry comments: a comment is text whose content starts
/// with `<!--`, detected lexically at render time.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Text(String),
    Tag(TagData),
}

impl NodeKind {
    /// Short label used in kind-mismatch errors.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            NodeKind::Text(_) => "text",
            NodeKind::Tag(_) => "tag",
        }
    }
}

/// Payload of a tag node: name, attributes, ordered children.
#[derive(Debug, Clone)]
pub struct TagData {
    pub name: String,
    pub attrs: AttrMap,
    pub children: SmallVec<[NodeId; 4]>,
}

impl TagData {
    pub(crate) fn new(name: &str, attrs: AttrMap) -> Self {
        Self {
            name: name.to_string(),
            attrs,
            children: SmallVec::new(),
        }
    }
}

/// An arena slot: the payload plus the non-owning parent back-reference.
///
/// `parent` is `None` for roots and detached nodes. Ownership always flows
/// parent to children through the child list; the back-reference is only
/// an index for upward navigation and is maintained by the mutation API.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}
