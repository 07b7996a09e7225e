//! Parser backend capability interface
//!
//! Concrete HTML parsers live outside this crate and differ structurally;
//! the canonical tree never sees their native types. Each backend exposes
//! its output through [`ParsedNode`], a minimal read-only view, and
//! [`Document::from_parsed`] builds the canonical tree from any
//! implementation of it.
//!
//! A JSON interchange backend ([`JsonNode`]) is bundled: parser processes
//! emit their output as JSON and this crate ingests it without linking
//! against them.

use crate::error::{MarkupError, Result};
use crate::tree::Document;
use crate::types::{AttrMap, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The read-only view a parser backend exposes for each produced node.
///
/// A node is either a tag or a text: exactly one of `tag_name` and `text`
/// returns `Some`. Implementations are expected to be cheap handles
/// (typically references into the backend's own structure), since building
/// walks `children` recursively.
pub trait ParsedNode: Sized {
    /// The tag name, for tag nodes.
    fn tag_name(&self) -> Option<&str>;

    /// The text content, for text nodes.
    fn text(&self) -> Option<&str>;

    /// Attribute pairs in source order. `None` values are valueless
    /// attributes. Must be empty for text nodes.
    fn attributes(&self) -> impl Iterator<Item = (&str, Option<&str>)>;

    /// Child nodes in source order. Must be empty for text nodes.
    fn children(&self) -> impl Iterator<Item = Self>;
}

impl Document {
    /// Build a single-root document from a backend node.
    pub fn from_parsed<P: ParsedNode>(root: P) -> Result<Self> {
        let mut doc = Document::new();
        doc.append_parsed(root)?;
        Ok(doc)
    }

    /// Build a subtree from a backend node and append it to the root list.
    pub fn append_parsed<P: ParsedNode>(&mut self, parsed: P) -> Result<NodeId> {
        let id = self.build_parsed(&parsed)?;
        self.push_root(id)?;
        Ok(id)
    }

    fn build_parsed<P: ParsedNode>(&mut self, parsed: &P) -> Result<NodeId> {
        match (parsed.tag_name(), parsed.text()) {
            (Some(name), None) => {
                let mut attrs = AttrMap::default();
                for (key, value) in parsed.attributes() {
                    attrs.insert(key.to_string(), value.map(str::to_string));
                }
                let id = self.new_tag_with_attrs(name, attrs);
                for child in parsed.children() {
                    let child_id = self.build_parsed(&child)?;
                    self.append_child(id, child_id)?;
                }
                Ok(id)
            }
            (None, Some(text)) => {
                if parsed.attributes().next().is_some() || parsed.children().next().is_some() {
                    return Err(MarkupError::MalformedBackend(
                        "text node reports attributes or children".to_string(),
                    ));
                }
                Ok(self.new_text(text))
            }
            (Some(_), Some(_)) => Err(MarkupError::MalformedBackend(
                "node reports both a tag name and text".to_string(),
            )),
            (None, None) => Err(MarkupError::MalformedBackend(
                "node reports neither a tag name nor text".to_string(),
            )),
        }
    }

    /// Build a document from interchange JSON: one node object, or an
    /// array of them for a multi-root fragment.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut doc = Document::new();
        match value {
            Value::Array(items) => {
                for item in items {
                    let node: JsonNode = serde_json::from_value(item)?;
                    doc.append_parsed(&node)?;
                }
            }
            value => {
                let node: JsonNode = serde_json::from_value(value)?;
                doc.append_parsed(&node)?;
            }
        }
        log::debug!(
            target: "markup.backend",
            "built {} nodes from interchange json",
            doc.len()
        );
        Ok(doc)
    }
}

/// One node of the JSON interchange format.
///
/// ```json
/// {"tag": "a", "attrs": {"href": "/x", "download": null},
///  "children": [{"text": "link"}]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attrs: AttrMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

impl JsonNode {
    /// Parse one interchange node from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse one interchange node from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Export a canonical subtree as an interchange node.
    pub fn from_tree(doc: &Document, id: NodeId) -> Result<Self> {
        match doc.kind(id)? {
            NodeKind::Text(text) => Ok(JsonNode {
                tag: None,
                text: Some(text.clone()),
                attrs: AttrMap::default(),
                children: Vec::new(),
            }),
            NodeKind::Tag(tag) => {
                let mut children = Vec::with_capacity(tag.children.len());
                for &child in &tag.children {
                    children.push(JsonNode::from_tree(doc, child)?);
                }
                Ok(JsonNode {
                    tag: Some(tag.name.clone()),
                    text: None,
                    attrs: tag.attrs.clone(),
                    children,
                })
            }
        }
    }
}

impl<'a> ParsedNode for &'a JsonNode {
    fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn attributes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    fn children(&self) -> impl Iterator<Item = Self> {
        let node: &'a JsonNode = *self;
        node.children.iter()
    }
}
