//! Versioned binary tree codec
//!
//! Parse trees round-trip through a compact binary format so an external
//! cache layer can store them. The wire layout:
//!
//! ```text
//! blob  := [version: u8] node*
//! node  := 0x00 [len: varint] utf8-bytes            (text)
//!        | 0x01 [namelen: varint] name
//!               [attrcount: varint] attr*
//!               [childcount: varint] node*          (tag)
//! attr  := [namelen: varint] name [has_value: u8]
//!          ([vallen: varint] value)?
//! ```
//!
//! Varints are unsigned LEB128. A blob carrying an unknown version decodes
//! to `None`: version skew is cache rollover across deployments, handled
//! by re-deriving the tree, never surfaced as an error. Truncated or
//! otherwise malformed input decodes to `None` the same way.

use crate::error::Result;
use crate::tree::Document;
use crate::types::{AttrMap, NodeId, NodeKind};

/// Current wire format version, written as the leading byte.
pub const FORMAT_VERSION: u8 = 1;

const KIND_TEXT: u8 = 0x00;
const KIND_TAG: u8 = 0x01;

/// Encode the document's root forest. The doctype is serializer metadata
/// and is not part of the wire format.
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    buf.push(FORMAT_VERSION);
    for &root in doc.roots() {
        encode_node(doc, root, &mut buf)?;
    }
    Ok(buf)
}

fn encode_node(doc: &Document, id: NodeId, buf: &mut Vec<u8>) -> Result<()> {
    match doc.kind(id)? {
        NodeKind::Text(text) => {
            buf.push(KIND_TEXT);
            write_bytes(text.as_bytes(), buf);
        }
        NodeKind::Tag(tag) => {
            buf.push(KIND_TAG);
            write_bytes(tag.name.as_bytes(), buf);
            write_varint(tag.attrs.len() as u64, buf);
            for (name, value) in &tag.attrs {
                write_bytes(name.as_bytes(), buf);
                match value {
                    Some(value) => {
                        buf.push(1);
                        write_bytes(value.as_bytes(), buf);
                    }
                    None => buf.push(0),
                }
            }
            write_varint(tag.children.len() as u64, buf);
            for &child in &tag.children {
                encode_node(doc, child, buf)?;
            }
        }
    }
    Ok(())
}

/// Decode a blob produced by [`encode`]. `None` means the blob is from
/// another format version or is unreadable; callers treat both as a cache
/// miss and rebuild from source.
pub fn decode(bytes: &[u8]) -> Option<Document> {
    let mut reader = Reader::new(bytes);
    let version = reader.read_u8()?;
    if version != FORMAT_VERSION {
        log::debug!(
            target: "markup.codec",
            "discarding blob with format version {} (current {})",
            version,
            FORMAT_VERSION
        );
        return None;
    }

    let mut doc = Document::new();
    while !reader.is_empty() {
        let id = decode_node(&mut reader, &mut doc)?;
        doc.push_root(id).ok()?;
    }
    Some(doc)
}

fn decode_node(reader: &mut Reader, doc: &mut Document) -> Option<NodeId> {
    match reader.read_u8()? {
        KIND_TEXT => {
            let text = reader.read_string()?;
            Some(doc.new_text(&text))
        }
        KIND_TAG => {
            let name = reader.read_string()?;

            let attr_count = reader.read_varint()?;
            let mut attrs = AttrMap::default();
            for _ in 0..attr_count {
                let attr_name = reader.read_string()?;
                let value = match reader.read_u8()? {
                    0 => None,
                    1 => Some(reader.read_string()?),
                    _ => return None,
                };
                attrs.insert(attr_name, value);
            }

            let id = doc.new_tag_with_attrs(&name, attrs);
            let child_count = reader.read_varint()?;
            for _ in 0..child_count {
                let child = decode_node(reader, doc)?;
                doc.append_child(id, child).ok()?;
            }
            Some(id)
        }
        _ => None,
    }
}

fn write_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn write_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    write_varint(bytes.len() as u64, buf);
    buf.extend_from_slice(bytes);
}

/// Bounds-checked cursor over the input. Every read reports exhaustion as
/// `None`; nothing here panics on hostile input.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn read_varint(&mut self) -> Option<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return None;
            }
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Some(value);
            }
            shift += 7;
        }
    }

    fn read_slice(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_varint()?).ok()?;
        let slice = self.read_slice(len)?;
        String::from_utf8(slice.to_vec()).ok()
    }
}
