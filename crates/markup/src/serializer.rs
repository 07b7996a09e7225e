//! Markup serializers
//!
//! Two formatting policies over one walk. The default policy emits text
//! verbatim (escaped); the compact policy collapses whitespace runs in
//! text, except inside special tags. Doctype, comment, escaping, and
//! `osdata` normalization rules are shared by both.

use crate::error::Result;
use crate::tree::Document;
use crate::types::{NodeId, NodeKind};
use crate::utils::{collapse_into, escape_into};

/// Tags whose text content the compact policy leaves untouched.
const SPECIAL_TAGS: [&str; 4] = ["script", "style", "textarea", "pre"];

fn is_special_tag(name: &str) -> bool {
    SPECIAL_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

/// How text node content is treated during serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitespacePolicy {
    /// Emit text content as stored.
    Preserve,
    /// Collapse runs of space/tab/CR/LF to single spaces and trim runs at
    /// text-node edges. Subtrees of special tags are exempt.
    Collapse,
}

/// Tree-to-markup serializer.
#[derive(Debug, Clone)]
pub struct MarkupSerializer {
    whitespace: WhitespacePolicy,
}

impl MarkupSerializer {
    /// Serializer with the default (whitespace-preserving) policy.
    pub fn new() -> Self {
        Self::with_policy(WhitespacePolicy::Preserve)
    }

    /// Serializer with the compact (whitespace-collapsing) policy.
    pub fn compact() -> Self {
        Self::with_policy(WhitespacePolicy::Collapse)
    }

    pub fn with_policy(whitespace: WhitespacePolicy) -> Self {
        Self { whitespace }
    }

    /// Serialize the whole document: the doctype verbatim when present
    /// (never synthesized), then every root in order.
    pub fn serialize(&self, doc: &Document) -> Result<String> {
        let mut output = String::with_capacity(4096);

        if let Some(doctype) = doc.doctype() {
            output.push_str(doctype);
        }
        for &root in doc.roots() {
            self.serialize_node(doc, root, false, &mut output)?;
        }

        log::debug!(
            target: "markup.serializer",
            "serialized {} roots into {} bytes",
            doc.roots().len(),
            output.len()
        );
        Ok(output)
    }

    /// Serialize a single node recursively. `in_special` is set for the
    /// entire subtree of a special tag.
    fn serialize_node(
        &self,
        doc: &Document,
        id: NodeId,
        in_special: bool,
        output: &mut String,
    ) -> Result<()> {
        match doc.kind(id)? {
            NodeKind::Text(text) => {
                if text.starts_with("<!--") {
                    // Comments pass through under every policy.
                    output.push_str(text);
                } else {
                    match (self.whitespace, in_special) {
                        (WhitespacePolicy::Collapse, true) => output.push_str(text),
                        (WhitespacePolicy::Collapse, false) => collapse_into(text, output),
                        (WhitespacePolicy::Preserve, _) => escape_into(text, output),
                    }
                }
            }
            NodeKind::Tag(tag) => {
                // Legacy data-island elements serialize as script
                // containers; the stored tree keeps the original name.
                let is_osdata = tag.name.eq_ignore_ascii_case("osdata");
                let name = if is_osdata { "script" } else { tag.name.as_str() };
                let child_special = in_special || is_special_tag(name);

                output.push('<');
                output.push_str(name);
                if is_osdata {
                    output.push_str(" type=\"text/os-data\"");
                }
                for (attr_name, value) in &tag.attrs {
                    if is_osdata && attr_name.eq_ignore_ascii_case("type") {
                        continue;
                    }
                    output.push(' ');
                    output.push_str(attr_name);
                    if let Some(value) = value {
                        output.push_str("=\"");
                        escape_into(value, output);
                        output.push('"');
                    }
                }

                if tag.children.is_empty() && !is_osdata {
                    output.push_str("/>");
                } else {
                    output.push('>');
                    for &child in &tag.children {
                        self.serialize_node(doc, child, child_special, output)?;
                    }
                    output.push_str("</");
                    output.push_str(name);
                    output.push('>');
                }
            }
        }
        Ok(())
    }
}

impl Default for MarkupSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize with the default policy.
pub fn serialize(doc: &Document) -> Result<String> {
    MarkupSerializer::new().serialize(doc)
}

/// Serialize with the compact policy.
pub fn serialize_compact(doc: &Document) -> Result<String> {
    MarkupSerializer::compact().serialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_text(tag: &str, text: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.new_tag(tag);
        let t = doc.new_text(text);
        doc.append_child(root, t).unwrap();
        doc.push_root(root).unwrap();
        doc
    }

    #[test]
    fn test_default_preserves_whitespace() {
        let doc = doc_with_text("div", "  a \n b  ");
        assert_eq!(serialize(&doc).unwrap(), "<div>  a \n b  </div>");
    }

    #[test]
    fn test_compact_collapses_text_runs() {
        let doc = doc_with_text("div", "a  b\n\r  c");
        assert_eq!(serialize_compact(&doc).unwrap(), "<div>a b c</div>");

        // An all-whitespace text node collapses to nothing, but the tag
        // still has a child and so does not self-close.
        let doc = doc_with_text("div", " \n\t\r ");
        assert_eq!(serialize_compact(&doc).unwrap(), "<div></div>");
    }

    #[test]
    fn test_compact_trims_edge_runs() {
        assert_eq!(
            serialize_compact(&doc_with_text("p", "abc ")).unwrap(),
            "<p>abc</p>"
        );
        assert_eq!(
            serialize_compact(&doc_with_text("p", " abc")).unwrap(),
            "<p>abc</p>"
        );
        assert_eq!(
            serialize_compact(&doc_with_text("p", "a\t bc")).unwrap(),
            "<p>a bc</p>"
        );
    }

    #[test]
    fn test_compact_spares_special_tags() {
        for name in ["script", "STYLE", "TextArea", "pre"] {
            let doc = doc_with_text(name, "  keep \n this  ");
            let out = serialize_compact(&doc).unwrap();
            assert_eq!(out, format!("<{name}>  keep \n this  </{name}>"));
        }
    }

    #[test]
    fn test_special_exemption_covers_nested_subtrees() {
        let mut doc = Document::new();
        let pre = doc.new_tag("pre");
        let b = doc.new_tag("b");
        let head = doc.new_text(" lead ");
        let inner = doc.new_text("  x  ");
        doc.append_child(pre, head).unwrap();
        doc.append_child(pre, b).unwrap();
        doc.append_child(b, inner).unwrap();
        doc.push_root(pre).unwrap();

        assert_eq!(
            serialize_compact(&doc).unwrap(),
            "<pre> lead <b>  x  </b></pre>"
        );
    }

    #[test]
    fn test_default_escapes_script_text_compact_does_not() {
        let doc = doc_with_text("script", "if (a < b && c > d) {}");
        assert_eq!(
            serialize(&doc).unwrap(),
            "<script>if (a &lt; b &amp;&amp; c &gt; d) {}</script>"
        );
        assert_eq!(
            serialize_compact(&doc).unwrap(),
            "<script>if (a < b && c > d) {}</script>"
        );
    }

    #[test]
    fn test_doctype_verbatim_or_absent() {
        let mut doc = doc_with_text("html", "x");
        assert_eq!(serialize(&doc).unwrap(), "<html>x</html>");

        doc.set_doctype(Some("<!DOCTYPE html>".to_string()));
        assert_eq!(serialize(&doc).unwrap(), "<!DOCTYPE html><html>x</html>");
        assert_eq!(
            serialize_compact(&doc).unwrap(),
            "<!DOCTYPE html><html>x</html>"
        );
    }

    #[test]
    fn test_comments_verbatim_under_both_policies() {
        let doc = doc_with_text("div", "<!--  spaced <out>  -->");
        assert_eq!(
            serialize(&doc).unwrap(),
            "<div><!--  spaced <out>  --></div>"
        );
        assert_eq!(
            serialize_compact(&doc).unwrap(),
            "<div><!--  spaced <out>  --></div>"
        );
    }

    #[test]
    fn test_osdata_normalizes_to_script_container() {
        let mut doc = Document::new();
        let osdata = doc.new_tag("osdata");
        doc.set_attribute(osdata, "xmlns:foo", Some("#foo")).unwrap();
        doc.push_root(osdata).unwrap();

        let expected = "<script type=\"text/os-data\" xmlns:foo=\"#foo\"></script>";
        assert_eq!(serialize(&doc).unwrap(), expected);
        assert_eq!(serialize_compact(&doc).unwrap(), expected);
        // The stored tree is untouched by serialization.
        assert_eq!(doc.tag_name(osdata).unwrap(), "osdata");
    }

    #[test]
    fn test_osdata_type_attribute_is_superseded() {
        let mut doc = Document::new();
        let osdata = doc.new_tag("osdata");
        doc.set_attribute(osdata, "type", Some("legacy")).unwrap();
        doc.set_attribute(osdata, "data-x", Some("1")).unwrap();
        let payload = doc.new_text("  {\"a\": 1}  ");
        doc.append_child(osdata, payload).unwrap();
        doc.push_root(osdata).unwrap();

        assert_eq!(
            serialize(&doc).unwrap(),
            "<script type=\"text/os-data\" data-x=\"1\">  {&quot;a&quot;: 1}  </script>"
        );
        // The emitted container counts as a script for the compact policy.
        assert_eq!(
            serialize_compact(&doc).unwrap(),
            "<script type=\"text/os-data\" data-x=\"1\">  {\"a\": 1}  </script>"
        );
    }

    #[test]
    fn test_osdata_normalization_ignores_letter_case() {
        let mut doc = Document::new();
        let osdata = doc.new_tag("OSDATA");
        doc.set_attribute(osdata, "TYPE", Some("legacy")).unwrap();
        doc.set_attribute(osdata, "id", Some("d1")).unwrap();
        doc.push_root(osdata).unwrap();

        // The authored TYPE is superseded, not emitted alongside.
        let expected = "<script type=\"text/os-data\" id=\"d1\"></script>";
        assert_eq!(serialize(&doc).unwrap(), expected);
        assert_eq!(serialize_compact(&doc).unwrap(), expected);
    }

    #[test]
    fn test_href_ampersands_are_escaped() {
        let mut doc = Document::new();
        let a = doc.new_tag("a");
        doc.set_attribute(a, "href", Some("/x?a=1&b=2")).unwrap();
        let text = doc.new_text("link");
        doc.append_child(a, text).unwrap();
        doc.push_root(a).unwrap();

        assert_eq!(
            serialize(&doc).unwrap(),
            "<a href=\"/x?a=1&amp;b=2\">link</a>"
        );
    }

    #[test]
    fn test_forest_roots_serialize_in_order() {
        let mut doc = Document::new();
        let h1 = doc.new_tag("h1");
        let gap = doc.new_text("\n");
        let p = doc.new_tag("p");
        doc.push_root(h1).unwrap();
        doc.push_root(gap).unwrap();
        doc.push_root(p).unwrap();

        assert_eq!(serialize(&doc).unwrap(), "<h1/>\n<p/>");
        assert_eq!(serialize_compact(&doc).unwrap(), "<h1/><p/>");
    }
}
