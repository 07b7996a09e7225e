//! Text transforms shared by rendering and serialization

use crate::error::Result;
use crate::tree::Document;
use crate::types::{NodeId, NodeKind};

/// Entity-escape markup-significant characters into `out`.
pub fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        escape_char_into(c, out);
    }
}

/// Escape a single character. `&` `<` `>` `"` become entities, everything
/// else passes through.
pub fn escape_char_into(c: char, out: &mut String) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        c => out.push(c),
    }
}

fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Escape like `escape_into` while collapsing whitespace runs.
///
/// A run of space/tab/CR/LF produces a single space, and only when it sits
/// between non-whitespace characters: a leading run produces nothing, a
/// trailing run produces nothing, and all-whitespace input produces the
/// empty string.
pub fn collapse_into(text: &str, out: &mut String) {
    let mut pending_space = false;
    let mut emitted = false;
    for c in text.chars() {
        if is_collapsible(c) {
            pending_space = true;
        } else {
            if pending_space && emitted {
                out.push(' ');
            }
            pending_space = false;
            escape_char_into(c, out);
            emitted = true;
        }
    }
}

/// Concatenated text of the node and its whole subtree, trimmed.
/// Comment text (leading `<!--`) is not content and is skipped.
pub fn text_content(doc: &Document, id: NodeId) -> Result<String> {
    let mut text = String::new();
    doc.traverse_df(id, |_, kind| {
        if let NodeKind::Text(t) = kind {
            if !t.starts_with("<!--") {
                text.push_str(t);
            }
        }
        Ok(())
    })?;
    Ok(text.trim().to_string())
}
