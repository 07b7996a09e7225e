//! Style rule model: selectors and declarations
//!
//! Like the markup tree, a rule is built from a read-only capability
//! exposed by whichever CSS parser produced it, then mutated in place.
//! Selectors form an ordered, duplicate-free list of trimmed strings;
//! declarations are an ordered name-to-value map where the last write to
//! a name wins.

use indexmap::IndexMap;

/// Ordered declaration storage, name to value, keys unique.
pub type DeclarationMap = IndexMap<String, String, ahash::RandomState>;

/// The read-only view a CSS parser backend exposes for one parsed rule.
pub trait ParsedCssRule {
    /// Selector strings in source order, possibly untrimmed.
    fn selectors(&self) -> impl Iterator<Item = &str>;

    /// Declaration name/value pairs in source order.
    fn declarations(&self) -> impl Iterator<Item = (&str, &str)>;
}

// A single rule: "div, .box { color: red; }"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssRule {
    selectors: Vec<String>,
    declarations: DeclarationMap,
}

impl CssRule {
    /// An empty rule, to be filled through the mutation methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy selectors and declarations, trimmed, out of a parser
    /// capability. Duplicate selectors collapse to their first
    /// occurrence; duplicate declaration names keep the last value.
    pub fn from_parsed<R: ParsedCssRule>(parsed: &R) -> Self {
        let mut rule = Self::new();
        for selector in parsed.selectors() {
            rule.add_selector(selector, None);
        }
        for (name, value) in parsed.declarations() {
            rule.set_declaration(name, value);
        }
        rule
    }

    /// The ordered selector list.
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Exact match of `selector` against the stored (trimmed) values.
    pub fn has_selector(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    /// Add a selector, trimmed. Returns `false` without mutating when the
    /// trimmed selector is already present (or trims to nothing).
    /// Inserted immediately before the entry exactly matching `before`
    /// when one is found, otherwise appended.
    pub fn add_selector(&mut self, selector: &str, before: Option<&str>) -> bool {
        let selector = selector.trim();
        if selector.is_empty() || self.has_selector(selector) {
            return false;
        }
        match before.and_then(|b| self.selectors.iter().position(|s| s == b)) {
            Some(pos) => self.selectors.insert(pos, selector.to_string()),
            None => self.selectors.push(selector.to_string()),
        }
        true
    }

    /// Remove a selector by exact match; returns whether one was removed.
    pub fn remove_selector(&mut self, selector: &str) -> bool {
        match self.selectors.iter().position(|s| s == selector) {
            Some(pos) => {
                self.selectors.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Create or overwrite a declaration. An overwritten name keeps its
    /// position in the order.
    pub fn set_declaration(&mut self, name: &str, value: &str) {
        self.declarations
            .insert(name.trim().to_string(), value.trim().to_string());
    }

    pub fn declaration_value(&self, name: &str) -> Option<&str> {
        self.declarations.get(name).map(String::as_str)
    }

    /// Declaration names in insertion order.
    pub fn declaration_names(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    /// Remove a declaration by name; returns whether it was present.
    pub fn remove_declaration(&mut self, name: &str) -> bool {
        self.declarations.shift_remove(name).is_some()
    }
}
