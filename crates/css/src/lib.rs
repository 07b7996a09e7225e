pub mod rule;

// Re-exports so other crates can just use `css::...` nicely.
pub use rule::{CssRule, DeclarationMap, ParsedCssRule};
