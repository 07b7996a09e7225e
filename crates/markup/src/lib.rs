//! Canonical Markup Tree Library
//!
//! A mutable, parser-backend-independent HTML parse tree with arena
//! storage, plus the machinery around it: a capability interface for
//! feeding it from any parser's output, two re-serialization policies,
//! and a versioned binary codec for caching parsed trees.
//!
//! ## Core Design
//!
//! ```text
//! backend output → ParsedNode (borrowed) → Document (owned) → markup text
//!                                              ↓↑
//!                                        binary blob (cache)
//! ```
//!
//! Nodes are a tagged union of text and tag payloads, addressed by `u32`
//! handles into the owning `Document`; parent links are plain back-indices,
//! so ownership flows strictly parent to children.

pub mod backend;
pub mod codec;
pub mod error;
pub mod serializer;
pub mod traverse;
pub mod tree;
pub mod types;
pub mod utils;

pub use backend::{JsonNode, ParsedNode};
pub use error::{MarkupError, Result};
pub use serializer::{MarkupSerializer, WhitespacePolicy, serialize, serialize_compact};
pub use tree::Document;
pub use types::*;
