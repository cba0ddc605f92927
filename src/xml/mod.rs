//! In-memory XML trees
//!
//! A small arena tree with parent links, read with `quick-xml` and
//! written back with a plain serializer. Only what finding aids need:
//! elements, attributes, text, CDATA, comments, PIs and a doctype.

pub mod navigate;
mod parse;
mod tree;
mod write;

pub use parse::{parse_bytes, parse_str, ParseError};
pub use tree::{Ancestors, Declaration, Descendants, Document, Element, NodeId, NodeKind, TreeError};
pub use write::{node_to_string, to_string};
