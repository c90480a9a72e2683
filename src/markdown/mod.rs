//! Markdown parsing into the document model
//!
//! This module provides the [`Parser`] interface and its comrak based
//! implementation, a CommonMark + GFM compatible parser. Parsed sources are
//! converted into the owned [`Doc`] model that generators render.
//!
//! # Example
//! ```ignore
//! use crate::markdown::{Doc, MarkdownParser, Parser};
//!
//! let mut doc = Doc::new();
//! let parser = MarkdownParser::new();
//! parser.parse(&mut doc, Path::new("docs/intro.md"))?;
//! parser.parse(&mut doc, Path::new("docs/usage.md"))?;
//! assert!(!doc.headings().is_empty());
//! ```

mod model;
mod parser;

pub use model::{
    Doc, HeadingLevel, ListType, MarkdownNode, MarkdownNodeType, TableAlignment,
};
pub use parser::{MarkdownParser, ParseError, Parser};
