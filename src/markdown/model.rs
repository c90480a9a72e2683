//! Owned document model produced by the parser and consumed by generators.

use std::path::{Path, PathBuf};

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        match level {
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            _ => HeadingLevel::H6,
        }
    }
}

impl HeadingLevel {
    /// Numeric level, 1 for `H1`.
    pub fn depth(self) -> usize {
        self as usize
    }
}

/// List type (ordered or unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered { start: u32, delimiter: char },
}

/// Table cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Represents the type of a markdown node.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNodeType {
    /// Block quote (>)
    BlockQuote,
    /// List container
    List { list_type: ListType, tight: bool },
    /// List item
    Item,
    /// Fenced or indented code block
    CodeBlock { info: String, literal: String },
    /// HTML block
    HtmlBlock(String),
    /// Paragraph
    Paragraph,
    /// Heading (H1-H6)
    Heading { level: HeadingLevel },
    /// Thematic break (horizontal rule)
    ThematicBreak,
    /// Table
    Table { alignments: Vec<TableAlignment> },
    /// Table row
    TableRow { header: bool },
    /// Table cell
    TableCell,
    /// Inline text content
    Text(String),
    /// Task list marker
    TaskItem { checked: bool },
    /// Soft line break
    SoftBreak,
    /// Hard line break
    LineBreak,
    /// Inline code
    Code(String),
    /// Inline HTML
    HtmlInline(String),
    /// Emphasis (italic)
    Emphasis,
    /// Strong emphasis (bold)
    Strong,
    /// Strikethrough
    Strikethrough,
    /// Superscript
    Superscript,
    /// Link
    Link { url: String, title: String },
    /// Image
    Image { url: String, title: String },
    /// Footnote reference
    FootnoteReference(String),
    /// Footnote definition
    FootnoteDefinition(String),
}

/// A node in the document tree with its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownNode {
    /// The type of this node
    pub node_type: MarkdownNodeType,
    /// Child nodes
    pub children: Vec<MarkdownNode>,
    /// Start line in source (1-indexed)
    pub start_line: usize,
}

impl MarkdownNode {
    pub fn new(node_type: MarkdownNodeType, start_line: usize) -> Self {
        Self {
            node_type,
            children: Vec::new(),
            start_line,
        }
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.node_type {
            MarkdownNodeType::Text(t) => output.push_str(t),
            MarkdownNodeType::Code(t) => output.push_str(t),
            MarkdownNodeType::SoftBreak => output.push(' '),
            MarkdownNodeType::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }
}

/// A heading collected from the document, used for tables of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

/// The parsed document.
///
/// Every call to a parser appends the top-level blocks of one source to
/// `blocks`, so a whole batch of files ends up as a single document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doc {
    blocks: Vec<MarkdownNode>,
    sources: Vec<PathBuf>,
}

impl Doc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the blocks parsed from one source.
    pub fn append(&mut self, source: Option<&Path>, blocks: Vec<MarkdownNode>) {
        if let Some(path) = source {
            self.sources.push(path.to_path_buf());
        }
        self.blocks.extend(blocks);
    }

    pub fn blocks(&self) -> &[MarkdownNode] {
        &self.blocks
    }

    /// Files that contributed to this document, in parse order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All headings in document order.
    pub fn headings(&self) -> Vec<Heading> {
        self.blocks
            .iter()
            .filter_map(|node| match node.node_type {
                MarkdownNodeType::Heading { level } => Some(Heading {
                    level,
                    text: node.text_content(),
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> MarkdownNode {
        let mut node = MarkdownNode::new(
            MarkdownNodeType::Heading {
                level: HeadingLevel::from(level),
            },
            1,
        );
        node.children
            .push(MarkdownNode::new(MarkdownNodeType::Text(text.to_string()), 1));
        node
    }

    #[test]
    fn test_heading_level_from_out_of_range() {
        assert_eq!(HeadingLevel::from(9), HeadingLevel::H6);
        assert_eq!(HeadingLevel::from(2).depth(), 2);
    }

    #[test]
    fn test_append_accumulates_blocks_and_sources() {
        let mut doc = Doc::new();
        assert!(doc.is_empty());

        doc.append(Some(Path::new("a.md")), vec![heading(1, "A")]);
        doc.append(None, vec![heading(2, "B")]);

        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.sources(), &[PathBuf::from("a.md")]);
    }

    #[test]
    fn test_headings_in_order() {
        let mut doc = Doc::new();
        doc.append(None, vec![heading(1, "Intro"), heading(2, "Details")]);

        let headings = doc.headings();
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].text, "Intro");
        assert_eq!(headings[1].level, HeadingLevel::H2);
    }
}
