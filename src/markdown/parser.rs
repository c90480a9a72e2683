//! Markdown parser implementation using comrak
//!
//! This module wraps comrak's parsing functions and converts its arena-bound
//! AST into the owned [`Doc`] model, so several source files can be parsed
//! into one document and handed to a generator.

use comrak::{
    nodes::{
        AstNode, ListDelimType, ListType as ComrakListType, NodeValue,
        TableAlignment as ComrakTableAlignment,
    },
    parse_document, Arena, Options,
};
use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;

use super::model::{
    Doc, HeadingLevel, ListType, MarkdownNode, MarkdownNodeType, TableAlignment,
};
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Reasons a source document cannot be turned into a [`Doc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The source is not valid UTF-8
    InvalidEncoding { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidEncoding { line } => {
                write!(f, "invalid UTF-8 on line {}", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Parser Interface
// ─────────────────────────────────────────────────────────────────────────────

/// A parser appends the content of a source to a document.
pub trait Parser {
    /// Parse `source` and append its blocks to `doc`.
    ///
    /// Fails with [`Error::Parse`] for malformed input and
    /// [`Error::ParseIo`] when the file cannot be read.
    fn parse(&self, doc: &mut Doc, source: &Path) -> Result<()>;

    /// Parse in-memory text, e.g. an unsaved editor buffer.
    fn parse_str(
        &self,
        doc: &mut Doc,
        text: &str,
        origin: Option<&Path>,
    ) -> std::result::Result<(), ParseError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Markdown Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable superscript (^text^)
    pub superscript: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Enable front matter (YAML/TOML); front matter is dropped from the document
    pub front_matter_delimiter: Option<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            superscript: false,
            footnotes: true,
            front_matter_delimiter: Some("---".to_string()),
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.superscript = self.superscript;
        options.extension.footnotes = self.footnotes;
        options.extension.front_matter_delimiter = self.front_matter_delimiter.clone();

        options
    }
}

/// CommonMark + GFM parser backed by comrak.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    options: MarkdownOptions,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Parser for MarkdownParser {
    fn parse(&self, doc: &mut Doc, source: &Path) -> Result<()> {
        let bytes = fs::read(source).map_err(|e| Error::ParseIo {
            file: source.to_path_buf(),
            source: e,
        })?;

        let text = decode_utf8(&bytes).map_err(|e| Error::Parse {
            file: source.to_path_buf(),
            source: e,
        })?;

        debug!("Parsing {} ({} bytes)", source.display(), bytes.len());
        self.parse_str(doc, text, Some(source))
            .map_err(|e| Error::Parse {
                file: source.to_path_buf(),
                source: e,
            })
    }

    fn parse_str(
        &self,
        doc: &mut Doc,
        text: &str,
        origin: Option<&Path>,
    ) -> std::result::Result<(), ParseError> {
        let arena = Arena::new();
        let comrak_options = self.options.to_comrak_options();
        let root = parse_document(&arena, text, &comrak_options);

        let blocks = root.children().filter_map(convert_node).collect();
        doc.append(origin, blocks);
        Ok(())
    }
}

/// Decode file contents, reporting the line of the first invalid byte.
fn decode_utf8(bytes: &[u8]) -> std::result::Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
        ParseError::InvalidEncoding { line }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a comrak AST node to our MarkdownNode structure.
///
/// Nodes without a counterpart in the model (front matter, description
/// lists, ...) are dropped together with their children.
fn convert_node<'a>(node: &'a AstNode<'a>) -> Option<MarkdownNode> {
    let ast = node.data.borrow();
    let node_type = convert_node_value(&ast.value)?;

    let mut markdown_node = MarkdownNode::new(node_type, ast.sourcepos.start.line);
    markdown_node.children = node.children().filter_map(convert_node).collect();
    Some(markdown_node)
}

/// Convert a comrak NodeValue to our MarkdownNodeType.
fn convert_node_value(value: &NodeValue) -> Option<MarkdownNodeType> {
    let node_type = match value {
        NodeValue::BlockQuote => MarkdownNodeType::BlockQuote,
        NodeValue::List(list) => {
            let list_type = match list.list_type {
                ComrakListType::Bullet => ListType::Bullet,
                ComrakListType::Ordered => ListType::Ordered {
                    start: u32::try_from(list.start).unwrap_or(u32::MAX),
                    delimiter: if list.delimiter == ListDelimType::Period {
                        '.'
                    } else {
                        ')'
                    },
                },
            };
            MarkdownNodeType::List {
                list_type,
                tight: list.tight,
            }
        }
        NodeValue::Item(_) => MarkdownNodeType::Item,
        NodeValue::CodeBlock(code) => MarkdownNodeType::CodeBlock {
            info: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => MarkdownNodeType::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => MarkdownNodeType::Paragraph,
        NodeValue::Heading(heading) => MarkdownNodeType::Heading {
            level: HeadingLevel::from(heading.level),
        },
        NodeValue::ThematicBreak => MarkdownNodeType::ThematicBreak,
        NodeValue::Table(table) => MarkdownNodeType::Table {
            alignments: table
                .alignments
                .iter()
                .map(|a| convert_alignment(*a))
                .collect(),
        },
        NodeValue::TableRow(header) => MarkdownNodeType::TableRow { header: *header },
        NodeValue::TableCell => MarkdownNodeType::TableCell,
        NodeValue::Text(text) => MarkdownNodeType::Text(text.clone()),
        NodeValue::TaskItem(checked) => MarkdownNodeType::TaskItem {
            checked: checked.map(|c| c == 'x' || c == 'X').unwrap_or(false),
        },
        NodeValue::SoftBreak => MarkdownNodeType::SoftBreak,
        NodeValue::LineBreak => MarkdownNodeType::LineBreak,
        NodeValue::Code(code) => MarkdownNodeType::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => MarkdownNodeType::HtmlInline(html.clone()),
        NodeValue::Emph => MarkdownNodeType::Emphasis,
        NodeValue::Strong => MarkdownNodeType::Strong,
        NodeValue::Strikethrough => MarkdownNodeType::Strikethrough,
        NodeValue::Superscript => MarkdownNodeType::Superscript,
        NodeValue::Link(link) => MarkdownNodeType::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => MarkdownNodeType::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        NodeValue::FootnoteReference(ref_data) => {
            MarkdownNodeType::FootnoteReference(ref_data.name.clone())
        }
        NodeValue::FootnoteDefinition(def) => {
            MarkdownNodeType::FootnoteDefinition(def.name.clone())
        }
        _ => return None,
    };

    Some(node_type)
}

fn convert_alignment(align: ComrakTableAlignment) -> TableAlignment {
    match align {
        ComrakTableAlignment::None => TableAlignment::None,
        ComrakTableAlignment::Left => TableAlignment::Left,
        ComrakTableAlignment::Center => TableAlignment::Center,
        ComrakTableAlignment::Right => TableAlignment::Right,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(markdown: &str) -> Doc {
        let mut doc = Doc::new();
        MarkdownParser::new()
            .parse_str(&mut doc, markdown, None)
            .unwrap();
        doc
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let doc = parse("Hello, world!");
        assert_eq!(doc.blocks().len(), 1);
        assert!(matches!(
            doc.blocks()[0].node_type,
            MarkdownNodeType::Paragraph
        ));
        assert_eq!(doc.blocks()[0].text_content(), "Hello, world!");
    }

    #[test]
    fn test_parse_heading_levels() {
        let doc = parse("# One\n\n## Two");
        let headings = doc.headings();
        assert_eq!(headings[0].level, HeadingLevel::H1);
        assert_eq!(headings[1].level, HeadingLevel::H2);
        assert_eq!(headings[1].text, "Two");
    }

    #[test]
    fn test_parse_ordered_list() {
        let doc = parse("3. First\n4. Second");
        let list = &doc.blocks()[0];
        match &list.node_type {
            MarkdownNodeType::List {
                list_type: ListType::Ordered { start, delimiter },
                ..
            } => {
                assert_eq!(*start, 3);
                assert_eq!(*delimiter, '.');
            }
            other => panic!("Expected ordered list, got {:?}", other),
        }
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_parse_ordered_list_large_start() {
        let doc = parse("999999999) Last");
        match &doc.blocks()[0].node_type {
            MarkdownNodeType::List {
                list_type: ListType::Ordered { start, delimiter },
                ..
            } => {
                assert_eq!(*start, 999_999_999);
                assert_eq!(*delimiter, ')');
            }
            other => panic!("Expected ordered list, got {:?}", other),
        }
    }

    #[test]
    fn test_front_matter_is_dropped() {
        let doc = parse("---\ntitle: x\n---\n\n# Body");
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.headings()[0].text, "Body");
    }

    #[test]
    fn test_table_alignment_converted() {
        let doc = parse("| a | b |\n|:--|--:|\n| 1 | 2 |");
        match &doc.blocks()[0].node_type {
            MarkdownNodeType::Table { alignments } => {
                assert_eq!(alignments, &[TableAlignment::Left, TableAlignment::Right]);
            }
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_files_accumulate() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "# A").unwrap();
        fs::write(&b, "# B").unwrap();

        let parser = MarkdownParser::new();
        let mut doc = Doc::new();
        parser.parse(&mut doc, &a).unwrap();
        parser.parse(&mut doc, &b).unwrap();

        assert_eq!(doc.sources(), &[a, b]);
        assert_eq!(doc.headings().len(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.md");
        fs::write(&bad, b"line one\nline \xff two").unwrap();

        let mut doc = Doc::new();
        let err = MarkdownParser::new().parse(&mut doc, &bad).unwrap_err();
        match err {
            Error::Parse { file, source } => {
                assert_eq!(file, bad);
                assert_eq!(source, ParseError::InvalidEncoding { line: 2 });
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_parse_io_error() {
        let dir = TempDir::new().unwrap();
        let mut doc = Doc::new();
        let err = MarkdownParser::new()
            .parse(&mut doc, &dir.path().join("nope.md"))
            .unwrap_err();
        assert!(matches!(err, Error::ParseIo { .. }));
    }
}
