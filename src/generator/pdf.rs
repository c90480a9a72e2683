//! PDF Export Generation
//!
//! Renders a [`Doc`] to PDF with lopdf. The document is laid out in three
//! parts: an optional title page, an optional table of contents and the
//! content itself. Content is laid out first so the table of contents can
//! show page numbers.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

use super::layout::{win_ansi, Font, PageBuilder, PageOp, Run};
use super::options::{PageSize, PdfGeneratorOptions};
use super::{report, GenerateError, Generator, Progress};
use crate::markdown::{Doc, HeadingLevel, ListType, MarkdownNode, MarkdownNodeType};

const BODY_SIZE: f32 = 11.0;
const CODE_SIZE: f32 = 9.0;
const FOOTNOTE_SIZE: f32 = 9.0;
const INDENT_STEP: f32 = 18.0;

/// Generates PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfGenerator;

impl Generator for PdfGenerator {
    type Options = PdfGeneratorOptions;

    fn name(&self) -> &'static str {
        "pdf"
    }

    fn generate(
        &self,
        doc: &Doc,
        options: &PdfGeneratorOptions,
        mut progress: Progress<'_>,
        out: &mut dyn Write,
    ) -> Result<(), GenerateError> {
        let page_size: PageSize =
            options
                .page_size
                .parse()
                .map_err(|message| GenerateError::InvalidOption {
                    option: "pageSize".to_string(),
                    message,
                })?;

        report(&mut progress, "Laying out content");
        let content = layout_content(doc, options, page_size);

        let mut pages = Vec::new();
        if options.generate_title_page {
            report(&mut progress, "Creating title page");
            pages.extend(layout_title_page(options, page_size));
        }

        if options.generate_toc {
            report(&mut progress, "Creating table of contents");
            // The TOC length does not depend on the page numbers it shows.
            let toc_len = layout_toc(&content.headings, page_size, 0).len();
            let offset = pages.len() + toc_len;
            pages.extend(layout_toc(&content.headings, page_size, offset));
        }

        let numbered_from = pages.len();
        pages.extend(content.pages);

        report(&mut progress, "Writing PDF");
        let bytes = write_pdf(&pages, numbered_from, page_size, options)?;
        out.write_all(&bytes)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content Layout
// ─────────────────────────────────────────────────────────────────────────────

/// A heading as placed in the content, for the table of contents.
#[derive(Debug, Clone, PartialEq)]
struct PlacedHeading {
    level: HeadingLevel,
    label: String,
    content_page: usize,
}

struct LaidOutContent {
    pages: Vec<Vec<PageOp>>,
    headings: Vec<PlacedHeading>,
}

struct ContentWriter<'a> {
    options: &'a PdfGeneratorOptions,
    builder: PageBuilder,
    section_numbers: [usize; 6],
    headings: Vec<PlacedHeading>,
}

fn layout_content(doc: &Doc, options: &PdfGeneratorOptions, page_size: PageSize) -> LaidOutContent {
    let mut writer = ContentWriter {
        options,
        builder: PageBuilder::new(page_size),
        section_numbers: [0; 6],
        headings: Vec::new(),
    };

    for block in doc.blocks() {
        writer.block(block, 0.0);
    }

    LaidOutContent {
        pages: writer.builder.finish(),
        headings: writer.headings,
    }
}

impl ContentWriter<'_> {
    fn block(&mut self, node: &MarkdownNode, indent: f32) {
        match &node.node_type {
            MarkdownNodeType::Heading { level } => self.heading(node, *level),
            MarkdownNodeType::Paragraph => {
                let runs = self.inline_runs(node);
                self.builder.paragraph(&runs, BODY_SIZE, indent, None);
                self.builder.gap(BODY_SIZE * 0.6);
            }
            MarkdownNodeType::List { list_type, .. } => {
                self.list(node, *list_type, indent);
                self.builder.gap(BODY_SIZE * 0.4);
            }
            MarkdownNodeType::CodeBlock { literal, .. } => {
                self.builder.preformatted(literal, CODE_SIZE, indent + 12.0);
                self.builder.gap(BODY_SIZE * 0.6);
            }
            MarkdownNodeType::BlockQuote => {
                for child in &node.children {
                    self.block(child, indent + INDENT_STEP);
                }
            }
            MarkdownNodeType::ThematicBreak => self.builder.rule(),
            MarkdownNodeType::Table { .. } => self.table(node, indent),
            MarkdownNodeType::FootnoteDefinition(name) => {
                let mut runs = vec![Run::new(Font::Regular, format!("[{}] ", name))];
                for child in &node.children {
                    runs.extend(self.inline_runs(child));
                }
                self.builder.paragraph(&runs, FOOTNOTE_SIZE, indent, None);
            }
            // Raw HTML has no PDF representation.
            MarkdownNodeType::HtmlBlock(_) => {}
            _ => {
                let runs = self.inline_runs(node);
                self.builder.paragraph(&runs, BODY_SIZE, indent, None);
            }
        }
    }

    fn heading(&mut self, node: &MarkdownNode, level: HeadingLevel) {
        let size = match level {
            HeadingLevel::H1 => 20.0,
            HeadingLevel::H2 => 16.0,
            HeadingLevel::H3 => 14.0,
            HeadingLevel::H4 => 12.0,
            HeadingLevel::H5 => 11.0,
            HeadingLevel::H6 => 10.0,
        };

        let text = node.text_content();
        let label = if self.options.generate_section_numbers {
            format!("{} {}", self.next_section_number(level), text)
        } else {
            text
        };

        // Keep a heading together with at least two lines of what follows.
        self.builder.ensure_space(size * 1.35 + BODY_SIZE * 3.0);
        self.builder.gap(size * 0.6);
        self.headings.push(PlacedHeading {
            level,
            label: label.clone(),
            content_page: self.builder.page_index(),
        });
        self.builder
            .paragraph(&[Run::new(Font::Bold, label)], size, 0.0, None);
        self.builder.gap(size * 0.4);
    }

    fn next_section_number(&mut self, level: HeadingLevel) -> String {
        let depth = level.depth();
        self.section_numbers[depth - 1] += 1;
        for deeper in self.section_numbers.iter_mut().skip(depth) {
            *deeper = 0;
        }
        self.section_numbers[..depth]
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    fn list(&mut self, node: &MarkdownNode, list_type: ListType, indent: f32) {
        let item_indent = indent + INDENT_STEP;
        for (position, item) in node.children.iter().enumerate() {
            let marker = match (&item.node_type, list_type) {
                (MarkdownNodeType::TaskItem { checked: true }, _) => "[x] ".to_string(),
                (MarkdownNodeType::TaskItem { checked: false }, _) => "[ ] ".to_string(),
                (_, ListType::Bullet) => "• ".to_string(),
                (_, ListType::Ordered { start, delimiter }) => {
                    format!("{}{} ", start as usize + position, delimiter)
                }
            };
            let marker = Run::new(Font::Regular, marker);

            let mut first = true;
            for child in &item.children {
                match &child.node_type {
                    MarkdownNodeType::Paragraph => {
                        let runs = self.inline_runs(child);
                        let hanging = if first { Some(&marker) } else { None };
                        self.builder
                            .paragraph(&runs, BODY_SIZE, item_indent, hanging);
                    }
                    MarkdownNodeType::List { list_type, .. } => {
                        self.list(child, *list_type, item_indent);
                    }
                    _ => self.block(child, item_indent),
                }
                first = false;
            }
            if first {
                self.builder.paragraph(&[], BODY_SIZE, item_indent, Some(&marker));
            }
        }
    }

    fn table(&mut self, node: &MarkdownNode, indent: f32) {
        for row in &node.children {
            let header = matches!(row.node_type, MarkdownNodeType::TableRow { header: true });
            let font = if header { Font::Bold } else { Font::Regular };
            let cells: Vec<String> = row.children.iter().map(|c| c.text_content()).collect();
            let runs = vec![Run::new(font, cells.join("  |  "))];
            self.builder.paragraph(&runs, BODY_SIZE, indent, None);
            if header {
                self.builder.rule();
            }
        }
        self.builder.gap(BODY_SIZE * 0.6);
    }

    fn inline_runs(&self, node: &MarkdownNode) -> Vec<Run> {
        let mut runs = Vec::new();
        for child in &node.children {
            self.collect_inline(child, Font::Regular, &mut runs);
        }
        runs
    }

    fn collect_inline(&self, node: &MarkdownNode, font: Font, runs: &mut Vec<Run>) {
        match &node.node_type {
            MarkdownNodeType::Text(text) => runs.push(Run::new(font, text.clone())),
            MarkdownNodeType::Code(code) => runs.push(Run::new(Font::Mono, code.clone())),
            MarkdownNodeType::SoftBreak => runs.push(Run::new(font, " ")),
            MarkdownNodeType::LineBreak => runs.push(Run::line_break()),
            MarkdownNodeType::Strong => self.collect_children(node, Font::Bold, runs),
            MarkdownNodeType::Emphasis => self.collect_children(node, Font::Italic, runs),
            MarkdownNodeType::Link { url, .. } => {
                self.collect_children(node, font, runs);
                if !self.options.hide_links && !url.is_empty() {
                    runs.push(Run::new(font, format!(" ({})", url)));
                }
            }
            MarkdownNodeType::Image { url, title } => {
                let label = if title.is_empty() { url } else { title };
                runs.push(Run::new(Font::Italic, format!("[image: {}]", label)));
            }
            MarkdownNodeType::FootnoteReference(name) => {
                runs.push(Run::new(font, format!("[{}]", name)));
            }
            MarkdownNodeType::HtmlInline(_) => {}
            _ => self.collect_children(node, font, runs),
        }
    }

    fn collect_children(&self, node: &MarkdownNode, font: Font, runs: &mut Vec<Run>) {
        for child in &node.children {
            self.collect_inline(child, font, runs);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Title Page and Table of Contents
// ─────────────────────────────────────────────────────────────────────────────

fn layout_title_page(options: &PdfGeneratorOptions, page_size: PageSize) -> Vec<Vec<PageOp>> {
    let mut builder = PageBuilder::new(page_size);
    builder.move_to(builder.height() * 0.7);

    if !options.title.is_empty() {
        builder.centered(&options.title, Font::Bold, 26.0);
    }
    if !options.subject.is_empty() {
        builder.gap(8.0);
        builder.centered(&options.subject, Font::Regular, 14.0);
    }
    if !options.version.is_empty() {
        builder.gap(8.0);
        builder.centered(&format!("Version: {}", options.version), Font::Regular, 12.0);
    }
    if !options.author.is_empty() {
        builder.gap(24.0);
        builder.centered(&format!("Author: {}", options.author), Font::Italic, 12.0);
    }
    if !options.copyright.is_empty() {
        builder.move_to(PageBuilder::MARGIN + 24.0);
        builder.centered(&options.copyright, Font::Regular, 10.0);
    }

    builder.finish()
}

fn layout_toc(headings: &[PlacedHeading], page_size: PageSize, offset: usize) -> Vec<Vec<PageOp>> {
    let mut builder = PageBuilder::new(page_size);
    builder.paragraph(
        &[Run::new(Font::Bold, "Table of Contents")],
        18.0,
        0.0,
        None,
    );
    builder.gap(12.0);

    for heading in headings.iter().filter(|h| h.level <= HeadingLevel::H3) {
        let indent = (heading.level.depth() - 1) as f32 * INDENT_STEP;
        let font = if heading.level == HeadingLevel::H1 {
            Font::Bold
        } else {
            Font::Regular
        };
        let page = (offset + heading.content_page + 1).to_string();
        builder.justified_pair(&heading.label, &page, font, BODY_SIZE, indent);
    }

    builder.finish()
}

// ─────────────────────────────────────────────────────────────────────────────
// PDF Assembly
// ─────────────────────────────────────────────────────────────────────────────

fn render_error(context: &str, err: impl std::fmt::Display) -> GenerateError {
    GenerateError::Render(format!("{}: {}", context, err))
}

fn pdf_string(text: &str) -> Object {
    Object::string_literal(win_ansi(text))
}

fn page_operations(ops: &[PageOp]) -> Vec<Operation> {
    let mut operations = Vec::new();
    for op in ops {
        match op {
            PageOp::Text {
                font,
                size,
                x,
                y,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), (size.round() as i64).into()],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![(x.round() as i64).into(), (y.round() as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![pdf_string(text)]));
                operations.push(Operation::new("ET", vec![]));
            }
            PageOp::Rule { x1, x2, y } => {
                operations.push(Operation::new("w", vec![1.into()]));
                operations.push(Operation::new(
                    "m",
                    vec![(x1.round() as i64).into(), (y.round() as i64).into()],
                ));
                operations.push(Operation::new(
                    "l",
                    vec![(x2.round() as i64).into(), (y.round() as i64).into()],
                ));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }
    operations
}

/// Footer with the page number, centered at the bottom margin.
fn footer_operations(number: usize, page_size: PageSize) -> Vec<Operation> {
    let (width, _) = page_size.dimensions();
    let text = number.to_string();
    let x = (width - Font::Regular.measure(&text, 9.0)) / 2.0;
    page_operations(&[PageOp::Text {
        font: Font::Regular,
        size: 9.0,
        x,
        y: PageBuilder::MARGIN / 2.0,
        text,
    }])
}

fn write_pdf(
    pages: &[Vec<PageOp>],
    numbered_from: usize,
    page_size: PageSize,
    options: &PdfGeneratorOptions,
) -> Result<Vec<u8>, GenerateError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::all() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (index, ops) in pages.iter().enumerate() {
        let mut operations = page_operations(ops);
        if index >= numbered_from {
            operations.extend(footer_operations(index - numbered_from + 1, page_size));
        }
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| render_error("failed to encode page content", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let (width, height) = page_size.dimensions();
    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (width.round() as i64).into(),
            (height.round() as i64).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => pdf_string(&options.title),
        "Author" => pdf_string(&options.author),
        "Subject" => pdf_string(&options.subject),
        "Keywords" => pdf_string(&options.keywords),
        "Creator" => pdf_string(concat!("mddoc ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| render_error("failed to serialize PDF", e))?;
    Ok(buffer)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownParser, Parser};

    fn parse(markdown: &str) -> Doc {
        let mut doc = Doc::new();
        MarkdownParser::new()
            .parse_str(&mut doc, markdown, None)
            .unwrap();
        doc
    }

    fn render(doc: &Doc, options: &PdfGeneratorOptions) -> Result<Vec<u8>, GenerateError> {
        let mut out = Vec::new();
        PdfGenerator.generate(doc, options, None, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_generate_produces_pdf() {
        let doc = parse("# Title\n\nSome *text* with `code`.\n\n- a\n- b\n");
        let bytes = render(&doc, &PdfGeneratorOptions::default()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_title_page_and_toc_add_pages() {
        let doc = parse("# One\n\ntext\n\n# Two\n\nmore");
        let options = PdfGeneratorOptions {
            title: "Manual".to_string(),
            generate_title_page: true,
            generate_toc: true,
            ..Default::default()
        };
        let bytes = render(&doc, &options).unwrap();
        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 3);
    }

    #[test]
    fn test_unknown_page_size_is_invalid_option() {
        let options = PdfGeneratorOptions {
            page_size: "B9".to_string(),
            ..Default::default()
        };
        match render(&Doc::new(), &options) {
            Err(GenerateError::InvalidOption { option, .. }) => assert_eq!(option, "pageSize"),
            other => panic!("Expected invalid option, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_section_numbers() {
        let doc = parse("# A\n\n## B\n\n## C\n\n# D\n\n### E");
        let options = PdfGeneratorOptions::default();
        let content = layout_content(&doc, &options, PageSize::A4);
        let labels: Vec<&str> = content.headings.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["1 A", "1.1 B", "1.2 C", "2 D", "2.0.1 E"]);
    }

    #[test]
    fn test_section_numbers_disabled() {
        let doc = parse("# A");
        let options = PdfGeneratorOptions {
            generate_section_numbers: false,
            ..Default::default()
        };
        let content = layout_content(&doc, &options, PageSize::A4);
        assert_eq!(content.headings[0].label, "A");
    }

    #[test]
    fn test_toc_page_numbers_account_for_prefix_pages() {
        let headings = vec![PlacedHeading {
            level: HeadingLevel::H1,
            label: "Intro".to_string(),
            content_page: 0,
        }];
        let pages = layout_toc(&headings, PageSize::A4, 2);
        let has_page_three = pages[0]
            .iter()
            .any(|op| matches!(op, PageOp::Text { text, .. } if text == "3"));
        assert!(has_page_three);
    }

    #[test]
    fn test_progress_reported() {
        let mut messages = Vec::new();
        let mut record = |m: &str| messages.push(m.to_string());
        let mut out = Vec::new();
        PdfGenerator
            .generate(
                &parse("text"),
                &PdfGeneratorOptions::default(),
                Some(&mut record),
                &mut out,
            )
            .unwrap();
        assert!(messages.iter().any(|m| m == "Writing PDF"));
    }
}
