//! HTML Export Generation
//!
//! This module renders a [`Doc`] as a complete, standalone HTML document.
//! Styling comes from the built-in stylesheet, a user supplied stylesheet
//! (inlined or linked) or is omitted entirely for primitive HTML.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;

use super::options::HtmlGeneratorOptions;
use super::{report, GenerateError, Generator, Progress};
use crate::markdown::{Doc, ListType, MarkdownNode, MarkdownNodeType, TableAlignment};

/// Generates standalone HTML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlGenerator;

impl Generator for HtmlGenerator {
    type Options = HtmlGeneratorOptions;

    fn name(&self) -> &'static str {
        "html"
    }

    fn generate(
        &self,
        doc: &Doc,
        options: &HtmlGeneratorOptions,
        mut progress: Progress<'_>,
        out: &mut dyn Write,
    ) -> Result<(), GenerateError> {
        report(&mut progress, "Rendering HTML body");
        let mut renderer = BodyRenderer {
            options,
            html: String::new(),
        };
        for block in doc.blocks() {
            renderer.block(block);
        }

        let title = if options.title.is_empty() {
            doc.headings()
                .first()
                .map(|h| h.text.clone())
                .unwrap_or_else(|| "Exported Document".to_string())
        } else {
            options.title.clone()
        };

        report(&mut progress, "Writing HTML document");
        let style = stylesheet(options)?;
        write!(
            out,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="mddoc">
    <title>{title}</title>
{style}</head>
<body>
    <article class="markdown-body">
{body}    </article>
</body>
</html>
"#,
            title = html_escape(&title),
            style = style,
            body = renderer.html,
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ─────────────────────────────────────────────────────────────────────────────

/// Build the `<head>` styling for the options.
fn stylesheet(options: &HtmlGeneratorOptions) -> Result<String, GenerateError> {
    if options.primitive_html {
        return Ok(String::new());
    }

    match &options.css {
        Some(css) if options.inline_css => {
            let contents = fs::read_to_string(css).map_err(|e| GenerateError::InvalidOption {
                option: "css".to_string(),
                message: format!("cannot read '{}': {}", css.display(), e),
            })?;
            Ok(format!("    <style>\n{}\n    </style>\n", contents))
        }
        Some(css) => Ok(format!(
            "    <link rel=\"stylesheet\" href=\"{}\">\n",
            html_escape(&css.to_string_lossy())
        )),
        None => Ok(format!("    <style>{}    </style>\n", BASE_CSS)),
    }
}

/// Base CSS for markdown rendering (layout, typography, colors).
const BASE_CSS: &str = r#"
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    margin: 0;
    padding: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: #1f2328;
    background-color: #ffffff;
}

.markdown-body {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
}

.markdown-body h1,
.markdown-body h2,
.markdown-body h3,
.markdown-body h4,
.markdown-body h5,
.markdown-body h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.markdown-body h1 { font-size: 2em; border-bottom: 1px solid #d1d9e0; padding-bottom: 0.3em; }
.markdown-body h2 { font-size: 1.5em; border-bottom: 1px solid #d1d9e0; padding-bottom: 0.3em; }
.markdown-body h3 { font-size: 1.25em; }
.markdown-body h4 { font-size: 1em; }

.markdown-body p,
.markdown-body ul,
.markdown-body ol,
.markdown-body table,
.markdown-body pre {
    margin-top: 0;
    margin-bottom: 16px;
}

.markdown-body a { color: #0969da; text-decoration: none; }
.markdown-body a:hover { text-decoration: underline; }

.markdown-body ul,
.markdown-body ol { padding-left: 2em; }

.markdown-body li.task-list-item { list-style-type: none; }

.markdown-body blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    color: #59636e;
    border-left: 4px solid #d1d9e0;
}

.markdown-body code {
    font-family: 'JetBrains Mono', 'Fira Code', 'Consolas', 'Monaco', monospace;
    font-size: 0.9em;
    padding: 0.2em 0.4em;
    border-radius: 4px;
    background-color: #eff1f3;
}

.markdown-body pre {
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
    line-height: 1.45;
    background-color: #f6f8fa;
}

.markdown-body pre code { padding: 0; background: transparent; }

.markdown-body table { border-collapse: collapse; width: 100%; }
.markdown-body th,
.markdown-body td { padding: 8px 12px; border: 1px solid #d1d9e0; }
.markdown-body th { font-weight: 600; background-color: #f6f8fa; }

.markdown-body hr { height: 2px; margin: 24px 0; border: none; background-color: #d1d9e0; }
.markdown-body img { max-width: 100%; height: auto; }
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Body Rendering
// ─────────────────────────────────────────────────────────────────────────────

struct BodyRenderer<'a> {
    options: &'a HtmlGeneratorOptions,
    html: String,
}

impl BodyRenderer<'_> {
    fn block(&mut self, node: &MarkdownNode) {
        match &node.node_type {
            MarkdownNodeType::Heading { level } => {
                let depth = level.depth();
                let _ = write!(self.html, "<h{}>", depth);
                self.children_inline(node);
                let _ = writeln!(self.html, "</h{}>", depth);
            }
            MarkdownNodeType::Paragraph => {
                self.html.push_str("<p>");
                self.children_inline(node);
                self.html.push_str("</p>\n");
            }
            MarkdownNodeType::List { list_type, .. } => self.list(node, *list_type),
            MarkdownNodeType::CodeBlock { info, literal } => {
                let language = info.split_whitespace().next().unwrap_or("");
                if language.is_empty() {
                    self.html.push_str("<pre><code>");
                } else {
                    let _ = write!(
                        self.html,
                        "<pre><code class=\"language-{}\">",
                        html_escape(language)
                    );
                }
                self.html.push_str(&html_escape(literal));
                self.html.push_str("</code></pre>\n");
            }
            MarkdownNodeType::HtmlBlock(raw) => self.html.push_str(raw),
            MarkdownNodeType::BlockQuote => {
                self.html.push_str("<blockquote>\n");
                for child in &node.children {
                    self.block(child);
                }
                self.html.push_str("</blockquote>\n");
            }
            MarkdownNodeType::ThematicBreak => self.html.push_str("<hr />\n"),
            MarkdownNodeType::Table { alignments } => self.table(node, alignments),
            MarkdownNodeType::FootnoteDefinition(name) => {
                let _ = writeln!(
                    self.html,
                    "<div class=\"footnote\" id=\"fn-{}\">",
                    html_escape(name)
                );
                for child in &node.children {
                    self.block(child);
                }
                self.html.push_str("</div>\n");
            }
            _ => {
                self.children_inline(node);
                self.html.push('\n');
            }
        }
    }

    fn list(&mut self, node: &MarkdownNode, list_type: ListType) {
        let close = match list_type {
            ListType::Bullet => {
                self.html.push_str("<ul>\n");
                "</ul>\n"
            }
            ListType::Ordered { start: 1, .. } => {
                self.html.push_str("<ol>\n");
                "</ol>\n"
            }
            ListType::Ordered { start, .. } => {
                let _ = writeln!(self.html, "<ol start=\"{}\">", start);
                "</ol>\n"
            }
        };

        for item in &node.children {
            match item.node_type {
                MarkdownNodeType::TaskItem { checked } => {
                    self.html.push_str("<li class=\"task-list-item\">");
                    self.html.push_str(if checked {
                        "<input type=\"checkbox\" disabled checked /> "
                    } else {
                        "<input type=\"checkbox\" disabled /> "
                    });
                }
                _ => self.html.push_str("<li>"),
            }
            for child in &item.children {
                match child.node_type {
                    // Tight list paragraphs render without <p>.
                    MarkdownNodeType::Paragraph if is_tight(node) => self.children_inline(child),
                    _ => self.block(child),
                }
            }
            self.html.push_str("</li>\n");
        }
        self.html.push_str(close);
    }

    fn table(&mut self, node: &MarkdownNode, alignments: &[TableAlignment]) {
        self.html.push_str("<table>\n");
        for row in &node.children {
            let header = matches!(row.node_type, MarkdownNodeType::TableRow { header: true });
            let tag = if header { "th" } else { "td" };
            self.html.push_str("<tr>");
            for (column, cell) in row.children.iter().enumerate() {
                let align = match alignments.get(column) {
                    Some(TableAlignment::Left) => " style=\"text-align: left\"",
                    Some(TableAlignment::Center) => " style=\"text-align: center\"",
                    Some(TableAlignment::Right) => " style=\"text-align: right\"",
                    _ => "",
                };
                let _ = write!(self.html, "<{}{}>", tag, align);
                self.children_inline(cell);
                let _ = write!(self.html, "</{}>", tag);
            }
            self.html.push_str("</tr>\n");
        }
        self.html.push_str("</table>\n");
    }

    fn children_inline(&mut self, node: &MarkdownNode) {
        for child in &node.children {
            self.inline(child);
        }
    }

    fn inline(&mut self, node: &MarkdownNode) {
        match &node.node_type {
            MarkdownNodeType::Text(text) => self.html.push_str(&html_escape(text)),
            MarkdownNodeType::Code(code) => {
                let _ = write!(self.html, "<code>{}</code>", html_escape(code));
            }
            MarkdownNodeType::SoftBreak => self.html.push('\n'),
            MarkdownNodeType::LineBreak => self.html.push_str("<br />\n"),
            MarkdownNodeType::HtmlInline(raw) => self.html.push_str(raw),
            MarkdownNodeType::Emphasis => self.wrap_inline(node, "em"),
            MarkdownNodeType::Strong => self.wrap_inline(node, "strong"),
            MarkdownNodeType::Strikethrough => self.wrap_inline(node, "del"),
            MarkdownNodeType::Superscript => self.wrap_inline(node, "sup"),
            MarkdownNodeType::Link { url, title } => {
                let href = self.link_target(url);
                let _ = write!(self.html, "<a href=\"{}\"", html_escape(&href));
                if !title.is_empty() {
                    let _ = write!(self.html, " title=\"{}\"", html_escape(title));
                }
                self.html.push('>');
                self.children_inline(node);
                self.html.push_str("</a>");
            }
            MarkdownNodeType::Image { url, title } => {
                let src = self.link_target(url);
                let alt = node.text_content();
                let _ = write!(
                    self.html,
                    "<img src=\"{}\" alt=\"{}\"",
                    html_escape(&src),
                    html_escape(&alt)
                );
                if !title.is_empty() {
                    let _ = write!(self.html, " title=\"{}\"", html_escape(title));
                }
                self.html.push_str(" />");
            }
            MarkdownNodeType::FootnoteReference(name) => {
                let name = html_escape(name);
                let _ = write!(
                    self.html,
                    "<sup class=\"footnote-ref\"><a href=\"#fn-{0}\">{0}</a></sup>",
                    name
                );
            }
            _ => self.children_inline(node),
        }
    }

    fn wrap_inline(&mut self, node: &MarkdownNode, tag: &str) {
        let _ = write!(self.html, "<{}>", tag);
        self.children_inline(node);
        let _ = write!(self.html, "</{}>", tag);
    }

    fn link_target(&self, url: &str) -> String {
        match &self.options.make_file_links_relative_to {
            Some(base) => relativize_file_link(url, base),
            None => url.to_string(),
        }
    }
}

fn is_tight(list: &MarkdownNode) -> bool {
    matches!(list.node_type, MarkdownNodeType::List { tight: true, .. })
}

/// Rewrite a `file:` link below `base` into a path relative to `base`.
///
/// Other links, and `file:` links outside `base`, are returned unchanged.
fn relativize_file_link(url: &str, base: &str) -> String {
    let Some(path) = url.strip_prefix("file:") else {
        return url.to_string();
    };
    let path = path.strip_prefix("//").unwrap_or(path);
    let base = base.trim_end_matches('/');

    match path.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/').to_string(),
        _ => url.to_string(),
    }
}

/// HTML-escape a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownParser, Parser};
    use tempfile::TempDir;

    fn render(markdown: &str, options: &HtmlGeneratorOptions) -> String {
        let mut doc = Doc::new();
        MarkdownParser::new()
            .parse_str(&mut doc, markdown, None)
            .unwrap();
        let mut out = Vec::new();
        HtmlGenerator.generate(&doc, options, None, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_generate_html_document() {
        let html = render("# Test\n\nParagraph text.", &HtmlGeneratorOptions::default());

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test</title>"));
        assert!(html.contains("<article class=\"markdown-body\">"));
        assert!(html.contains("<h1>Test</h1>"));
        assert!(html.contains("<p>Paragraph text.</p>"));
        assert!(html.contains(".markdown-body"));
    }

    #[test]
    fn test_explicit_title_wins() {
        let options = HtmlGeneratorOptions {
            title: "Manual <v2>".to_string(),
            ..Default::default()
        };
        let html = render("# Heading", &options);
        assert!(html.contains("<title>Manual &lt;v2&gt;</title>"));
    }

    #[test]
    fn test_inline_formatting() {
        let html = render("**Bold** and *italic* and `x<y`", &HtmlGeneratorOptions::default());
        assert!(html.contains("<strong>Bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<code>x&lt;y</code>"));
    }

    #[test]
    fn test_tight_list_and_ordered_start() {
        let html = render("3. one\n4. two", &HtmlGeneratorOptions::default());
        assert!(html.contains("<ol start=\"3\">"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] todo", &HtmlGeneratorOptions::default());
        assert!(html.contains("disabled checked"));
        assert!(html.contains("task-list-item"));
    }

    #[test]
    fn test_primitive_html_has_no_style() {
        let options = HtmlGeneratorOptions {
            primitive_html: true,
            ..Default::default()
        };
        let html = render("text", &options);
        assert!(!html.contains("<style>"));
        assert!(!html.contains("stylesheet"));
    }

    #[test]
    fn test_linked_css() {
        let options = HtmlGeneratorOptions {
            css: Some("docs.css".into()),
            inline_css: false,
            ..Default::default()
        };
        let html = render("text", &options);
        assert!(html.contains("<link rel=\"stylesheet\" href=\"docs.css\">"));
    }

    #[test]
    fn test_inlined_css() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("docs.css");
        fs::write(&css, "body { color: red; }").unwrap();

        let options = HtmlGeneratorOptions {
            css: Some(css),
            inline_css: true,
            ..Default::default()
        };
        let html = render("text", &options);
        assert!(html.contains("body { color: red; }"));
    }

    #[test]
    fn test_missing_inline_css_is_invalid_option() {
        let options = HtmlGeneratorOptions {
            css: Some("/definitely/not/here.css".into()),
            inline_css: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = HtmlGenerator
            .generate(&Doc::new(), &options, None, &mut out)
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidOption { .. }));
    }

    #[test]
    fn test_relativize_file_link() {
        assert_eq!(
            relativize_file_link("file:///home/me/proj/docs/a.png", "/home/me/proj"),
            "docs/a.png"
        );
        assert_eq!(
            relativize_file_link("file:/other/a.png", "/home/me/proj"),
            "file:/other/a.png"
        );
        assert_eq!(
            relativize_file_link("https://example.com", "/home/me/proj"),
            "https://example.com"
        );
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("Hello"), "Hello");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }
}
