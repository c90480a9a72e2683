//! Generator Options and Configuration
//!
//! This module defines the options bundles the generators accept. They are
//! filled either from the project configuration (`mddoc.toml`) or from the
//! metadata a user enters when exporting a single document.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Options that name where a generator writes its result.
pub trait OutputTarget: Clone {
    fn result_file(&self) -> Option<&Path>;

    /// These options with input files given relative to `root` made
    /// reachable from the working directory.
    fn rooted(&self, _root: &Path) -> Self {
        self.clone()
    }
}

/// Build the copyright line shown on title pages and in document metadata.
pub fn copyright_notice(year: &str, owner: &str) -> String {
    format!("Copyright © {} by {}", year, owner)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Size
// ─────────────────────────────────────────────────────────────────────────────

/// Supported PDF page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Page width and height in PDF points.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A3 => (842.0, 1191.0),
            PageSize::A4 => (595.0, 842.0),
            PageSize::A5 => (420.0, 595.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "LETTER",
            PageSize::Legal => "LEGAL",
        }
    }

    pub fn all() -> &'static [PageSize] {
        &[
            PageSize::A3,
            PageSize::A4,
            PageSize::A5,
            PageSize::Letter,
            PageSize::Legal,
        ]
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PageSize::all()
            .iter()
            .copied()
            .find(|size| size.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown page size '{}'", wanted))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PDF Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for the PDF generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfGeneratorOptions {
    /// Where the PDF is written
    pub result_file: Option<PathBuf>,

    /// Page size name, validated by the generator (A3, A4, A5, LETTER, LEGAL)
    pub page_size: String,

    pub title: String,
    pub subject: String,
    pub keywords: String,
    pub author: String,
    pub version: String,

    /// Complete copyright line, see [`copyright_notice`]
    pub copyright: String,

    /// Render a title page before the content
    pub generate_title_page: bool,

    /// Render a table of contents before the content
    #[serde(rename = "generateTOC", alias = "generateToc")]
    pub generate_toc: bool,

    /// Prefix headings with "1.2.3" style numbers
    pub generate_section_numbers: bool,

    /// Render link text only, without the target in parentheses
    pub hide_links: bool,
}

impl Default for PdfGeneratorOptions {
    fn default() -> Self {
        Self {
            result_file: None,
            page_size: PageSize::default().label().to_string(),
            title: String::new(),
            subject: String::new(),
            keywords: String::new(),
            author: String::new(),
            version: String::new(),
            copyright: String::new(),
            generate_title_page: false,
            generate_toc: false,
            generate_section_numbers: true,
            hide_links: false,
        }
    }
}

impl PdfGeneratorOptions {
    /// Set the result file.
    pub fn with_result_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.result_file = Some(path.into());
        self
    }
}

impl OutputTarget for PdfGeneratorOptions {
    fn result_file(&self) -> Option<&Path> {
        self.result_file.as_deref()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for the HTML generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlGeneratorOptions {
    /// Where the HTML is written
    pub result_file: Option<PathBuf>,

    /// Document title; the first heading is used when empty
    pub title: String,

    /// Stylesheet to use instead of the built-in one
    pub css: Option<PathBuf>,

    /// Copy the stylesheet into the document instead of linking it
    #[serde(rename = "inlineCSS", alias = "inlineCss")]
    pub inline_css: bool,

    /// Plain tags only, no stylesheet at all
    #[serde(rename = "primitiveHTML", alias = "primitiveHtml")]
    pub primitive_html: bool,

    /// `file:` links below this directory are rewritten relative to it
    pub make_file_links_relative_to: Option<String>,
}

impl Default for HtmlGeneratorOptions {
    fn default() -> Self {
        Self {
            result_file: None,
            title: String::new(),
            css: None,
            inline_css: true,
            primitive_html: false,
            make_file_links_relative_to: None,
        }
    }
}

impl HtmlGeneratorOptions {
    /// Set the result file.
    pub fn with_result_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.result_file = Some(path.into());
        self
    }
}

impl OutputTarget for HtmlGeneratorOptions {
    fn result_file(&self) -> Option<&Path> {
        self.result_file.as_deref()
    }

    // Only an inlined stylesheet is read; a linked one stays as written
    fn rooted(&self, root: &Path) -> Self {
        let mut options = self.clone();
        if self.inline_css {
            options.css = self.css.as_ref().map(|css| root.join(css));
        }
        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
