//! Export Kinds and Option Mapping
//!
//! This module declares the metadata fields of each export kind and maps
//! the entered values onto the generator option bundles.

use std::path::{Path, PathBuf};

use super::data::{ExportData, FieldDescriptor};
use crate::generator::{
    copyright_notice, Generator, HtmlGenerator, HtmlGeneratorOptions, PdfGenerator,
    PdfGeneratorOptions,
};

// ─────────────────────────────────────────────────────────────────────────────
// Field Declarations
// ─────────────────────────────────────────────────────────────────────────────

/// Field keys shared by the option builders and the orchestrator.
pub mod keys {
    pub const PAGE_SIZE: &str = "pageSize";
    pub const TITLE: &str = "title";
    pub const SUBJECT: &str = "subject";
    pub const KEYWORDS: &str = "keywords";
    pub const AUTHOR: &str = "author";
    pub const VERSION: &str = "version";
    pub const COPYRIGHT_YEAR: &str = "copyrightYear";
    pub const COPYRIGHT_BY: &str = "copyrightBy";
    pub const GENERATE_TITLE_PAGE: &str = "generateTitlePage";
    pub const GENERATE_TOC: &str = "generateTOC";
    pub const GENERATE_SECTION_NUMBERS: &str = "generateSectionNumbers";
    pub const CSS: &str = "css";
    pub const INLINE_CSS: &str = "inlineCSS";
    pub const PRIMITIVE_HTML: &str = "primitiveHTML";
    pub const FILE_LINKS_RELATIVE_TO: &str = "fileLinksRelativeTo";
    pub const OPEN_RESULT: &str = "openResult";
}

/// PDF export fields, in form order.
pub static PDF_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text(keys::PAGE_SIZE, "Page size:", "A4"),
    FieldDescriptor::text(keys::TITLE, "Title:", ""),
    FieldDescriptor::text(keys::SUBJECT, "Subject:", ""),
    FieldDescriptor::text(keys::KEYWORDS, "Keywords:", ""),
    FieldDescriptor::text(keys::AUTHOR, "Author:", ""),
    FieldDescriptor::text(keys::VERSION, "Version:", ""),
    FieldDescriptor::text(keys::COPYRIGHT_YEAR, "Copyright year:", ""),
    FieldDescriptor::text(keys::COPYRIGHT_BY, "Copyright by:", ""),
    FieldDescriptor::flag(keys::GENERATE_TITLE_PAGE, "Generate title page", false),
    FieldDescriptor::flag(keys::GENERATE_TOC, "Generate table of contents", false),
    FieldDescriptor::flag(keys::GENERATE_SECTION_NUMBERS, "Generate section numbers", true),
    FieldDescriptor::flag(keys::OPEN_RESULT, "Open result", false),
];

/// HTML export fields, in form order.
pub static HTML_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text(keys::TITLE, "Title:", ""),
    FieldDescriptor::text(keys::CSS, "Stylesheet:", ""),
    FieldDescriptor::flag(keys::INLINE_CSS, "Inline stylesheet", true),
    FieldDescriptor::flag(keys::PRIMITIVE_HTML, "Primitive HTML", false),
    FieldDescriptor::text(keys::FILE_LINKS_RELATIVE_TO, "Make file links relative to:", ""),
    FieldDescriptor::flag(keys::OPEN_RESULT, "Open result", false),
];

// ─────────────────────────────────────────────────────────────────────────────
// Export Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportKind {
    Pdf,
    Html,
}

impl ExportKind {
    /// Display label used in dialogs and messages.
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "PDF",
            ExportKind::Html => "HTML",
        }
    }

    /// Extension every output file of this kind carries.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Html => "html",
        }
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            ExportKind::Pdf => PDF_FIELDS,
            ExportKind::Html => HTML_FIELDS,
        }
    }

    /// Record key remembering the last generated file.
    pub fn output_key(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "generated.pdf.file",
            ExportKind::Html => "generated.html.file",
        }
    }

    /// Fresh metadata with every field at its default.
    pub fn export_data(&self) -> ExportData {
        let name = match self {
            ExportKind::Pdf => "PDF export data",
            ExportKind::Html => "HTML export data",
        };
        ExportData::new(name, self.fields(), self.output_key())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Option Mapping
// ─────────────────────────────────────────────────────────────────────────────

/// A generator the interactive export can drive.
pub trait ExportTarget: Generator {
    const KIND: ExportKind;

    /// Build the generator options from entered metadata.
    fn options_from(data: &ExportData, result_file: &Path) -> Self::Options;
}

impl ExportTarget for PdfGenerator {
    const KIND: ExportKind = ExportKind::Pdf;

    fn options_from(data: &ExportData, result_file: &Path) -> PdfGeneratorOptions {
        pdf_options_from(data, result_file)
    }
}

impl ExportTarget for HtmlGenerator {
    const KIND: ExportKind = ExportKind::Html;

    fn options_from(data: &ExportData, result_file: &Path) -> HtmlGeneratorOptions {
        html_options_from(data, result_file)
    }
}

/// Map PDF metadata onto generator options.
pub fn pdf_options_from(data: &ExportData, result_file: &Path) -> PdfGeneratorOptions {
    PdfGeneratorOptions {
        page_size: data.text(keys::PAGE_SIZE),
        title: data.text(keys::TITLE),
        subject: data.text(keys::SUBJECT),
        keywords: data.text(keys::KEYWORDS),
        author: data.text(keys::AUTHOR),
        version: data.text(keys::VERSION),
        copyright: copyright_notice(
            &data.text(keys::COPYRIGHT_YEAR),
            &data.text(keys::COPYRIGHT_BY),
        ),
        generate_title_page: data.flag(keys::GENERATE_TITLE_PAGE),
        generate_toc: data.flag(keys::GENERATE_TOC),
        generate_section_numbers: data.flag(keys::GENERATE_SECTION_NUMBERS),
        ..PdfGeneratorOptions::default()
    }
    .with_result_file(result_file)
}

/// Map HTML metadata onto generator options.
pub fn html_options_from(data: &ExportData, result_file: &Path) -> HtmlGeneratorOptions {
    let non_empty = |key: &str| {
        let value = data.text(key);
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    HtmlGeneratorOptions {
        title: data.text(keys::TITLE),
        css: non_empty(keys::CSS).map(PathBuf::from),
        inline_css: data.flag(keys::INLINE_CSS),
        primitive_html: data.flag(keys::PRIMITIVE_HTML),
        make_file_links_relative_to: non_empty(keys::FILE_LINKS_RELATIVE_TO),
        ..HtmlGeneratorOptions::default()
    }
    .with_result_file(result_file)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OutputTarget;

    #[test]
    fn test_pdf_field_order() {
        let keys: Vec<_> = PDF_FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec![
                "pageSize",
                "title",
                "subject",
                "keywords",
                "author",
                "version",
                "copyrightYear",
                "copyrightBy",
                "generateTitlePage",
                "generateTOC",
                "generateSectionNumbers",
                "openResult",
            ]
        );
        assert_eq!(PDF_FIELDS[0].label, "Page size:");
    }

    #[test]
    fn test_pdf_flags_from_stored_strings() {
        let mut data = ExportKind::Pdf.export_data();
        data.set(keys::GENERATE_TOC, "TRUE");
        data.set(keys::GENERATE_TITLE_PAGE, "true");

        let options = pdf_options_from(&data, Path::new("out.pdf"));
        assert!(options.generate_toc);
        assert!(options.generate_title_page);

        data.set(keys::GENERATE_TOC, "yes");
        let options = pdf_options_from(&data, Path::new("out.pdf"));
        assert!(!options.generate_toc);
    }

    #[test]
    fn test_pdf_copyright_and_metadata() {
        let mut data = ExportKind::Pdf.export_data();
        data.set(keys::COPYRIGHT_YEAR, "2013");
        data.set(keys::COPYRIGHT_BY, "Acme");
        data.set(keys::AUTHOR, "Jane");

        let options = pdf_options_from(&data, Path::new("/tmp/out.pdf"));
        assert_eq!(options.copyright, "Copyright © 2013 by Acme");
        assert_eq!(options.author, "Jane");
        assert_eq!(options.page_size, "A4");
        assert!(options.generate_section_numbers);
        assert_eq!(options.result_file(), Some(Path::new("/tmp/out.pdf")));
    }

    #[test]
    fn test_html_options_mapping() {
        let mut data = ExportKind::Html.export_data();
        assert!(html_options_from(&data, Path::new("o.html")).inline_css);
        assert!(html_options_from(&data, Path::new("o.html")).css.is_none());

        data.set(keys::CSS, " site.css ");
        data.set(keys::INLINE_CSS, "false");
        data.set(keys::PRIMITIVE_HTML, "True");
        data.set(keys::FILE_LINKS_RELATIVE_TO, "/home/me/project");

        let options = html_options_from(&data, Path::new("o.html"));
        assert_eq!(options.css, Some(PathBuf::from("site.css")));
        assert!(!options.inline_css);
        assert!(options.primitive_html);
        assert_eq!(
            options.make_file_links_relative_to.as_deref(),
            Some("/home/me/project")
        );
    }

    #[test]
    fn test_export_kind_metadata() {
        assert_eq!(ExportKind::Pdf.extension(), "pdf");
        assert_eq!(ExportKind::Html.output_key(), "generated.html.file");
        assert_eq!(ExportKind::Html.export_data().name(), "HTML export data");
    }
}
