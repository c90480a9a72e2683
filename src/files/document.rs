//! Documents on disk
//!
//! Host side implementations of the export's document and opener interfaces.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::export::{DocumentSource, FileOpener};
use crate::markdown::{Doc, MarkdownParser, Parser};

/// The current document, read from a markdown file when needed.
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    path: PathBuf,
    parser: MarkdownParser,
}

impl FileDocumentSource {
    /// The path is made absolute against the working directory, so export
    /// settings keyed by it stay distinct between projects.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self {
            path,
            parser: MarkdownParser::new(),
        }
    }
}

impl DocumentSource for FileDocumentSource {
    fn current_file(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn markdown_document(&self) -> Result<Doc> {
        let mut doc = Doc::new();
        self.parser.parse(&mut doc, &self.path)?;
        Ok(doc)
    }
}

/// Opens files with the platform's default application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&mut self, path: &Path) -> io::Result<()> {
        debug!("Opening {}", path.display());
        open::that(path)
    }
}
