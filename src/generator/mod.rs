//! Document generators for mddoc
//!
//! A generator renders a parsed [`Doc`] into an output stream. Both the
//! interactive export and the batch build drive generators through the same
//! [`Generator`] interface.
//!
//! # Architecture
//!
//! - `options.rs` - Generator option bundles and page sizes
//! - `html.rs` - Standalone HTML document generation
//! - `pdf.rs` - PDF document generation (lopdf)
//! - `layout.rs` - Text layout used by the PDF generator

mod html;
mod layout;
pub mod options;
mod pdf;

pub use html::HtmlGenerator;
pub use options::{
    copyright_notice, HtmlGeneratorOptions, OutputTarget, PageSize, PdfGeneratorOptions,
};
pub use pdf::PdfGenerator;

use crate::error::{Error, Result};
use crate::markdown::Doc;
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while generating a document.
#[derive(Debug)]
pub enum GenerateError {
    /// An option has a value the generator cannot use
    InvalidOption { option: String, message: String },
    /// Failed to write the output stream or read an auxiliary file
    Io(io::Error),
    /// The document could not be rendered
    Render(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::InvalidOption { option, message } => {
                write!(f, "Invalid value for '{}': {}", option, message)
            }
            GenerateError::Io(e) => write!(f, "IO error: {}", e),
            GenerateError::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GenerateError {
    fn from(err: io::Error) -> Self {
        GenerateError::Io(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator Interface
// ─────────────────────────────────────────────────────────────────────────────

/// Optional progress callback, invoked with short status messages.
pub type Progress<'a> = Option<&'a mut dyn FnMut(&str)>;

/// Renders a document with generator specific options.
pub trait Generator {
    type Options: OutputTarget;

    /// Short lowercase name, as used by the generator selector.
    fn name(&self) -> &'static str;

    /// Render `doc` into `out`.
    fn generate(
        &self,
        doc: &Doc,
        options: &Self::Options,
        progress: Progress<'_>,
        out: &mut dyn Write,
    ) -> std::result::Result<(), GenerateError>;
}

pub(crate) fn report(progress: &mut Progress<'_>, message: &str) {
    if let Some(callback) = progress.as_mut() {
        callback(message);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoped Output
// ─────────────────────────────────────────────────────────────────────────────

/// Run `render` against `writer`, then flush and close the writer.
///
/// The writer is dropped before this function returns, on success and on
/// every failure, so callers never report an error while the output handle
/// is still open.
pub fn write_scoped<W, F>(mut writer: W, path: &Path, render: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut dyn Write) -> std::result::Result<(), GenerateError>,
{
    let rendered = render(&mut writer);
    let flushed = writer.flush();
    drop(writer);

    match rendered {
        Err(GenerateError::Io(source)) => Err(Error::GenerateIo {
            path: path.to_path_buf(),
            source,
        }),
        Err(other) => Err(Error::Generate(other)),
        Ok(()) => flushed.map_err(|source| Error::GenerateIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create `path` and render `doc` into it through a buffered stream.
pub fn generate_to_file<G: Generator>(
    generator: &G,
    doc: &Doc,
    options: &G::Options,
    progress: Progress<'_>,
    path: &Path,
) -> Result<()> {
    debug!("Generating {} output to {}", generator.name(), path.display());

    let file = File::create(path).map_err(|source| Error::GenerateIo {
        path: path.to_path_buf(),
        source,
    })?;

    write_scoped(BufWriter::new(file), path, |out| {
        generator.generate(doc, options, progress, out)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Writer that records when it has been dropped.
    struct TrackedWriter {
        closed: Rc<Cell<bool>>,
        data: Vec<u8>,
    }

    impl Write for TrackedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for TrackedWriter {
        fn drop(&mut self) {
            self.closed.set(true);
        }
    }

    fn tracked() -> (TrackedWriter, Rc<Cell<bool>>) {
        let closed = Rc::new(Cell::new(false));
        let writer = TrackedWriter {
            closed: closed.clone(),
            data: Vec::new(),
        };
        (writer, closed)
    }

    #[test]
    fn test_write_scoped_closes_on_generate_failure() {
        let (writer, closed) = tracked();
        let result = write_scoped(writer, Path::new("out.pdf"), |out| {
            out.write_all(b"partial")?;
            Err(GenerateError::Render("boom".to_string()))
        });

        assert!(closed.get());
        assert!(matches!(result, Err(Error::Generate(GenerateError::Render(_)))));
    }

    #[test]
    fn test_write_scoped_maps_io_failure_with_path() {
        let (writer, closed) = tracked();
        let result = write_scoped(writer, Path::new("out.pdf"), |_| {
            Err(GenerateError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
        });

        assert!(closed.get());
        match result {
            Err(Error::GenerateIo { path, .. }) => assert_eq!(path, Path::new("out.pdf")),
            other => panic!("Expected GenerateIo, got {:?}", other),
        }
    }

    #[test]
    fn test_write_scoped_success_closes() {
        let (writer, closed) = tracked();
        write_scoped(writer, Path::new("out.html"), |out| {
            out.write_all(b"<html/>")?;
            Ok(())
        })
        .unwrap();
        assert!(closed.get());
    }

    #[test]
    fn test_report_without_callback_is_noop() {
        let mut progress: Progress<'_> = None;
        report(&mut progress, "ignored");

        let mut seen = Vec::new();
        let mut record = |msg: &str| seen.push(msg.to_string());
        let mut progress: Progress<'_> = Some(&mut record);
        report(&mut progress, "rendering");
        drop(progress);
        assert_eq!(seen, vec!["rendering".to_string()]);
    }
}
