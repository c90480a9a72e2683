//! File operations module for mddoc
//!
//! This module resolves input path specs, provides output file choosers
//! (native save dialog or fixed path) and connects documents on disk to the
//! export flow.

pub mod dialogs;
pub mod document;
pub mod source_path;

pub use dialogs::{DialogFileChooser, FixedFileChooser};
pub use document::{FileDocumentSource, SystemOpener};
pub use source_path::resolve_input_paths;
