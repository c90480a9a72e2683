//! Document Export Module for mddoc
//!
//! This module provides the interactive export of a single document to PDF
//! or HTML, with metadata remembered per source document.
//!
//! # Architecture
//!
//! - `data.rs` - Typed metadata fields and their persistence
//! - `store.rs` - Settings stores (JSON file, in-memory)
//! - `options.rs` - Export kinds, field lists and option mapping
//! - `orchestrator.rs` - The export flow and its host interfaces

pub mod data;
pub mod options;
pub mod orchestrator;
pub mod store;

pub use data::{ExportData, FieldKind, FieldValue};
pub use options::{ExportKind, ExportTarget};
pub use orchestrator::{
    DocumentSource, ExportConfig, ExportHost, ExportOrchestrator, ExportOutcome,
    FileChooser, FileOpener, FormAction, MetadataForm, Notifier, OutputRequest,
};
pub use store::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
