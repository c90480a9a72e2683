//! Interactive export of the current document
//!
//! The orchestrator drives one export from start to finish: choose an output
//! file, collect metadata, generate, then remember the settings and open the
//! result. Every host interaction goes through a small trait so the flow runs
//! the same from the terminal, a dialog, or a test.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::data::ExportData;
use super::options::{keys, ExportTarget};
use super::store::SettingsStore;
use crate::error::{Error, Result};
use crate::generator::{generate_to_file, PageSize};
use crate::markdown::Doc;

// ─────────────────────────────────────────────────────────────────────────────
// Host Interfaces
// ─────────────────────────────────────────────────────────────────────────────

/// What the file chooser is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRequest {
    /// Kind label, e.g. "PDF"
    pub kind: &'static str,
    /// Extension the result must carry, without the dot
    pub extension: &'static str,
    /// Path to pre-select, e.g. the last generated file
    pub suggested: Option<PathBuf>,
}

/// Asks the user where to write the result.
pub trait FileChooser {
    /// `None` means the user cancelled.
    fn choose_output(&mut self, request: &OutputRequest) -> Option<PathBuf>;
}

/// Result of presenting the metadata form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Generate,
    Cancel,
}

/// Lets the user review and edit metadata before generating.
pub trait MetadataForm {
    fn edit(&mut self, data: &mut ExportData) -> FormAction;
}

/// Opens a generated file with the system viewer.
pub trait FileOpener {
    fn open(&mut self, path: &Path) -> io::Result<()>;
}

/// Reports export progress and results to the user.
pub trait Notifier {
    fn progress(&mut self, message: &str);
    fn info(&mut self, message: &str);
    /// Non-fatal problems
    fn warning(&mut self, message: &str);
    fn error(&mut self, error: &Error);
}

/// The document currently being edited.
pub trait DocumentSource {
    /// Backing file, `None` for unsaved documents.
    fn current_file(&self) -> Option<&Path>;

    fn markdown_document(&self) -> Result<Doc>;
}

/// Collaborators for one export run.
pub struct ExportHost<'a> {
    pub source: &'a dyn DocumentSource,
    pub chooser: &'a mut dyn FileChooser,
    pub form: &'a mut dyn MetadataForm,
    pub opener: &'a mut dyn FileOpener,
    pub notifier: &'a mut dyn Notifier,
    pub store: &'a mut dyn SettingsStore,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// Defaults applied to fresh export data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportConfig {
    pub default_page_size: PageSize,
    pub open_result: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_page_size: PageSize::A4,
            open_result: false,
        }
    }
}

/// Where an export currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    AwaitingOutputPath,
    CollectingMetadata,
    Generating,
    Done,
    Failed,
}

/// How an export ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Cancelled,
    Exported { path: PathBuf, opened: bool },
    Failed(String),
}

/// Runs exports for one generator, keeping its metadata between runs.
pub struct ExportOrchestrator<G: ExportTarget> {
    generator: G,
    data: ExportData,
    state: ExportState,
}

impl<G: ExportTarget> ExportOrchestrator<G> {
    pub fn new(generator: G, config: &ExportConfig) -> Self {
        let mut data = G::KIND.export_data();
        if data.set(keys::PAGE_SIZE, config.default_page_size.label()) {
            debug!("Default page size {}", config.default_page_size.label());
        }
        data.set(keys::OPEN_RESULT, &config.open_result.to_string());

        Self {
            generator,
            data,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn data(&self) -> &ExportData {
        &self.data
    }

    /// Run one export. Errors are reported through the notifier and returned
    /// as [`ExportOutcome::Failed`], never propagated.
    pub fn perform(&mut self, host: ExportHost<'_>) -> ExportOutcome {
        let kind = G::KIND;
        let source_file = host.source.current_file().map(Path::to_path_buf);

        self.state = ExportState::AwaitingOutputPath;
        let request = OutputRequest {
            kind: kind.label(),
            extension: kind.extension(),
            suggested: self.suggested_output(&*host.store, source_file.as_deref()),
        };
        let Some(chosen) = host.chooser.choose_output(&request) else {
            debug!("{} export cancelled at file selection", kind.label());
            self.state = ExportState::Idle;
            return ExportOutcome::Cancelled;
        };
        let output = with_extension(chosen, kind.extension());

        self.state = ExportState::CollectingMetadata;
        if let Some(source) = &source_file {
            self.data.load_export_data(&*host.store, source);
        }
        if host.form.edit(&mut self.data) == FormAction::Cancel {
            debug!("{} export cancelled at metadata form", kind.label());
            self.state = ExportState::Idle;
            return ExportOutcome::Cancelled;
        }

        self.state = ExportState::Generating;
        let mut result = self.generate(host.source, &mut *host.notifier, &output);
        if let Some(source) = source_file.as_deref().filter(|_| result.is_ok()) {
            self.data.remember_output(&output);
            result = self.data.save_export_data(&mut *host.store, source);
        }
        if let Err(e) = result {
            self.state = ExportState::Failed;
            host.notifier.error(&e);
            return ExportOutcome::Failed(e.chain());
        }

        let mut opened = false;
        if self.data.flag(keys::OPEN_RESULT) {
            match host.opener.open(&output) {
                Ok(()) => opened = true,
                Err(e) => host.notifier.warning(&format!(
                    "Exported {} but could not open it: {}",
                    output.display(),
                    e
                )),
            }
        }

        self.state = ExportState::Done;
        info!("{} export written to {}", kind.label(), output.display());
        host.notifier
            .info(&format!("Exported {} to {}", kind.label(), output.display()));
        ExportOutcome::Exported {
            path: output,
            opened,
        }
    }

    fn suggested_output(&self, store: &dyn SettingsStore, source: Option<&Path>) -> Option<PathBuf> {
        let source = source?;
        self.data
            .stored_output(store, source)
            .or_else(|| self.data.last_output().map(Path::to_path_buf))
            .or_else(|| Some(source.with_extension(G::KIND.extension())))
    }

    fn generate(
        &self,
        source: &dyn DocumentSource,
        notifier: &mut dyn Notifier,
        output: &Path,
    ) -> Result<()> {
        let doc = source.markdown_document()?;
        let options = G::options_from(&self.data, output);

        let mut on_progress = |message: &str| notifier.progress(message);
        generate_to_file(&self.generator, &doc, &options, Some(&mut on_progress), output)
    }
}

/// Append `extension` unless the path already ends with it.
fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    let has_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false);
    if has_extension {
        return path;
    }

    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
