//! Command line interface
//!
//! `mddoc build` runs a project build from `mddoc.toml`; `mddoc export`
//! exports a single document interactively.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};

use crate::build::{select_generator, Dispatcher, GeneratorKind};
use crate::config::{load_config, save_config_silent, ProjectConfig, PROJECT_FILE_NAME};
use crate::error::Result;
use crate::export::{
    ExportConfig, ExportHost, ExportKind, ExportOrchestrator, ExportOutcome, ExportTarget,
    FileChooser, JsonSettingsStore, MemorySettingsStore, SettingsStore,
};
use crate::files::{DialogFileChooser, FileDocumentSource, FixedFileChooser, SystemOpener};
use crate::generator::{HtmlGenerator, PdfGenerator};
use crate::ui::{parse_assignment, LogNotifier, TerminalForm};

#[derive(Parser)]
#[command(name = "mddoc")]
#[command(version, about = "Generate PDF and HTML documents from markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    mddoc build                               Build the project in mddoc.toml
    mddoc build --generator html --input-paths 'docs/**' --result-file site/index.html
    mddoc export pdf notes.md                 Export one document to PDF
    mddoc export html notes.md -o notes --yes --set title=Notes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate one document from the project's input files
    Build(BuildArgs),
    /// Export a single markdown document
    Export(ExportArgs),
}

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Build(args) => args.run(),
            Command::Export(args) => args.run(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Build
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Project file (defaults to ./mddoc.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root that input paths are relative to
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Generator to run (html, pdf)
    #[arg(long)]
    pub generator: Option<String>,

    /// Parser to use (markdown)
    #[arg(long)]
    pub parser: Option<String>,

    /// Comma separated input path specs
    #[arg(long, value_name = "SPEC")]
    pub input_paths: Option<String>,

    /// Output file for the selected generator
    #[arg(long, value_name = "FILE")]
    pub result_file: Option<PathBuf>,
}

impl BuildArgs {
    /// Load the project file and apply the command line overrides.
    pub fn project(&self) -> Result<(ProjectConfig, PathBuf)> {
        let mut project = match &self.config {
            Some(path) => ProjectConfig::load(path)?,
            None => ProjectConfig::load_or_default(Path::new(PROJECT_FILE_NAME))?,
        };

        let root = self
            .root
            .clone()
            .or_else(|| {
                self.config
                    .as_deref()
                    .and_then(Path::parent)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let selection = &mut project.generator;
        if let Some(parser) = &self.parser {
            selection.parser = parser.clone();
        }
        if let Some(generator) = &self.generator {
            selection.generator = generator.clone();
        }
        if let Some(input_paths) = &self.input_paths {
            selection.input_paths = input_paths.clone();
        }

        // An unknown generator is reported by the dispatcher
        if let (Some(file), Ok(kind)) = (&self.result_file, select_generator(&selection.generator)) {
            match kind {
                GeneratorKind::Html => project.html.result_file = Some(file.clone()),
                GeneratorKind::Pdf => project.pdf.result_file = Some(file.clone()),
            }
        }

        Ok((project, root))
    }

    fn run(&self) -> Result<ExitCode> {
        let (project, root) = self.project()?;
        let generated = Dispatcher::new(root).run(&project)?;
        println!("{}", generated.display());
        Ok(ExitCode::SUCCESS)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format
    #[arg(value_enum)]
    pub kind: ExportKind,

    /// Markdown document to export
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output file; the format's extension is appended when missing
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Accept remembered values without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Set a metadata field, e.g. --set title=Guide
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

impl ExportArgs {
    fn run(&self) -> Result<ExitCode> {
        let mut settings = load_config();
        let mut store: Box<dyn SettingsStore> = match JsonSettingsStore::open_default() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("{}; export settings will not be remembered", e);
                Box::new(MemorySettingsStore::new())
            }
        };
        let source = FileDocumentSource::new(&self.source);

        let mut chooser: Box<dyn FileChooser> =
            if self.output.is_some() || self.yes || !settings.use_save_dialog {
                Box::new(FixedFileChooser::new(self.output.clone()))
            } else {
                Box::new(DialogFileChooser::new(settings.last_export_dir.clone()))
            };
        let mut form = TerminalForm::stdio(!self.yes, self.set.clone());
        let mut opener = SystemOpener;
        let mut notifier = LogNotifier;

        let host = ExportHost {
            source: &source,
            chooser: chooser.as_mut(),
            form: &mut form,
            opener: &mut opener,
            notifier: &mut notifier,
            store: store.as_mut(),
        };
        let config = settings.export_config();
        let outcome = match self.kind {
            ExportKind::Pdf => export_with(PdfGenerator, &config, host),
            ExportKind::Html => export_with(HtmlGenerator, &config, host),
        };

        match outcome {
            ExportOutcome::Exported { path, .. } => {
                println!("{}", path.display());
                settings.add_recent_export(path);
                save_config_silent(&settings);
                Ok(ExitCode::SUCCESS)
            }
            ExportOutcome::Cancelled => {
                info!("{} export cancelled", self.kind.label());
                Ok(ExitCode::SUCCESS)
            }
            // Already reported by the notifier
            ExportOutcome::Failed(_) => Ok(ExitCode::FAILURE),
        }
    }
}

fn export_with<G: ExportTarget>(
    generator: G,
    config: &ExportConfig,
    host: ExportHost<'_>,
) -> ExportOutcome {
    let mut orchestrator = ExportOrchestrator::new(generator, config);
    let outcome = orchestrator.perform(host);
    debug!("{} export ended in state {:?}", G::KIND.label(), orchestrator.state());
    outcome
}
