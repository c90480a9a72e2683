//! Batch generation
//!
//! The dispatcher turns a project configuration into one generated file:
//! select parser and generator by name, resolve the input specs, parse every
//! file into a single document and render it once.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::files::resolve_input_paths;
use crate::generator::{generate_to_file, Generator, HtmlGenerator, OutputTarget, PdfGenerator};
use crate::markdown::{Doc, MarkdownParser, Parser};

/// Pick the parser named by `name`, ignoring case.
pub fn select_parser(name: &str) -> Result<MarkdownParser> {
    match name.trim().to_lowercase().as_str() {
        "markdown" => Ok(MarkdownParser::new()),
        _ => Err(Error::UnknownParser(name.to_string())),
    }
}

/// Generators known to the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Html,
    Pdf,
}

/// Pick the generator named by `name`, ignoring case.
pub fn select_generator(name: &str) -> Result<GeneratorKind> {
    match name.trim().to_lowercase().as_str() {
        "html" => Ok(GeneratorKind::Html),
        "pdf" => Ok(GeneratorKind::Pdf),
        _ => Err(Error::UnknownGenerator(name.to_string())),
    }
}

/// Runs builds for one project root.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    root: PathBuf,
}

impl Dispatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build the project and return the generated file.
    pub fn run(&self, project: &ProjectConfig) -> Result<PathBuf> {
        let selection = &project.generator;
        let parser = select_parser(&selection.parser)?;

        match select_generator(&selection.generator)? {
            GeneratorKind::Html => {
                self.run_with(&parser, &HtmlGenerator, &selection.input_paths, &project.html)
            }
            GeneratorKind::Pdf => {
                self.run_with(&parser, &PdfGenerator, &selection.input_paths, &project.pdf)
            }
        }
    }

    /// Parse every input with `parser`, then render once with `generator`.
    ///
    /// The first failure aborts the build; the generator is not invoked when
    /// any input fails to parse.
    pub fn run_with<P, G>(
        &self,
        parser: &P,
        generator: &G,
        input_paths: &str,
        options: &G::Options,
    ) -> Result<PathBuf>
    where
        P: Parser,
        G: Generator,
    {
        let options = options.rooted(&self.root);
        let result_file = options
            .result_file()
            .map(|file| self.root.join(file))
            .ok_or_else(|| Error::MissingResultFile {
                generator: generator.name().to_string(),
            })?;

        let files = unique(resolve_input_paths(&self.root, input_paths)?);
        if files.is_empty() {
            warn!("Input paths '{}' matched no files", input_paths);
        }

        let mut doc = Doc::new();
        for (index, file) in files.iter().enumerate() {
            info!("Parsing [{}/{}] {}", index + 1, files.len(), file.display());
            parser.parse(&mut doc, file)?;
        }

        if let Some(dir) = result_file.parent().filter(|dir| !dir.exists()) {
            fs::create_dir_all(dir).map_err(|source| Error::GenerateIo {
                path: result_file.clone(),
                source,
            })?;
        }

        info!(
            "Generating {} output to {}",
            generator.name(),
            result_file.display()
        );
        let mut log_progress = |message: &str| debug!("{}: {}", generator.name(), message);
        generate_to_file(generator, &doc, &options, Some(&mut log_progress), &result_file)?;

        info!("Generated {}", result_file.display());
        Ok(result_file)
    }
}

/// Drop repeated files, keeping the first occurrence.
fn unique(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|file| seen.insert(file.clone()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
