//! Input path specs
//!
//! A project names its inputs with comma separated specs relative to the
//! project root. Each spec is one of:
//!
//! - a file: `docs/intro.md`
//! - a directory, for the markdown files directly inside it: `docs`
//! - a directory tree: `docs/**`
//! - a regular expression on file names: `docs/ch\d+\.md`, or recursively
//!   `docs/**/.*\.md`

use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// File extensions recognized as markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Characters that turn the last spec component into a file name pattern.
const REGEX_METACHARACTERS: &[char] = &[
    '*', '?', '[', ']', '(', ')', '+', '^', '$', '|', '{', '}', '\\',
];

const RECURSIVE: &str = "**";

/// Whether `path` has a markdown extension.
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// One input path spec, resolved against a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    root: PathBuf,
    spec: String,
}

impl SourcePath {
    pub fn new(root: impl Into<PathBuf>, spec: &str) -> Self {
        Self {
            root: root.into(),
            spec: spec.trim().to_string(),
        }
    }

    /// Expand into concrete files, sorted within this path.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(self.error(format!(
                "project root '{}' is not a directory",
                self.root.display()
            )));
        }
        if self.spec.is_empty() {
            return Err(self.error("empty input path".to_string()));
        }

        let literal = self.root.join(&self.spec);
        if literal.is_file() {
            return Ok(vec![literal]);
        }
        if literal.is_dir() {
            return self.collect(&literal, false, is_markdown_file);
        }

        let components: Vec<&str> = self.spec.split('/').filter(|c| !c.is_empty()).collect();
        let Some((last, parents)) = components.split_last() else {
            return Err(self.error("empty input path".to_string()));
        };

        if *last == RECURSIVE {
            let dir = self.join_components(parents);
            return self.collect(&dir, true, is_markdown_file);
        }

        if last.contains(REGEX_METACHARACTERS) {
            let (recursive, parents) = match parents.split_last() {
                Some((&RECURSIVE, rest)) => (true, rest),
                _ => (false, parents),
            };
            let pattern = Regex::new(&format!("^(?:{})$", last))
                .map_err(|e| self.error(format!("invalid file name pattern: {}", e)))?;
            let dir = self.join_components(parents);
            return self.collect(&dir, recursive, |path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| pattern.is_match(name))
                    .unwrap_or(false)
            });
        }

        Err(self.error(format!("'{}' does not exist", literal.display())))
    }

    fn join_components(&self, components: &[&str]) -> PathBuf {
        let mut dir = if self.spec.starts_with('/') {
            PathBuf::from("/")
        } else {
            self.root.clone()
        };
        dir.extend(components);
        dir
    }

    fn collect(
        &self,
        dir: &Path,
        recursive: bool,
        accept: impl Fn(&Path) -> bool,
    ) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(self.error(format!("'{}' is not a directory", dir.display())));
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && accept(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();

        debug!("Input path '{}' matched {} file(s)", self.spec, files.len());
        Ok(files)
    }

    fn error(&self, reason: String) -> Error {
        Error::SourcePath {
            spec: self.spec.clone(),
            reason,
        }
    }
}

/// Resolve a comma separated list of specs, keeping token order.
///
/// Empty tokens are skipped. Duplicates are kept; callers decide whether a
/// file may appear twice.
pub fn resolve_input_paths(root: &Path, specs: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for token in specs.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        files.extend(SourcePath::new(root, token).source_files()?);
    }
    Ok(files)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
