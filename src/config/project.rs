//! Project configuration (`mddoc.toml`)
//!
//! A project file configures the batch build:
//!
//! ```toml
//! [generator]
//! parser = "markdown"
//! generator = "pdf"
//! inputPaths = "docs/intro.md,docs/chapters/**"
//!
//! [pdf]
//! resultFile = "target/manual.pdf"
//! title = "Manual"
//! generateTOC = true
//!
//! [html]
//! resultFile = "target/manual.html"
//! ```
//!
//! Command line flags override the file.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::generator::{HtmlGeneratorOptions, PdfGeneratorOptions};

/// Default project file name, looked up in the working directory.
pub const PROJECT_FILE_NAME: &str = "mddoc.toml";

/// Which parser and generator to run, and on what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Parser selector, matched case-insensitively
    pub parser: String,
    /// Generator selector ("html" or "pdf"), matched case-insensitively
    pub generator: String,
    /// Comma separated input path specs, relative to the project root
    pub input_paths: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            parser: "markdown".to_string(),
            generator: String::new(),
            input_paths: String::new(),
        }
    }
}

/// Contents of `mddoc.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub generator: GeneratorOptions,
    pub html: HtmlGeneratorOptions,
    pub pdf: PdfGeneratorOptions,
}

impl ProjectConfig {
    /// Read a project file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading project configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Self::from_toml(&contents)
    }

    /// Read a project file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No project file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
