//! Configuration module for mddoc
//!
//! This module handles user preferences (`config.json` in the platform
//! config directory) and the per-project build configuration
//! (`mddoc.toml`).

mod persistence;
mod project;
mod settings;

pub use persistence::*;
pub use project::*;
pub use settings::*;
