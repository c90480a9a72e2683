//! User settings and preferences for mddoc
//!
//! This module defines the `Settings` struct that holds the user's export
//! defaults, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::export::ExportConfig;
use crate::generator::PageSize;

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Export Defaults
    // ─────────────────────────────────────────────────────────────────────────
    /// Page size preset for new PDF exports (A3, A4, A5, LETTER, LEGAL)
    pub default_page_size: String,

    /// Whether new exports open the result when done
    pub open_result: bool,

    /// Use the native save dialog when no output file is given
    pub use_save_dialog: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory of the last export, used as the dialog's starting point
    pub last_export_dir: Option<PathBuf>,

    /// Recently generated files (most recent first)
    pub recent_exports: Vec<PathBuf>,

    /// Maximum number of recent exports to remember
    pub max_recent_exports: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_page_size: PageSize::default().label().to_string(),
            open_result: false,
            use_save_dialog: true,
            last_export_dir: None,
            recent_exports: Vec::new(),
            max_recent_exports: 10,
        }
    }
}

impl Settings {
    /// Upper bound for `max_recent_exports`.
    pub const MAX_RECENT_EXPORTS: usize = 100;

    /// Add a generated file to the history.
    ///
    /// Moves an existing entry to the front instead of duplicating it and
    /// remembers its directory for the next export.
    pub fn add_recent_export(&mut self, path: PathBuf) {
        self.recent_exports.retain(|p| p != &path);
        self.last_export_dir = path.parent().map(|dir| dir.to_path_buf());
        self.recent_exports.insert(0, path);
        self.recent_exports.truncate(self.max_recent_exports);
    }

    /// The configured page size, A4 when the stored name is unknown.
    pub fn page_size(&self) -> PageSize {
        self.default_page_size.parse().unwrap_or_default()
    }

    /// Defaults handed to new export orchestrators.
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            default_page_size: self.page_size(),
            open_result: self.open_result,
        }
    }

    /// Sanitize settings after loading a possibly hand-edited file.
    pub fn sanitize(&mut self) {
        // Normalize the page size name, falling back to the default
        self.default_page_size = self.page_size().label().to_string();

        if self.max_recent_exports == 0 {
            self.max_recent_exports = 10;
        } else if self.max_recent_exports > Self::MAX_RECENT_EXPORTS {
            self.max_recent_exports = Self::MAX_RECENT_EXPORTS;
        }
        self.recent_exports.truncate(self.max_recent_exports);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.default_page_size, "A4");
        assert!(!settings.open_result);
        assert!(settings.use_save_dialog);
        assert!(settings.recent_exports.is_empty());
        assert_eq!(settings.max_recent_exports, 10);
    }

    #[test]
    fn test_add_recent_export() {
        let mut settings = Settings {
            max_recent_exports: 2,
            ..Settings::default()
        };

        settings.add_recent_export(PathBuf::from("/out/a.pdf"));
        settings.add_recent_export(PathBuf::from("/out/b.pdf"));
        settings.add_recent_export(PathBuf::from("/out/a.pdf"));
        settings.add_recent_export(PathBuf::from("/other/c.html"));

        assert_eq!(
            settings.recent_exports,
            vec![PathBuf::from("/other/c.html"), PathBuf::from("/out/a.pdf")]
        );
        assert_eq!(settings.last_export_dir, Some(PathBuf::from("/other")));
    }

    #[test]
    fn test_export_config_from_settings() {
        let settings = Settings {
            default_page_size: "letter".to_string(),
            open_result: true,
            ..Settings::default()
        };
        let config = settings.export_config();
        assert_eq!(config.default_page_size, PageSize::Letter);
        assert!(config.open_result);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"open_result": true}"#).unwrap();
        assert!(settings.open_result);
        assert_eq!(settings.default_page_size, "A4");
    }

    #[test]
    fn test_sanitize() {
        let mut settings = Settings {
            default_page_size: "B7".to_string(),
            max_recent_exports: 500,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.default_page_size, "A4");
        assert_eq!(settings.max_recent_exports, Settings::MAX_RECENT_EXPORTS);
    }

    #[test]
    fn test_from_json_sanitized() {
        let settings =
            Settings::from_json_sanitized(r#"{"default_page_size": "legal", "max_recent_exports": 0}"#)
                .unwrap();
        assert_eq!(settings.default_page_size, "LEGAL");
        assert_eq!(settings.max_recent_exports, 10);
    }
}
