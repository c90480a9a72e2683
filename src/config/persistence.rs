//! Configuration file persistence for mddoc
//!
//! Settings live in `config.json` inside the platform configuration
//! directory, next to the export data store. Loading never fails: a missing
//! or broken file yields defaults. Saving writes a sibling backup file first
//! and renames it over the original.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for the config directory
const APP_NAME: &str = "mddoc";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Backup configuration file name (used during atomic writes)
const CONFIG_BACKUP_NAME: &str = "config.json.bak";

/// Platform configuration directory for mddoc.
///
/// - **Windows**: `%APPDATA%\mddoc\`
/// - **macOS**: `~/Library/Application Support/mddoc/`
/// - **Linux**: `~/.config/mddoc/`
///
/// Fails with `Error::ConfigDirNotFound` when the platform reports no
/// configuration directory (e.g. `HOME` is unset).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from the default location, falling back to defaults.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load and sanitize settings from `path`.
///
/// A missing or empty file yields defaults; invalid JSON is an error.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!("Config file at {} contains invalid JSON: {}", path.display(), e);
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save settings to the default location.
pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_to(settings, &get_config_file_path()?)
}

/// Save settings to `path`, creating its directory when needed.
pub fn save_config_to(settings: &Settings, path: &Path) -> Result<()> {
    let save_error = |at: &Path, e: Box<dyn std::error::Error + Send + Sync>| Error::ConfigSave {
        path: at.to_path_buf(),
        source: e,
    };

    if let Some(dir) = path.parent().filter(|dir| !dir.exists()) {
        debug!("Creating config directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| save_error(dir, Box::new(e)))?;
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| save_error(path, Box::new(e)))?;

    let backup_path = path.with_file_name(CONFIG_BACKUP_NAME);
    fs::write(&backup_path, &json).map_err(|e| save_error(&backup_path, Box::new(e)))?;
    fs::rename(&backup_path, path).map_err(|e| save_error(path, Box::new(e)))?;

    info!("Configuration saved to {}", path.display());
    Ok(())
}

/// Best effort save; failures are logged. Returns whether it succeeded.
pub fn save_config_silent(settings: &Settings) -> bool {
    match save_config(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save configuration: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_dir_names_app() {
        if let Ok(path) = get_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_config_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "  \n").unwrap();
        assert_eq!(load_config_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_corrupted_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ invalid json }").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut original = Settings {
            default_page_size: "LETTER".to_string(),
            open_result: true,
            ..Settings::default()
        };
        original.add_recent_export(PathBuf::from("/out/guide.pdf"));

        save_config_to(&original, &path).unwrap();
        assert!(!path.with_file_name(CONFIG_BACKUP_NAME).exists());

        assert_eq!(load_config_from(&path).unwrap(), original);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"open_result": true, "future_feature": 1}"#).unwrap();

        assert!(load_config_from(&path).unwrap().open_result);
    }
}
