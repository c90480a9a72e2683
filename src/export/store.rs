//! Per-document export settings persistence
//!
//! Export metadata is remembered per source document. The [`SettingsStore`]
//! trait maps a source path to a flat string record; the JSON implementation
//! keeps all records in `export-data.json` next to the application config.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::get_config_dir;
use crate::error::{Error, Result};

/// Field key to string value.
pub type Record = BTreeMap<String, String>;

/// Export settings file name
const EXPORT_DATA_FILE_NAME: &str = "export-data.json";

/// Backup file name (used during atomic writes)
const EXPORT_DATA_BACKUP_NAME: &str = "export-data.json.bak";

/// Key-value store for export records.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Record>;

    /// Replace the record stored under `key`.
    fn set(&mut self, key: &str, record: Record) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON File Store
// ─────────────────────────────────────────────────────────────────────────────

/// File backed store, loaded on first access.
///
/// A missing file starts empty. A corrupted file is logged and also starts
/// empty; it is overwritten by the next successful save.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    records: OnceCell<BTreeMap<String, Record>>,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: OnceCell::new(),
        }
    }

    /// Store in the platform configuration directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_config_dir()?.join(EXPORT_DATA_FILE_NAME)))
    }

    fn records(&self) -> &BTreeMap<String, Record> {
        self.records.get_or_init(|| read_records(&self.path))
    }

    fn write(&self, records: &BTreeMap<String, Record>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
                    path: dir.to_path_buf(),
                    source: Box::new(e),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(records).map_err(|e| Error::ConfigSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        // Write to backup file first, then move it over the original
        let backup_path = self.path.with_file_name(EXPORT_DATA_BACKUP_NAME);
        fs::write(&backup_path, json).map_err(|e| Error::ConfigSave {
            path: backup_path.clone(),
            source: Box::new(e),
        })?;
        fs::rename(&backup_path, &self.path).map_err(|e| Error::ConfigSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        debug!("Export data saved to {}", self.path.display());
        Ok(())
    }
}

fn read_records(path: &Path) -> BTreeMap<String, Record> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            if path.exists() {
                warn!("Cannot read export data from {}: {}", path.display(), e);
            }
            return BTreeMap::new();
        }
    };

    if contents.trim().is_empty() {
        return BTreeMap::new();
    }

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!(
            "Export data at {} is not valid JSON, starting empty: {}",
            path.display(),
            e
        );
        BTreeMap::new()
    })
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Option<Record> {
        self.records().get(key).cloned()
    }

    fn set(&mut self, key: &str, record: Record) -> Result<()> {
        let mut records = self.records().clone();
        records.insert(key.to_string(), record);
        self.write(&records)?;
        self.records = OnceCell::from(records);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    records: BTreeMap<String, Record>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<Record> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, record: Record) -> Result<()> {
        self.records.insert(key.to_string(), record);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
