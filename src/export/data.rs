//! Export metadata fields
//!
//! An [`ExportData`] is the ordered set of metadata fields a user edits before
//! exporting one document. Fields are declared statically through
//! [`FieldDescriptor`] lists and carry a tagged [`FieldValue`]. Values cross
//! the [`SettingsStore`] boundary as plain strings, flags as `"true"` and
//! `"false"`.

use std::path::{Path, PathBuf};

use log::debug;

use super::store::{Record, SettingsStore};
use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Field Declarations
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
}

/// Static declaration of one metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Stable key used for persistence and `--set key=value`
    pub key: &'static str,
    /// Label shown in the metadata form
    pub label: &'static str,
    pub kind: FieldKind,
    /// Default value in its string form
    pub default: &'static str,
}

impl FieldDescriptor {
    pub const fn text(key: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            default,
        }
    }

    pub const fn flag(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Flag,
            default: if default { "true" } else { "false" },
        }
    }
}

/// The value of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Interpret a stored string for a field of `kind`.
    ///
    /// Flags are true only for a case-insensitive `"true"`.
    pub fn parse(kind: FieldKind, raw: &str) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(raw.to_string()),
            FieldKind::Flag => FieldValue::Flag(raw.trim().eq_ignore_ascii_case("true")),
        }
    }

    /// String form used by the settings store.
    pub fn to_store_string(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Flag(flag) => flag.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Data
// ─────────────────────────────────────────────────────────────────────────────

/// One field together with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDataValue {
    descriptor: &'static FieldDescriptor,
    value: FieldValue,
}

impl ExportDataValue {
    fn new(descriptor: &'static FieldDescriptor) -> Self {
        Self {
            descriptor,
            value: FieldValue::parse(descriptor.kind, descriptor.default),
        }
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    pub fn label(&self) -> &'static str {
        self.descriptor.label
    }

    pub fn kind(&self) -> FieldKind {
        self.descriptor.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn set_raw(&mut self, raw: &str) {
        self.value = FieldValue::parse(self.descriptor.kind, raw);
    }
}

/// Metadata for one export target, e.g. "PDF export data".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportData {
    name: &'static str,
    fields: Vec<ExportDataValue>,
    /// Record key holding the last generated output file
    output_key: &'static str,
    last_output: Option<PathBuf>,
}

impl ExportData {
    /// Build the data set from a static ordered descriptor list.
    pub fn new(
        name: &'static str,
        descriptors: &'static [FieldDescriptor],
        output_key: &'static str,
    ) -> Self {
        Self {
            name,
            fields: descriptors.iter().map(ExportDataValue::new).collect(),
            output_key,
            last_output: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All fields in declaration order.
    pub fn load_fields(&self) -> &[ExportDataValue] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [ExportDataValue] {
        &mut self.fields
    }

    fn field(&self, key: &str) -> Option<&ExportDataValue> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Text value of `key`; flags are rendered as `"true"`/`"false"` and
    /// unknown keys as an empty string.
    pub fn text(&self, key: &str) -> String {
        self.field(key)
            .map(|f| f.value.to_store_string())
            .unwrap_or_default()
    }

    /// Flag value of `key`; text fields are interpreted like stored strings.
    pub fn flag(&self, key: &str) -> bool {
        match self.field(key).map(|f| &f.value) {
            Some(FieldValue::Flag(flag)) => *flag,
            Some(FieldValue::Text(text)) => text.trim().eq_ignore_ascii_case("true"),
            None => false,
        }
    }

    /// Set `key` from its string form. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, raw: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.key() == key) {
            Some(field) => {
                field.set_raw(raw);
                true
            }
            None => false,
        }
    }

    /// The output file remembered from the last export, if any.
    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }

    pub fn remember_output(&mut self, path: &Path) {
        self.last_output = Some(path.to_path_buf());
    }

    /// Overlay persisted values for `source` onto the current values.
    ///
    /// Fields missing from the record keep their current value. A source with
    /// no record leaves everything untouched.
    pub fn load_export_data(&mut self, store: &dyn SettingsStore, source: &Path) {
        let Some(record) = store.get(&store_key(source)) else {
            debug!("No stored {} for {}", self.name, source.display());
            return;
        };

        for field in &mut self.fields {
            if let Some(raw) = record.get(field.key()) {
                field.set_raw(raw);
            }
        }
        if let Some(output) = record.get(self.output_key) {
            self.last_output = Some(PathBuf::from(output));
        }
        debug!("Loaded {} for {}", self.name, source.display());
    }

    /// Replace the stored record for `source` with every current value.
    pub fn save_export_data(&self, store: &mut dyn SettingsStore, source: &Path) -> Result<()> {
        let mut record: Record = self
            .fields
            .iter()
            .map(|f| (f.key().to_string(), f.value.to_store_string()))
            .collect();
        if let Some(output) = &self.last_output {
            record.insert(
                self.output_key.to_string(),
                output.to_string_lossy().into_owned(),
            );
        }

        store.set(&store_key(source), record)?;
        debug!("Saved {} for {}", self.name, source.display());
        Ok(())
    }

    /// Read only the remembered output file for `source`.
    pub fn stored_output(&self, store: &dyn SettingsStore, source: &Path) -> Option<PathBuf> {
        store
            .get(&store_key(source))
            .and_then(|record| record.get(self.output_key).map(PathBuf::from))
    }
}

fn store_key(source: &Path) -> String {
    source.to_string_lossy().into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::store::MemorySettingsStore;

    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::text("title", "Title:", ""),
        FieldDescriptor::text("pageSize", "Page size:", "A4"),
        FieldDescriptor::flag("generateTOC", "Generate TOC", false),
        FieldDescriptor::flag("inlineCSS", "Inline CSS", true),
    ];

    fn data() -> ExportData {
        ExportData::new("Test export data", FIELDS, "generated.test.file")
    }

    #[test]
    fn test_defaults_follow_descriptors() {
        let data = data();
        let keys: Vec<_> = data.load_fields().iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["title", "pageSize", "generateTOC", "inlineCSS"]);
        assert_eq!(data.text("pageSize"), "A4");
        assert!(!data.flag("generateTOC"));
        assert!(data.flag("inlineCSS"));
    }

    #[test]
    fn test_flag_parsing_is_case_insensitive() {
        assert_eq!(FieldValue::parse(FieldKind::Flag, "TRUE"), FieldValue::Flag(true));
        assert_eq!(FieldValue::parse(FieldKind::Flag, "True"), FieldValue::Flag(true));
        assert_eq!(FieldValue::parse(FieldKind::Flag, "yes"), FieldValue::Flag(false));
        assert_eq!(FieldValue::parse(FieldKind::Flag, ""), FieldValue::Flag(false));
    }

    #[test]
    fn test_flag_store_string() {
        assert_eq!(FieldValue::Flag(true).to_store_string(), "true");
        assert_eq!(FieldValue::Flag(false).to_store_string(), "false");
    }

    #[test]
    fn test_set_unknown_key() {
        let mut data = data();
        assert!(!data.set("nope", "x"));
        assert!(data.set("title", "Guide"));
        assert_eq!(data.text("title"), "Guide");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = MemorySettingsStore::new();
        let source = Path::new("/docs/guide.md");

        let mut first = data();
        first.set("title", "Guide");
        first.set("generateTOC", "true");
        first.remember_output(Path::new("/out/guide.pdf"));
        first.save_export_data(&mut store, source).unwrap();

        let mut second = data();
        second.load_export_data(&store, source);
        assert_eq!(second.text("title"), "Guide");
        assert!(second.flag("generateTOC"));
        assert_eq!(second.text("pageSize"), "A4");
        assert_eq!(second.last_output(), Some(Path::new("/out/guide.pdf")));
    }

    #[test]
    fn test_missing_keys_keep_current_values() {
        let mut store = MemorySettingsStore::new();
        let source = Path::new("a.md");
        let mut record = Record::new();
        record.insert("title".to_string(), "Stored".to_string());
        store.set("a.md", record).unwrap();

        let mut data = data();
        data.set("pageSize", "LETTER");
        data.load_export_data(&store, source);

        assert_eq!(data.text("title"), "Stored");
        assert_eq!(data.text("pageSize"), "LETTER");
        assert!(data.flag("inlineCSS"));
    }

    #[test]
    fn test_load_without_record_is_noop() {
        let store = MemorySettingsStore::new();
        let mut data = data();
        data.set("title", "Kept");
        data.load_export_data(&store, Path::new("unknown.md"));
        assert_eq!(data.text("title"), "Kept");
        assert!(data.stored_output(&store, Path::new("unknown.md")).is_none());
    }

    #[test]
    fn test_save_replaces_record() {
        let mut store = MemorySettingsStore::new();
        let source = Path::new("a.md");
        let mut record = Record::new();
        record.insert("stale".to_string(), "x".to_string());
        store.set("a.md", record).unwrap();

        data().save_export_data(&mut store, source).unwrap();
        let saved = store.get("a.md").unwrap();
        assert!(!saved.contains_key("stale"));
        assert_eq!(saved.get("inlineCSS").map(String::as_str), Some("true"));
    }
}
