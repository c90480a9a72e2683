//! Output file selection
//!
//! The export asks a [`FileChooser`] where to write its result. The native
//! save dialog uses the rfd crate; the fixed chooser answers with a path given
//! on the command line.

use rfd::FileDialog;
use std::path::PathBuf;

use crate::export::{FileChooser, OutputRequest};

/// Native save dialog filtered to the requested extension.
#[derive(Debug, Clone, Default)]
pub struct DialogFileChooser {
    /// Directory to start in when nothing is suggested
    pub initial_dir: Option<PathBuf>,
}

impl DialogFileChooser {
    pub fn new(initial_dir: Option<PathBuf>) -> Self {
        Self { initial_dir }
    }
}

impl FileChooser for DialogFileChooser {
    fn choose_output(&mut self, request: &OutputRequest) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title(format!("Export {}", request.kind))
            .add_filter(format!("{} Files", request.kind), &[request.extension])
            .add_filter("All Files", &["*"]);

        let suggested_dir = request
            .suggested
            .as_ref()
            .and_then(|path| path.parent())
            .filter(|dir| dir.is_dir())
            .map(|dir| dir.to_path_buf());
        if let Some(dir) = suggested_dir.or_else(|| self.initial_dir.clone()) {
            dialog = dialog.set_directory(dir);
        }

        if let Some(name) = request.suggested.as_ref().and_then(|p| p.file_name()) {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }

        let chosen = dialog.save_file();
        if let Some(path) = &chosen {
            self.initial_dir = path.parent().map(|dir| dir.to_path_buf());
        }
        chosen
    }
}

/// Chooser with a predetermined answer, e.g. from `--output`.
///
/// Without a path it accepts the suggestion, and cancels when there is none.
#[derive(Debug, Clone, Default)]
pub struct FixedFileChooser {
    path: Option<PathBuf>,
}

impl FixedFileChooser {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FileChooser for FixedFileChooser {
    fn choose_output(&mut self, request: &OutputRequest) -> Option<PathBuf> {
        self.path.clone().or_else(|| request.suggested.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(suggested: Option<&str>) -> OutputRequest {
        OutputRequest {
            kind: "PDF",
            extension: "pdf",
            suggested: suggested.map(PathBuf::from),
        }
    }

    #[test]
    fn test_fixed_chooser_prefers_explicit_path() {
        let mut chooser = FixedFileChooser::new(Some(PathBuf::from("out/manual")));
        assert_eq!(
            chooser.choose_output(&request(Some("guide.pdf"))),
            Some(PathBuf::from("out/manual"))
        );
    }

    #[test]
    fn test_fixed_chooser_falls_back_to_suggestion() {
        let mut chooser = FixedFileChooser::new(None);
        assert_eq!(
            chooser.choose_output(&request(Some("guide.pdf"))),
            Some(PathBuf::from("guide.pdf"))
        );
        assert_eq!(chooser.choose_output(&request(None)), None);
    }
}
