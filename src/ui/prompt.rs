//! Terminal metadata form
//!
//! Presents the export fields one per line. Pressing enter keeps the shown
//! value; flags accept y/yes/true and n/no/false. `--set key=value` overrides
//! are applied before the form is shown, and with `--yes` the form only
//! applies them and generates.

use std::io::{self, BufRead, Stdin, Stdout, Write};

use log::warn;

use crate::export::{ExportData, FieldKind, FieldValue, FormAction, MetadataForm};

/// Parse a `key=value` assignment from the command line.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Line based form over a reader and a writer.
pub struct TerminalForm<R, W> {
    input: R,
    output: W,
    interactive: bool,
    overrides: Vec<(String, String)>,
}

impl TerminalForm<io::StdinLock<'static>, Stdout> {
    /// Form on the process's stdin and stdout.
    pub fn stdio(interactive: bool, overrides: Vec<(String, String)>) -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout(), interactive, overrides)
    }
}

impl<R: BufRead, W: Write> TerminalForm<R, W> {
    pub fn new(input: R, output: W, interactive: bool, overrides: Vec<(String, String)>) -> Self {
        Self {
            input,
            output,
            interactive,
            overrides,
        }
    }

    fn apply_overrides(&self, data: &mut ExportData) {
        for (key, value) in &self.overrides {
            if !data.set(key, value) {
                warn!("Ignoring unknown {} field '{}'", data.name(), key);
            }
        }
    }

    /// Read one trimmed line; `None` at end of input.
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn run(&mut self, data: &mut ExportData) -> io::Result<FormAction> {
        writeln!(self.output, "{}", data.name())?;

        for index in 0..data.load_fields().len() {
            let field = &data.load_fields()[index];
            let prompt = match field.value() {
                FieldValue::Text(text) => format!("  {} [{}] ", field.label(), text),
                FieldValue::Flag(true) => format!("  {} [Y/n] ", field.label()),
                FieldValue::Flag(false) => format!("  {} [y/N] ", field.label()),
            };
            let kind = field.kind();

            let Some(answer) = self.read_answer(&prompt)? else {
                return Ok(FormAction::Cancel);
            };
            if answer.is_empty() {
                continue;
            }

            let field = &mut data.fields_mut()[index];
            match kind {
                FieldKind::Text => field.set_raw(&answer),
                FieldKind::Flag => match parse_yes_no(&answer) {
                    Some(flag) => field.set_raw(&flag.to_string()),
                    None => writeln!(self.output, "  (not a yes/no answer, keeping value)")?,
                },
            }
        }

        match self.read_answer("Generate? [Y/n] ")? {
            Some(answer) if parse_yes_no(&answer) == Some(false) => Ok(FormAction::Cancel),
            Some(_) => Ok(FormAction::Generate),
            None => Ok(FormAction::Cancel),
        }
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

impl<R: BufRead, W: Write> MetadataForm for TerminalForm<R, W> {
    fn edit(&mut self, data: &mut ExportData) -> FormAction {
        self.apply_overrides(data);
        if !self.interactive {
            return FormAction::Generate;
        }

        self.run(data).unwrap_or_else(|e| {
            warn!("Metadata form aborted: {}", e);
            FormAction::Cancel
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportKind;

    fn form(input: &str, interactive: bool) -> TerminalForm<&[u8], Vec<u8>> {
        TerminalForm::new(input.as_bytes(), Vec::new(), interactive, Vec::new())
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("title=My Guide"),
            Ok(("title".to_string(), "My Guide".to_string()))
        );
        assert_eq!(
            parse_assignment("css="),
            Ok(("css".to_string(), String::new()))
        );
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_non_interactive_applies_overrides() {
        let mut data = ExportKind::Pdf.export_data();
        let mut form = TerminalForm::new(
            "".as_bytes(),
            Vec::new(),
            false,
            vec![
                ("title".to_string(), "Guide".to_string()),
                ("generateTOC".to_string(), "TRUE".to_string()),
                ("bogus".to_string(), "1".to_string()),
            ],
        );

        assert_eq!(form.edit(&mut data), FormAction::Generate);
        assert_eq!(data.text("title"), "Guide");
        assert!(data.flag("generateTOC"));
    }

    #[test]
    fn test_interactive_edits_and_keeps_defaults() {
        let mut data = ExportKind::Html.export_data();
        // title, css, inlineCSS, primitiveHTML, fileLinksRelativeTo, openResult, confirm
        let mut form = form("My Page\n\nn\nyes\n\nmaybe\n\n", true);

        assert_eq!(form.edit(&mut data), FormAction::Generate);
        assert_eq!(data.text("title"), "My Page");
        assert_eq!(data.text("css"), "");
        assert!(!data.flag("inlineCSS"));
        assert!(data.flag("primitiveHTML"));
        assert!(!data.flag("openResult"));

        let shown = String::from_utf8(form.output).unwrap();
        assert!(shown.starts_with("HTML export data"));
        assert!(shown.contains("Inline stylesheet [Y/n]"));
        assert!(shown.contains("keeping value"));
    }

    #[test]
    fn test_interactive_decline() {
        let mut data = ExportKind::Html.export_data();
        let mut form = form("\n\n\n\n\n\nno\n", true);
        assert_eq!(form.edit(&mut data), FormAction::Cancel);
    }

    #[test]
    fn test_end_of_input_cancels() {
        let mut data = ExportKind::Pdf.export_data();
        let mut form = form("A5\n", true);
        assert_eq!(form.edit(&mut data), FormAction::Cancel);
        assert_eq!(data.text("pageSize"), "A5");
    }
}
