//! Page layout for the PDF generator.
//!
//! Text is laid out with the PDF base-14 fonts, so no font files are
//! embedded. Glyph widths are approximated per character class, which is
//! close enough for line wrapping.

use super::options::PageSize;

/// Font used for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl Font {
    /// Name of the font in the page resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
            Font::Mono => "F4",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
            Font::Mono => "Courier",
        }
    }

    pub fn all() -> &'static [Font] {
        &[Font::Regular, Font::Bold, Font::Italic, Font::Mono]
    }

    /// Approximate advance width of `c` in thousandths of the font size.
    fn char_width(&self, c: char) -> f32 {
        if *self == Font::Mono {
            return 600.0;
        }
        let width = match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 240.0,
            ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 300.0,
            'm' | 'w' | 'M' | 'W' | '@' => 850.0,
            c if c.is_ascii_uppercase() => 680.0,
            c if c.is_ascii_digit() => 556.0,
            _ => 540.0,
        };
        if *self == Font::Bold {
            width * 1.06
        } else {
            width
        }
    }

    /// Width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum::<f32>() * size / 1000.0
    }
}

/// A piece of text in one font. A run consisting of `"\n"` forces a line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub font: Font,
    pub text: String,
}

impl Run {
    pub fn new(font: Font, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
        }
    }

    pub fn line_break() -> Self {
        Self::new(Font::Regular, "\n")
    }

    fn is_break(&self) -> bool {
        self.text == "\n"
    }
}

/// A drawing operation placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOp {
    Text {
        font: Font,
        size: f32,
        x: f32,
        y: f32,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

/// Accumulates drawing operations, breaking pages as the cursor runs out of room.
#[derive(Debug)]
pub struct PageBuilder {
    width: f32,
    height: f32,
    margin: f32,
    cursor_y: f32,
    current: Vec<PageOp>,
    pages: Vec<Vec<PageOp>>,
}

impl PageBuilder {
    pub const MARGIN: f32 = 56.0;

    pub fn new(page_size: PageSize) -> Self {
        let (width, height) = page_size.dimensions();
        Self {
            width,
            height,
            margin: Self::MARGIN,
            cursor_y: height - Self::MARGIN,
            current: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Zero based index of the page currently being filled.
    pub fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn usable_width(&self, indent: f32) -> f32 {
        (self.width - 2.0 * self.margin - indent).max(40.0)
    }

    pub fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.cursor_y = self.height - self.margin;
    }

    /// Start a new page unless `needed` points still fit on this one.
    pub fn ensure_space(&mut self, needed: f32) {
        if self.cursor_y - needed < self.margin && !self.current.is_empty() {
            self.new_page();
        }
    }

    pub fn gap(&mut self, amount: f32) {
        self.cursor_y -= amount;
    }

    /// Move the cursor to `y` measured from the bottom of the page.
    pub fn move_to(&mut self, y: f32) {
        self.cursor_y = y;
    }

    pub fn rule(&mut self) {
        self.ensure_space(12.0);
        self.cursor_y -= 6.0;
        let y = self.cursor_y;
        self.current.push(PageOp::Rule {
            x1: self.margin,
            x2: self.width - self.margin,
            y,
        });
        self.cursor_y -= 6.0;
    }

    /// Word-wrap `runs` at `size` points, starting `indent` points from the margin.
    ///
    /// `hanging` is placed before the first line only, e.g. a list bullet.
    pub fn paragraph(&mut self, runs: &[Run], size: f32, indent: f32, hanging: Option<&Run>) {
        let max_width = self.usable_width(indent);
        let leading = size * 1.35;
        let mut lines = wrap(runs, size, max_width);
        if lines.is_empty() && hanging.is_some() {
            lines.push(Vec::new());
        }

        for (index, line) in lines.into_iter().enumerate() {
            self.ensure_space(leading);
            self.cursor_y -= leading;
            let y = self.cursor_y;
            let mut x = self.margin + indent;

            if index == 0 {
                if let Some(marker) = hanging {
                    let marker_width = marker.font.measure(&marker.text, size);
                    self.push_text(marker.font, size, x - marker_width, y, &marker.text);
                }
            }

            for run in line {
                let width = run.font.measure(&run.text, size);
                self.push_text(run.font, size, x, y, &run.text);
                x += width;
            }
        }
    }

    /// Lines of preformatted text; long lines are broken by character.
    pub fn preformatted(&mut self, text: &str, size: f32, indent: f32) {
        let leading = size * 1.3;
        let max_chars = (self.usable_width(indent) / Font::Mono.measure("M", size)).floor() as usize;
        let max_chars = max_chars.max(1);

        for source_line in text.lines() {
            let chars: Vec<char> = source_line.chars().collect();
            let chunks: Vec<String> = if chars.is_empty() {
                vec![String::new()]
            } else {
                chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
            };
            for chunk in chunks {
                self.ensure_space(leading);
                self.cursor_y -= leading;
                let y = self.cursor_y;
                let x = self.margin + indent;
                self.push_text(Font::Mono, size, x, y, &chunk);
            }
        }
    }

    /// One line of text centered horizontally.
    pub fn centered(&mut self, text: &str, font: Font, size: f32) {
        let leading = size * 1.4;
        self.ensure_space(leading);
        self.cursor_y -= leading;
        let x = ((self.width - font.measure(text, size)) / 2.0).max(self.margin);
        let y = self.cursor_y;
        self.push_text(font, size, x, y, text);
    }

    /// A line with `left` at the margin and `right` flush against the right margin.
    pub fn justified_pair(&mut self, left: &str, right: &str, font: Font, size: f32, indent: f32) {
        let leading = size * 1.5;
        self.ensure_space(leading);
        self.cursor_y -= leading;
        let y = self.cursor_y;

        let right_width = font.measure(right, size);
        let right_x = self.width - self.margin - right_width;
        let available = right_x - (self.margin + indent) - font.measure("  ", size);
        let left = truncate_to_width(left, font, size, available);

        self.push_text(font, size, self.margin + indent, y, &left);
        self.push_text(font, size, right_x, y, right);
    }

    fn push_text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current.push(PageOp::Text {
            font,
            size,
            x,
            y,
            text: text.to_string(),
        });
    }

    /// Finish the last page and return all pages.
    pub fn finish(mut self) -> Vec<Vec<PageOp>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Split runs into lines no wider than `max_width`.
fn wrap(runs: &[Run], size: f32, max_width: f32) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut line_width = 0.0;
    let mut pending_space = false;

    for run in runs {
        if run.is_break() {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
            pending_space = false;
            continue;
        }

        if run.text.starts_with(char::is_whitespace) {
            pending_space = true;
        }

        let mut words = run.text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            let space = if pending_space && !line.is_empty() {
                run.font.measure(" ", size)
            } else {
                0.0
            };
            let word_width = run.font.measure(word, size);

            if !line.is_empty() && line_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }

            let text = if line.is_empty() || space == 0.0 {
                word.to_string()
            } else {
                format!(" {}", word)
            };
            line_width += run.font.measure(&text, size);
            push_run(&mut line, Run::new(run.font, text));
            pending_space = words.peek().is_some();
        }

        if run.text.ends_with(char::is_whitespace) {
            pending_space = true;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Append to the last run when the font matches, keeping output compact.
fn push_run(line: &mut Vec<Run>, run: Run) {
    match line.last_mut() {
        Some(last) if last.font == run.font => last.text.push_str(&run.text),
        _ => line.push(run),
    }
}

fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if font.measure(text, size) <= max_width {
        return text.to_string();
    }
    let ellipsis = "...";
    let budget = max_width - font.measure(ellipsis, size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let w = font.measure(c.encode_utf8(&mut [0; 4]), size);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Encode text for the base-14 fonts (WinAnsiEncoding); unmappable characters become '?'.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
