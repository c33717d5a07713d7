//! Toolbar formatting actions expressed as session commits.

use crate::selection::Selection;
use crate::session::EditSession;

pub const TABLE_SKELETON: &str = "\
| Header 1 | Header 2 | Header 3 |
| -------- | -------- | -------- |
| Cell 1   | Cell 2   | Cell 3   |
| Cell 4   | Cell 5   | Cell 6   |
";

pub const MAX_HEADING_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
    /// Heading level, clamped into `1..=6`.
    Heading(u8),
    Link,
    Quote,
    BulletList,
    Table,
    HorizontalRule,
}

impl EditSession {
    pub fn apply_format(&mut self, action: FormatAction) {
        log::debug!("Applying format {:?}", action);
        match action {
            FormatAction::Bold => self.wrap_selection_with("**"),
            FormatAction::Italic => self.wrap_selection_with("*"),
            FormatAction::Strikethrough => self.wrap_selection_with("~~"),
            FormatAction::InlineCode => self.wrap_selection_with("`"),
            FormatAction::Link => self.wrap_selection("[", "](url)"),
            FormatAction::Heading(level) => self.set_heading(level),
            FormatAction::Quote => self.prefix_line("> "),
            FormatAction::BulletList => self.prefix_line("- "),
            FormatAction::Table => self.insert_table(),
            FormatAction::HorizontalRule => self.insert_at_cursor("\n---\n"),
        }
    }

    /// Replace any existing heading marker on the cursor's line with one of
    /// `level` hashes.
    fn set_heading(&mut self, level: u8) {
        let level = level.clamp(1, MAX_HEADING_LEVEL);
        let marker = format!("{} ", "#".repeat(usize::from(level)));
        let line_start = line_start(self.text(), self.selection().start());
        let existing = heading_marker_len(&self.text()[line_start..]);
        self.replace_line_prefix(line_start, existing, &marker);
    }

    fn prefix_line(&mut self, prefix: &str) {
        let line_start = line_start(self.text(), self.selection().start());
        self.replace_line_prefix(line_start, 0, prefix);
    }

    /// Swap `existing` bytes at `line_start` for `prefix`, keeping the
    /// selection on the same text.
    fn replace_line_prefix(&mut self, line_start: usize, existing: usize, prefix: &str) {
        let selection = self.selection();
        let prefix_end = line_start + existing;
        let shift = |offset: usize| {
            if offset >= prefix_end {
                offset - existing + prefix.len()
            } else {
                line_start + prefix.len()
            }
        };
        let shifted = Selection::new(shift(selection.start()), shift(selection.end()));

        self.set_range_and_commit(prefix, line_start, prefix_end);
        self.set_selection(shifted.start(), shifted.end());
    }

    fn insert_table(&mut self) {
        let selection = self.selection();
        let at_line_start = line_start(self.text(), selection.start()) == selection.start();
        let table = if at_line_start {
            TABLE_SKELETON.to_string()
        } else {
            format!("\n{TABLE_SKELETON}")
        };
        self.set_range_and_commit(&table, selection.start(), selection.end());
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

/// Length of a leading `#... ` heading marker, or 0 when the line has none.
fn heading_marker_len(line: &str) -> usize {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > usize::from(MAX_HEADING_LEVEL) {
        return 0;
    }
    match line.as_bytes().get(hashes) {
        Some(b' ') => hashes + 1,
        _ => 0,
    }
}
