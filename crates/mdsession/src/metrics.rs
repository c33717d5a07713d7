//! Document statistics shown next to the editor.

use crate::selection::clamp_offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    /// UTF-8 encoded size.
    pub bytes: usize,
    pub lines: usize,
    pub words: usize,
    /// 1-based line of the cursor.
    pub line: usize,
    /// 1-based character column of the cursor.
    pub column: usize,
}

impl Metrics {
    pub fn compute(text: &str, cursor: usize) -> Self {
        let cursor = clamp_offset(text, cursor);
        let before = &text[..cursor];
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);

        Self {
            bytes: text.len(),
            lines: line_count(text),
            words: word_count(text),
            line: line_count(before),
            column: before[line_start..].chars().count() + 1,
        }
    }
}

pub fn line_count(text: &str) -> usize {
    1 + text.bytes().filter(|&b| b == b'\n').count()
}

/// Count maximal runs of ASCII alphanumerics and underscores.
pub fn word_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in text.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !in_word {
            count += 1;
        }
        in_word = is_word;
    }
    count
}
