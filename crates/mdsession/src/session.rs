use regex::NoExpand;
use std::ops::Range;

use crate::error::PatternError;
use crate::history::{History, Snapshot};
use crate::metrics::Metrics;
use crate::search::{self, SearchState};
use crate::selection::{clamp_offset, Selection};

/// Word inserted between wrappers when nothing is selected.
pub const PLACEHOLDER: &str = "text";

/// The in-memory editing session: buffer, selection, undo/redo history and
/// find/replace state.
///
/// Every operation runs to completion synchronously. Edits that go through a
/// commit are undoable; [`EditSession::set_text`] is not.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    text: String,
    selection: Selection,
    history: History,
    search: SearchState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.set_text(text);
        session
    }

    /// Cap the undo stack at `limit` entries; `None` keeps it unbounded.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = History::with_limit(limit);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.range()]
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        let start = clamp_offset(&self.text, start);
        let end = clamp_offset(&self.text, end);
        self.selection = Selection::new(start, end);
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.set_selection(offset, offset);
    }

    /// Replace the whole buffer without recording history.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selection = Selection::collapsed(self.text.len());
        self.search.rescan(&self.text);
        log::debug!("Buffer replaced ({} bytes)", self.text.len());
    }

    /// Insert `text` over the selection and leave the cursor after it.
    pub fn insert_at_cursor(&mut self, text: &str) {
        let range = self.selection.range();
        let cursor = range.start + text.len();
        let updated = self.spliced(range, text);
        self.commit(updated, Selection::collapsed(cursor));
    }

    pub fn wrap_selection_with(&mut self, wrapper: &str) {
        self.wrap_selection(wrapper, wrapper);
    }

    /// Surround the selection with `prefix`/`suffix` and select the result.
    /// With nothing selected, inserts `prefix + "text" + suffix` instead.
    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str) {
        let selection = self.selection;
        if selection.is_collapsed() {
            self.insert_at_cursor(&format!("{prefix}{PLACEHOLDER}{suffix}"));
            return;
        }

        let wrapped = format!("{prefix}{}{suffix}", self.selected_text());
        let updated = self.spliced(selection.range(), &wrapped);
        let end = selection.end() + prefix.len() + suffix.len();
        self.commit(updated, Selection::new(selection.start(), end));
    }

    /// Replace `[start, end)` with `text`. The cursor lands after the
    /// inserted text.
    pub fn set_range_and_commit(&mut self, text: &str, start: usize, end: usize) {
        let start = clamp_offset(&self.text, start);
        let end = clamp_offset(&self.text, end);
        let range = start.min(end)..start.max(end);
        let cursor = range.start + text.len();
        let updated = self.spliced(range, text);
        self.commit(updated, Selection::collapsed(cursor));
    }

    /// Restore the state preceding the most recent commit.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.history.can_undo() {
            return None;
        }
        let current = self.snapshot();
        let previous = self.history.undo(current)?;
        self.restore(previous);
        log::debug!("Undo (undo depth {})", self.history.undo_depth());
        Some(&self.text)
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.history.can_redo() {
            return None;
        }
        let current = self.snapshot();
        let next = self.history.redo(current)?;
        self.restore(next);
        log::debug!("Redo (redo depth {})", self.history.redo_depth());
        Some(&self.text)
    }

    /// Drop all undo and redo steps, e.g. when a different document is
    /// loaded into the session.
    pub fn reset_history(&mut self) {
        self.history.clear();
        log::debug!("History reset");
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Run a case-insensitive regex search and return the match count. An
    /// empty pattern clears the search.
    pub fn search(&mut self, pattern: &str) -> Result<usize, PatternError> {
        let count = self.search.set_pattern(pattern, &self.text)?;
        log::debug!("Search {:?}: {} matches", pattern, count);
        Ok(count)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn search_pattern(&self) -> &str {
        self.search.pattern()
    }

    pub fn matches(&self) -> &[Range<usize>] {
        self.search.matches()
    }

    pub fn match_count(&self) -> usize {
        self.search.len()
    }

    pub fn current_match_index(&self) -> usize {
        self.search.current_index()
    }

    pub fn current_match(&self) -> Option<Range<usize>> {
        self.search.current()
    }

    /// Move to the next match, wrapping around, and select it.
    pub fn next_match(&mut self) -> Option<Range<usize>> {
        let range = self.search.advance()?;
        self.selection = Selection::from(range.clone());
        Some(range)
    }

    /// Move to the previous match, wrapping around, and select it.
    pub fn prev_match(&mut self) -> Option<Range<usize>> {
        let range = self.search.retreat()?;
        self.selection = Selection::from(range.clone());
        Some(range)
    }

    /// Replace the current match with `replacement`, taken literally. Returns
    /// `false` when there is nothing to replace.
    pub fn replace_current(&mut self, replacement: &str) -> bool {
        let Some(range) = self.search.current() else {
            return false;
        };
        let cursor = range.start + replacement.len();
        let updated = self.spliced(range, replacement);
        self.commit(updated, Selection::collapsed(cursor));
        true
    }

    /// Replace every case-insensitive occurrence of `pattern` with
    /// `replacement`, taken literally, and make `pattern` the active search.
    /// Returns the number of replacements.
    pub fn replace_all(&mut self, pattern: &str, replacement: &str) -> Result<usize, PatternError> {
        if pattern.is_empty() {
            return Ok(0);
        }
        let regex = search::compile(pattern)?;
        let count = regex.find_iter(&self.text).count();
        if count > 0 {
            let updated = regex
                .replace_all(&self.text, NoExpand(replacement))
                .into_owned();
            let cursor = clamp_offset(&updated, self.selection.start());
            self.commit(updated, Selection::collapsed(cursor));
        }
        self.search.activate(pattern, regex, &self.text);
        log::debug!("Replaced {} occurrences of {:?}", count, pattern);
        Ok(count)
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.text, self.selection.start())
    }

    fn spliced(&self, range: Range<usize>, insert: &str) -> String {
        let mut updated = String::with_capacity(self.text.len() - range.len() + insert.len());
        updated.push_str(&self.text[..range.start]);
        updated.push_str(insert);
        updated.push_str(&self.text[range.end..]);
        updated
    }

    fn commit(&mut self, updated: String, selection: Selection) {
        let before = Snapshot {
            text: std::mem::replace(&mut self.text, updated),
            selection: self.selection,
        };
        self.history.record(before);
        self.selection = selection;
        self.search.rescan(&self.text);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.selection = snapshot.selection;
        self.search.rescan(&self.text);
    }
}
