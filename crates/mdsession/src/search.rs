//! Case-insensitive regex search over the buffer.

use regex::{Regex, RegexBuilder};
use std::ops::Range;

use crate::error::PatternError;

/// Compile `pattern` the way every search in the session does.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })
}

/// Active pattern, its matches in the current buffer and the highlighted one.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pattern: String,
    regex: Option<Regex>,
    matches: Vec<Range<usize>>,
    current: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Replace the pattern and rescan `text`. On a compile error the previous
    /// state is left untouched.
    pub fn set_pattern(&mut self, pattern: &str, text: &str) -> Result<usize, PatternError> {
        if pattern.is_empty() {
            self.clear();
            return Ok(0);
        }
        let regex = compile(pattern)?;
        self.activate(pattern, regex, text);
        Ok(self.matches.len())
    }

    pub(crate) fn activate(&mut self, pattern: &str, regex: Regex, text: &str) {
        self.pattern = pattern.to_string();
        self.regex = Some(regex);
        self.rescan(text);
    }

    pub fn clear(&mut self) {
        self.pattern.clear();
        self.regex = None;
        self.matches.clear();
        self.current = 0;
    }

    /// Recompute match offsets after the buffer changed.
    pub fn rescan(&mut self, text: &str) {
        self.matches = match &self.regex {
            Some(regex) => regex.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        };
        self.current = 0;
    }

    pub fn matches(&self) -> &[Range<usize>] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<Range<usize>> {
        self.matches.get(self.current).cloned()
    }

    pub fn advance(&mut self) -> Option<Range<usize>> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current()
    }

    pub fn retreat(&mut self) -> Option<Range<usize>> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        self.current = (self.current + len - 1) % len;
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_is_case_insensitive() {
        let regex = compile("hello").unwrap();
        assert!(regex.is_match("HeLLo there"));
    }

    #[test]
    fn test_compile_error_keeps_pattern() {
        let err = compile("(unclosed").unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_failed_pattern_keeps_previous_state() {
        let mut state = SearchState::new();
        state.set_pattern("foo", "foo bar foo").unwrap();
        state.advance();

        assert!(state.set_pattern("[", "foo bar foo").is_err());
        assert_eq!(state.pattern(), "foo");
        assert_eq!(state.matches(), &[0..3, 8..11]);
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn test_match_ranges_use_actual_match_length() {
        let mut state = SearchState::new();
        state.set_pattern("a+", "baaad a").unwrap();
        assert_eq!(state.matches(), &[1..4, 6..7]);
    }

    #[test]
    fn test_retreat_wraps_to_last() {
        let mut state = SearchState::new();
        state.set_pattern("x", "x x x").unwrap();
        assert_eq!(state.retreat(), Some(4..5));
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn test_navigation_without_matches() {
        let mut state = SearchState::new();
        state.set_pattern("zzz", "abc").unwrap();
        assert!(state.is_active());
        assert!(state.advance().is_none());
        assert!(state.retreat().is_none());
        assert_eq!(state.current_index(), 0);
    }
}
