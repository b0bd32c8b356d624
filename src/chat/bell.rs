//! Decide whether incoming transcript text should ring the terminal bell.

use regex::{Regex, RegexSet, RegexSetBuilder};
use std::path::PathBuf;

/// Pattern matcher consulted for every transcript chunk.
pub trait BellMatcher {
    fn matches(&self, text: &str) -> bool;
}

/// Patterns read from a file, one per line, `grep -f` style.
///
/// The file is re-read on every call so edits take effect immediately. When
/// it is missing or unreadable every chunk matches, i.e. the bell always
/// rings.
#[derive(Debug, Clone)]
pub struct PatternFile {
    path: PathBuf,
}

impl PatternFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BellMatcher for PatternFile {
    fn matches(&self, text: &str) -> bool {
        let patterns = match std::fs::read_to_string(&self.path) {
            Ok(patterns) => patterns,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "no bell patterns; ringing");
                return true;
            }
        };
        compile_patterns(&patterns).is_match(text)
    }
}

/// Build one set from newline-separated patterns.
///
/// An empty pattern line matches everything, as with `grep -f`. A line that
/// is not a valid regular expression is matched literally.
pub fn compile_patterns(source: &str) -> RegexSet {
    let patterns: Vec<String> = source
        .lines()
        .map(|line| {
            if Regex::new(line).is_ok() {
                line.to_string()
            } else {
                tracing::debug!(pattern = line, "invalid bell pattern; matching literally");
                regex::escape(line)
            }
        })
        .collect();
    RegexSetBuilder::new(&patterns)
        .multi_line(true)
        .build()
        .unwrap_or_else(|err| {
            tracing::debug!(%err, "bell pattern set rejected; nothing will match");
            RegexSet::empty()
        })
}
