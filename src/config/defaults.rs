//! Default configuration constants.

pub(super) use crate::tui::settings::{DEFAULT_LINE_CAPACITY, DEFAULT_PROMPT};

/// Records replayed from the transcript before following it.
pub(super) const DEFAULT_HISTORY_LINES: usize = 5;
/// Chat directory when none is given on the command line.
pub(super) const DEFAULT_DIRECTORY: &str = ".";
/// Outbox file name inside the chat directory.
pub(super) const IN_FILE_NAME: &str = "in";
/// Transcript file name inside the chat directory.
pub(super) const OUT_FILE_NAME: &str = "out";

// Dotfiles are looked up in the working directory, not the chat directory.
pub(super) const PROMPT_DOTFILE: &str = ".prompt";
pub(super) const TITLE_DOTFILE: &str = ".title";
pub(super) const DEFAULT_BELL_FILE: &str = ".bellmatch";
pub(super) const DEFAULT_FILTER_FILE: &str = ".filter";

/// `$XDG_CONFIG_HOME/<dir>/<file>`.
pub(super) const CONFIG_DIR_NAME: &str = "lchat";
pub(super) const CONFIG_FILE_NAME: &str = "lchat.toml";
