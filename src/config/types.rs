//! Configuration data model.
//!
//! `FileConfig` mirrors the TOML file, `CliOverrides` carries what was given
//! on the command line, and `Config` is the resolved result the binary runs
//! with.

use serde::Deserialize;
use std::path::PathBuf;

/// Settings read from `lchat.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub prompt: Option<String>,
    pub title: Option<String>,
    pub history_lines: Option<usize>,
    /// Ring the bell on matching transcript text.
    pub bell: Option<bool>,
    pub bell_file: Option<PathBuf>,
    pub filter_file: Option<PathBuf>,
    /// Submit empty lines instead of quitting on them.
    pub empty_lines: Option<bool>,
    pub line_capacity: Option<usize>,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; these win over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub in_file: Option<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub prompt: Option<String>,
    pub title: Option<String>,
    pub history_lines: Option<usize>,
    pub no_bell: bool,
    pub empty_lines: bool,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub directory: PathBuf,
    /// Outbox: submitted lines are appended here.
    pub in_file: PathBuf,
    /// Transcript source followed with `tail -f`.
    pub out_file: PathBuf,
    pub prompt: String,
    pub title: Option<String>,
    pub history_lines: usize,
    pub bell: bool,
    pub bell_file: PathBuf,
    pub filter_file: PathBuf,
    pub empty_lines: bool,
    pub line_capacity: usize,
    pub log_file: Option<PathBuf>,
}
