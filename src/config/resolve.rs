//! Merge command line, dotfiles, config file and defaults into a `Config`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{
    DEFAULT_BELL_FILE, DEFAULT_DIRECTORY, DEFAULT_FILTER_FILE, DEFAULT_HISTORY_LINES,
    DEFAULT_LINE_CAPACITY, DEFAULT_PROMPT, IN_FILE_NAME, OUT_FILE_NAME, PROMPT_DOTFILE,
    TITLE_DOTFILE,
};
use super::{CliOverrides, Config, FileConfig};

/// Resolve every setting; highest precedence first:
/// command line, dotfile (prompt and title only), config file, default.
pub(super) fn resolve_config<FRead>(
    file: FileConfig,
    cli: &CliOverrides,
    read_file: &FRead,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let directory = cli
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY));
    let in_file = cli
        .in_file
        .clone()
        .unwrap_or_else(|| directory.join(IN_FILE_NAME));
    let out_file = cli
        .out_file
        .clone()
        .unwrap_or_else(|| directory.join(OUT_FILE_NAME));

    let prompt = cli
        .prompt
        .clone()
        .or_else(|| first_line(read_file, PROMPT_DOTFILE))
        .or(file.prompt)
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
    let title = cli
        .title
        .clone()
        .or_else(|| first_line(read_file, TITLE_DOTFILE))
        .or(file.title);

    let line_capacity = file.line_capacity.unwrap_or(DEFAULT_LINE_CAPACITY);

    let config = Config {
        directory,
        in_file,
        out_file,
        prompt,
        title,
        history_lines: cli
            .history_lines
            .or(file.history_lines)
            .unwrap_or(DEFAULT_HISTORY_LINES),
        bell: !cli.no_bell && file.bell.unwrap_or(true),
        bell_file: file
            .bell_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BELL_FILE)),
        filter_file: file
            .filter_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILTER_FILE)),
        empty_lines: cli.empty_lines || file.empty_lines.unwrap_or(false),
        line_capacity,
        log_file: cli.log_file.clone().or(file.log_file),
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.line_capacity == 0 {
        return Err(ConfigError::Invalid(
            "line_capacity must be greater than zero".to_string(),
        ));
    }
    if config.prompt.chars().any(char::is_control) {
        return Err(ConfigError::Invalid(format!(
            "prompt {:?} contains control characters",
            config.prompt
        )));
    }
    if let Some(title) = &config.title {
        if title.chars().any(char::is_control) {
            return Err(ConfigError::Invalid(format!(
                "title {title:?} contains control characters"
            )));
        }
    }
    Ok(())
}

/// First line of a dotfile, without its terminator. Missing file is `None`.
fn first_line<FRead>(read_file: &FRead, name: &str) -> Option<String>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let text = read_file(Path::new(name)).ok()?;
    let line = text.lines().next().unwrap_or_default();
    Some(line.to_string())
}
