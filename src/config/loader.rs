//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::resolve::resolve_config;
use super::sources::{config_root_dir, read_config_text_with_sources, ConfigSource};
use super::{CliOverrides, Config, FileConfig};

/// Load configuration from the command line, dotfiles and config file.
pub fn load_config(cli: &CliOverrides) -> Result<Config, ConfigError> {
    load_config_from_sources(cli, |path| std::fs::read_to_string(path), config_root_dir)
}

pub(super) fn load_config_from_sources<FRead, FRoot>(
    cli: &CliOverrides,
    read_file: FRead,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(cli.config_path.as_deref(), &read_file, &config_root)?;
    let parsed: FileConfig = toml::from_str(&config_text)?;
    match &source {
        ConfigSource::Explicit(path) | ConfigSource::Global(path) => {
            tracing::debug!(path = %path.display(), "loaded config file");
        }
        ConfigSource::BuiltInDefaults => tracing::debug!("no config file; using defaults"),
    }
    resolve_config(parsed, cli, &read_file)
}
