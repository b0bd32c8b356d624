//! Configuration loading from the command line, dotfiles and a TOML file.
//!
//! Config is resolved in this order of precedence (highest wins):
//! 1. Command-line flags.
//! 2. `.prompt` / `.title` in the working directory (first line only).
//! 3. TOML file given via `--config`, else
//!    `$XDG_CONFIG_HOME/lchat/lchat.toml` (or `~/.config/lchat/lchat.toml`).
//! 4. Built-in defaults.

mod defaults;
mod loader;
mod resolve;
mod sources;
mod types;

pub use loader::load_config;
pub use sources::config_root_dir;
pub use types::{CliOverrides, Config, FileConfig};
