//! CLI argument parsing via clap.

use clap::Parser;
use lchat::build_info;
use lchat::config::CliOverrides;
use std::path::PathBuf;

/// Line-oriented front end for file-based chat systems.
///
/// Appends submitted lines to `<directory>/in` while following
/// `<directory>/out` above the input line.
#[derive(Debug, Parser)]
#[command(
    name = "lchat",
    version,
    long_version = build_info::LONG_VERSION,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Chat directory holding the `in` and `out` files.
    pub directory: Option<PathBuf>,

    /// Do not ring the bell on matching transcript lines.
    #[arg(short = 'a')]
    pub no_alert: bool,

    /// Submit empty lines instead of quitting on them.
    #[arg(short = 'e')]
    pub empty_lines: bool,

    /// Transcript lines to replay on start.
    #[arg(short = 'n', value_name = "LINES")]
    pub history_lines: Option<usize>,

    /// Prompt shown before the input line.
    #[arg(short = 'p', value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Terminal window title.
    #[arg(short = 't', value_name = "TITLE")]
    pub title: Option<String>,

    /// File submitted lines are appended to (default: <directory>/in).
    #[arg(short = 'i', value_name = "IN")]
    pub in_file: Option<PathBuf>,

    /// File the transcript is read from (default: <directory>/out).
    #[arg(short = 'o', value_name = "OUT")]
    pub out_file: Option<PathBuf>,

    /// Path to config file (default: ~/.config/lchat/lchat.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// The subset of flags that take part in config resolution.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            directory: self.directory.clone(),
            in_file: self.in_file.clone(),
            out_file: self.out_file.clone(),
            prompt: self.prompt.clone(),
            title: self.title.clone(),
            history_lines: self.history_lines,
            no_bell: self.no_alert,
            empty_lines: self.empty_lines,
            log_file: self.log_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn short_flags_map_to_overrides() {
        let args = Args::parse_from([
            "lchat", "-a", "-e", "-n", "20", "-p", "$ ", "-t", "#rust", "-i", "fifo", "-o",
            "log", "chat",
        ]);
        let o = args.overrides();
        assert!(o.no_bell);
        assert!(o.empty_lines);
        assert_eq!(o.history_lines, Some(20));
        assert_eq!(o.prompt.as_deref(), Some("$ "));
        assert_eq!(o.title.as_deref(), Some("#rust"));
        assert_eq!(o.in_file, Some(PathBuf::from("fifo")));
        assert_eq!(o.out_file, Some(PathBuf::from("log")));
        assert_eq!(o.directory, Some(PathBuf::from("chat")));
    }

    #[test]
    fn no_arguments_leaves_everything_unset() {
        let o = Args::parse_from(["lchat"]).overrides();
        assert_eq!(o, lchat::config::CliOverrides::default());
    }

    #[test]
    fn combined_short_switches_parse() {
        let args = Args::parse_from(["lchat", "-ae"]);
        assert!(args.no_alert);
        assert!(args.empty_lines);
    }

    #[test]
    fn config_and_log_file_long_flags() {
        let args = Args::parse_from(["lchat", "--config", "a.toml", "--log-file", "l.log"]);
        assert_eq!(args.config, Some(PathBuf::from("a.toml")));
        assert_eq!(args.log_file, Some(PathBuf::from("l.log")));
    }

    #[test]
    fn non_numeric_history_is_rejected() {
        assert!(Args::try_parse_from(["lchat", "-n", "many"]).is_err());
    }

    #[test]
    fn help_carries_build_metadata() {
        let err = Args::try_parse_from(["lchat", "--help"]).unwrap_err();
        assert!(err.to_string().contains("Build metadata:"));
    }
}
