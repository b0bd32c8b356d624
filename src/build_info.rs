//! Compile-time build metadata exposed on the command line.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("LCHAT_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("LCHAT_BUILD_TIMESTAMP");

/// `lchat --version` body (clap prefixes the binary name).
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("LCHAT_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("LCHAT_BUILD_TIMESTAMP")
);

/// Help trailer block that surfaces build metadata in `lchat --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("LCHAT_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("LCHAT_BUILD_TIMESTAMP")
);

/// One-line summary written to the log at startup.
pub fn startup_metadata_line() -> String {
    format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_metadata_line_contains_all_fields() {
        let text = startup_metadata_line();
        assert!(text.starts_with('v'));
        assert!(text.contains(GIT_COMMIT));
        assert!(text.contains(BUILD_TIMESTAMP));
    }

    #[test]
    fn long_version_lists_commit_and_build_time() {
        assert!(LONG_VERSION.starts_with(VERSION));
        assert!(LONG_VERSION.contains("commit:"));
        assert!(LONG_VERSION.contains("built:"));
    }
}
