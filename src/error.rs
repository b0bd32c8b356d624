//! Unified error types for the line editor and chat session.

use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EditError
// ---------------------------------------------------------------------------

/// Why a byte sequence was rejected as UTF-8 input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Fault {
    /// A continuation byte arrived with no rune in progress.
    UnexpectedContinuation(u8),
    /// A byte that can never start a rune (0xC0, 0xC1, 0xF5..=0xFF).
    InvalidLead(u8),
    /// A non-continuation byte arrived while a rune was still incomplete.
    Interrupted(u8),
    /// The assembled bytes are not a well-formed scalar value.
    Malformed,
    /// The announced rune length does not fit in the remaining capacity.
    NoRoom,
}

impl std::fmt::Display for Utf8Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedContinuation(b) => {
                write!(f, "continuation byte {b:#04x} without a lead byte")
            }
            Self::InvalidLead(b) => write!(f, "byte {b:#04x} cannot start a rune"),
            Self::Interrupted(b) => write!(f, "byte {b:#04x} interrupted a multi-byte rune"),
            Self::Malformed => write!(f, "malformed multi-byte sequence"),
            Self::NoRoom => write!(f, "rune does not fit in the line buffer"),
        }
    }
}

/// Errors raised while applying a keystroke to the edit buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("line buffer full: {needed} bytes needed, capacity is {capacity}")]
    BufferFull { capacity: usize, needed: usize },
    #[error("invalid UTF-8 input: {0}")]
    InvalidUtf8(Utf8Fault),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Fatal conditions that end an interactive session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("append to {path:?}: {source}")]
    Outbox {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("transcript: {0}")]
    Transcript(std::io::Error),
    #[error("terminal: {0}")]
    Terminal(std::io::Error),
    #[error("keyboard input closed")]
    KeyboardClosed,
    #[error("tail command exited")]
    UpstreamClosed,
    #[error("standard input is not a terminal")]
    NotATerminal,
}

// ---------------------------------------------------------------------------
// LchatError (top level)
// ---------------------------------------------------------------------------

/// Top-level error type for the binary.
#[derive(Debug, Error)]
pub enum LchatError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("logging: {0}")]
    Logging(#[from] crate::logging::InitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_error_display() {
        assert_eq!(
            EditError::BufferFull {
                capacity: 4,
                needed: 6
            }
            .to_string(),
            "line buffer full: 6 bytes needed, capacity is 4"
        );
        assert_eq!(
            EditError::InvalidUtf8(Utf8Fault::UnexpectedContinuation(0x80)).to_string(),
            "invalid UTF-8 input: continuation byte 0x80 without a lead byte"
        );
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn session_error_wraps_edit_error_transparently() {
        let e = SessionError::from(EditError::InvalidUtf8(Utf8Fault::Malformed));
        assert_eq!(e.to_string(), "invalid UTF-8 input: malformed multi-byte sequence");
    }

    #[test]
    fn top_level_error_from_session_error() {
        let e = LchatError::from(SessionError::UpstreamClosed);
        assert_eq!(e.to_string(), "tail command exited");
    }
}
