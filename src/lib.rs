//! lchat: a line-oriented front end for file-based chat systems.
//!
//! The user edits one line at a time while new transcript text scrolls in
//! above it. Submitted lines are appended to an `in` file; the transcript is
//! followed from an `out` file with `tail -f`.
//!
//! # Quick start
//!
//! ```no_run
//! use lchat::chat::{AppendFile, PatternFile};
//! use lchat::repl::{ChatSession, SessionOptions};
//! use lchat::tui::TerminalColumns;
//!
//! let options = SessionOptions {
//!     prompt: "> ".to_string(),
//!     allow_empty_submit: false,
//!     bell_enabled: true,
//!     line_capacity: 8192,
//! };
//! let mut session = ChatSession::new(
//!     options,
//!     TerminalColumns::detect(),
//!     std::io::stdout(),
//!     AppendFile::new("chat/in"),
//!     PatternFile::new(".bellmatch"),
//! );
//! session.handle_key(b'h').unwrap();
//! session.draw().unwrap();
//! ```

pub mod build_info;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod repl;
pub mod tui;
