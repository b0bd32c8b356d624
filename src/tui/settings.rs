//! Centralized, hardcoded settings for the terminal interface.
//!
//! This is the single place to tweak control bytes, escape sequences,
//! buffer sizes, and fallbacks.

// ---------------------------------------------------------------------------
// Input bytes
// ---------------------------------------------------------------------------

/// Carriage return; submits the line in raw mode.
pub const KEY_RETURN: u8 = 0x0D;

// ---------------------------------------------------------------------------
// Output sequences
// ---------------------------------------------------------------------------

pub const BELL: &[u8] = b"\x07";
pub const CARRIAGE_RETURN: &str = "\r";
pub const WRAP_NEWLINE: &str = "\n";

/// Title sequence understood by GNU screen (`ESC k title ESC \`).
pub const TITLE_SCREEN_PREFIX: &str = "\x1bk";
pub const TITLE_SCREEN_SUFFIX: &str = "\x1b\\";
/// xterm-style OSC 0 title sequence.
pub const TITLE_XTERM_PREFIX: &str = "\x1b]0;";
pub const TITLE_XTERM_SUFFIX: &str = "\x07";

// ---------------------------------------------------------------------------
// Sizes / fallbacks
// ---------------------------------------------------------------------------

pub const DEFAULT_PROMPT: &str = ">";
pub const DEFAULT_LINE_CAPACITY: usize = 8192;
pub const TRANSCRIPT_CHUNK_BYTES: usize = 8192;
pub const FALLBACK_COLUMNS: u16 = 80;
