//! Terminal user-interface building blocks.
//!
//! Stateful input logic (buffer, decoder, editor), layout and redraw, and
//! terminal-mode handling live in separate files so each can be tested
//! without a real terminal.

pub mod input;
pub mod input_buffer;
pub mod input_layout;
pub mod key_decoder;
pub mod settings;
pub mod terminal;

pub use input::LineEditor;
pub use input_buffer::{CursorMove, EditBuffer};
pub use input_layout::{compute_input_layout, InputLayout, LineRenderer};
pub use key_decoder::{DecoderState, EditCommand, EscapeState, KeyDecoder};
pub use terminal::{spawn_signal_watcher, RawModeGuard, TerminalColumns};
