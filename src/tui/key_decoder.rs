//! Byte-at-a-time keystroke decoder.
//!
//! Keyboard input arrives one byte per read. The decoder is a finite-state
//! machine over `(DecoderState, ByteClass)`: every pair is listed in
//! [`KeyDecoder::step`], so unknown input has a defined outcome instead of
//! falling through nested conditionals.

use crate::error::{EditError, Utf8Fault};
use crate::tui::input_buffer::{CursorMove, EditBuffer};

/// Escape-sequence progress, as seen from outside the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    None,
    Esc,
    EscBracket,
}

/// A multi-byte rune whose continuation bytes have not all arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRune {
    bytes: [u8; 4],
    have: u8,
    need: u8,
}

impl PendingRune {
    fn start(lead: u8, need: u8) -> Self {
        Self {
            bytes: [lead, 0, 0, 0],
            have: 1,
            need,
        }
    }

    /// Continuation bytes buffered so far, lead byte included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.have)]
    }
}

/// Decoder state; `Utf8` carries the pending bytes so they cannot outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    #[default]
    Ground,
    Escape,
    EscapeBracket,
    Utf8(PendingRune),
}

/// Coarse classification of one input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Escape,
    Backspace,
    /// C0 controls other than ESC and backspace.
    Control,
    /// Printable ASCII, a complete rune on its own.
    Ascii,
    /// Lead byte of a rune with the given total length (2..=4).
    Lead(u8),
    Continuation,
    /// Never valid in UTF-8.
    Invalid,
}

impl ByteClass {
    pub fn of(byte: u8) -> Self {
        match byte {
            0x1B => Self::Escape,
            0x08 | 0x7F => Self::Backspace,
            0x00..=0x1F => Self::Control,
            0x20..=0x7E => Self::Ascii,
            0x80..=0xBF => Self::Continuation,
            0xC2..=0xDF => Self::Lead(2),
            0xE0..=0xEF => Self::Lead(3),
            0xF0..=0xF4 => Self::Lead(4),
            0xC0 | 0xC1 | 0xF5..=0xFF => Self::Invalid,
        }
    }
}

/// Edit applied to the buffer as the result of one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Insert(char),
    DeleteBack,
    Move(CursorMove),
}

/// What the decoder decided for one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Discard,
    Apply(EditCommand),
}

/// Escape/UTF-8 decoder driving an [`EditBuffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn escape_state(&self) -> EscapeState {
        match self.state {
            DecoderState::Escape => EscapeState::Esc,
            DecoderState::EscapeBracket => EscapeState::EscBracket,
            DecoderState::Ground | DecoderState::Utf8(_) => EscapeState::None,
        }
    }

    /// Bytes of an incomplete rune; empty unless one is being assembled.
    pub fn pending_bytes(&self) -> &[u8] {
        match &self.state {
            DecoderState::Utf8(pending) => pending.as_bytes(),
            _ => &[],
        }
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::Ground;
    }

    /// Decode one byte and apply the resulting edit to `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidUtf8`] for bytes that break UTF-8 framing and
    /// [`EditError::BufferFull`] when an insert does not fit. On error neither
    /// the buffer nor the decoder state changes.
    pub fn feed(&mut self, buffer: &mut EditBuffer, byte: u8) -> Result<(), EditError> {
        let class = ByteClass::of(byte);
        let (action, next) = Self::step(self.state, class, byte, buffer.remaining())?;
        match action {
            Action::None => {}
            Action::Discard => {
                tracing::trace!(byte, state = ?self.state, "discarding unrecognised input");
            }
            Action::Apply(EditCommand::Insert(ch)) => buffer.insert_rune(ch)?,
            Action::Apply(EditCommand::DeleteBack) => {
                buffer.delete_rune_before_cursor();
            }
            Action::Apply(EditCommand::Move(direction)) => buffer.move_cursor(direction),
        }
        self.state = next;
        Ok(())
    }

    /// The transition table. Pure: no side effects on the buffer.
    fn step(
        state: DecoderState,
        class: ByteClass,
        byte: u8,
        room: usize,
    ) -> Result<(Action, DecoderState), EditError> {
        use DecoderState::{EscapeBracket, Ground, Utf8};

        let invalid = |fault| Err(EditError::InvalidUtf8(fault));
        let next = match (state, class) {
            (Ground, ByteClass::Escape) => (Action::None, DecoderState::Escape),
            (Ground, ByteClass::Backspace) => (Action::Apply(EditCommand::DeleteBack), Ground),
            (Ground, ByteClass::Control) => (Action::Discard, Ground),
            (Ground, ByteClass::Ascii) => {
                (Action::Apply(EditCommand::Insert(char::from(byte))), Ground)
            }
            (Ground, ByteClass::Lead(need)) => {
                if usize::from(need) > room {
                    return invalid(Utf8Fault::NoRoom);
                }
                (Action::None, Utf8(PendingRune::start(byte, need)))
            }
            (Ground, ByteClass::Continuation) => {
                return invalid(Utf8Fault::UnexpectedContinuation(byte))
            }
            (Ground, ByteClass::Invalid) => return invalid(Utf8Fault::InvalidLead(byte)),

            (DecoderState::Escape, ByteClass::Ascii) if byte == b'[' => {
                (Action::None, EscapeBracket)
            }
            (DecoderState::Escape, _) => (Action::Discard, Ground),

            (EscapeBracket, ByteClass::Ascii) if byte == b'C' => {
                (Action::Apply(EditCommand::Move(CursorMove::Right)), Ground)
            }
            (EscapeBracket, ByteClass::Ascii) if byte == b'D' => {
                (Action::Apply(EditCommand::Move(CursorMove::Left)), Ground)
            }
            (EscapeBracket, _) => (Action::Discard, Ground),

            (Utf8(mut pending), ByteClass::Continuation) => {
                pending.bytes[usize::from(pending.have)] = byte;
                pending.have += 1;
                if pending.have < pending.need {
                    (Action::None, Utf8(pending))
                } else {
                    let ch = std::str::from_utf8(pending.as_bytes())
                        .ok()
                        .and_then(|s| s.chars().next());
                    match ch {
                        Some(ch) => (Action::Apply(EditCommand::Insert(ch)), Ground),
                        None => return invalid(Utf8Fault::Malformed),
                    }
                }
            }
            (
                Utf8(_),
                ByteClass::Escape
                | ByteClass::Backspace
                | ByteClass::Control
                | ByteClass::Ascii
                | ByteClass::Lead(_)
                | ByteClass::Invalid,
            ) => return invalid(Utf8Fault::Interrupted(byte)),
        };
        Ok(next)
    }
}
