//! Line editor: one edit buffer driven by one key decoder.
//!
//! The editor exposes a minimal API (`feed`, `reset`) so the
//! session loop owns submission and quitting while this module owns editing
//! mechanics.

use crate::error::EditError;
use crate::tui::input_buffer::EditBuffer;
use crate::tui::key_decoder::{EscapeState, KeyDecoder};

/// In-progress input line plus decoder state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    buffer: EditBuffer,
    decoder: KeyDecoder,
}

impl LineEditor {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: EditBuffer::with_capacity(capacity),
            decoder: KeyDecoder::new(),
        }
    }

    /// Apply one keyboard byte.
    ///
    /// # Errors
    ///
    /// Propagates decoder failures; the line is unchanged when one occurs.
    pub fn feed(&mut self, byte: u8) -> Result<(), EditError> {
        self.decoder.feed(&mut self.buffer, byte)
    }

    /// Apply a run of keyboard bytes, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first decoder failure; earlier bytes stay applied.
    pub fn feed_all(&mut self, bytes: &[u8]) -> Result<(), EditError> {
        bytes.iter().try_for_each(|byte| self.feed(*byte))
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn escape_state(&self) -> EscapeState {
        self.decoder.escape_state()
    }

    pub fn pending_bytes(&self) -> &[u8] {
        self.decoder.pending_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear text, cursor, escape progress, and pending rune bytes.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.decoder.reset();
    }
}
