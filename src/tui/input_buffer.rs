//! Editable single-line buffer with dual byte/rune cursor bookkeeping.
//!
//! Every mutation goes through one of four primitives (`insert_rune`,
//! `delete_rune_before_cursor`, `move_cursor`, `reset`). Each primitive
//! updates the byte and rune counters together; neither is ever derived
//! from the other after the fact.

use crate::error::EditError;

/// Direction of a one-rune cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
}

/// Line contents plus cursor, bounded by a fixed byte capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    content: String,
    capacity: usize,
    rune_len: usize,
    cursor_byte: usize,
    cursor_rune: usize,
}

impl EditBuffer {
    /// Allocate an empty buffer that can hold up to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            content: String::with_capacity(capacity),
            capacity,
            rune_len: 0,
            cursor_byte: 0,
            cursor_rune: 0,
        }
    }

    /// Insert `ch` at the cursor and advance past it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::BufferFull`] when the encoded rune would push the
    /// line past its capacity. The buffer is left untouched in that case.
    pub fn insert_rune(&mut self, ch: char) -> Result<(), EditError> {
        let encoded_len = ch.len_utf8();
        let needed = self.content.len() + encoded_len;
        if needed > self.capacity {
            return Err(EditError::BufferFull {
                capacity: self.capacity,
                needed,
            });
        }
        self.content.insert(self.cursor_byte, ch);
        self.rune_len += 1;
        self.cursor_byte += encoded_len;
        self.cursor_rune += 1;
        Ok(())
    }

    /// Remove the rune immediately before the cursor, if any.
    ///
    /// Returns the removed rune.
    pub fn delete_rune_before_cursor(&mut self) -> Option<char> {
        if self.cursor_rune == 0 {
            return None;
        }
        let start = self.previous_boundary();
        let removed = self.content[start..self.cursor_byte].chars().next()?;
        self.content.replace_range(start..self.cursor_byte, "");
        self.rune_len -= 1;
        self.cursor_byte = start;
        self.cursor_rune -= 1;
        Some(removed)
    }

    /// Step the cursor one rune; stepping past either end is a no-op.
    pub fn move_cursor(&mut self, direction: CursorMove) {
        match direction {
            CursorMove::Left => {
                if self.cursor_rune == 0 {
                    return;
                }
                self.cursor_byte = self.previous_boundary();
                self.cursor_rune -= 1;
            }
            CursorMove::Right => {
                let Some(ch) = self.content[self.cursor_byte..].chars().next() else {
                    return;
                };
                self.cursor_byte += ch.len_utf8();
                self.cursor_rune += 1;
            }
        }
    }

    /// Clear the line, keeping the allocation.
    pub fn reset(&mut self) {
        self.content.clear();
        self.rune_len = 0;
        self.cursor_byte = 0;
        self.cursor_rune = 0;
    }

    /// Bytes still free before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.capacity - self.content.len()
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn byte_len(&self) -> usize {
        self.content.len()
    }

    pub fn rune_len(&self) -> usize {
        self.rune_len
    }

    pub fn cursor_byte(&self) -> usize {
        self.cursor_byte
    }

    pub fn cursor_rune(&self) -> usize {
        self.cursor_rune
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the cursor sits after the last rune.
    pub fn cursor_at_end(&self) -> bool {
        self.cursor_rune == self.rune_len
    }

    /// Byte offset where the rune before the cursor starts.
    fn previous_boundary(&self) -> usize {
        self.content[..self.cursor_byte]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}
