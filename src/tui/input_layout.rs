//! Wrap-aware redraw of the prompt and input line.
//!
//! The terminal wraps long lines on its own, so after drawing the cursor may
//! sit several rows below where the line started. The renderer remembers
//! that distance and climbs back up before the next redraw.

use crate::tui::input_buffer::EditBuffer;
use crate::tui::settings::{CARRIAGE_RETURN, FALLBACK_COLUMNS, WRAP_NEWLINE};
use crossterm::cursor::{MoveRight, MoveUp};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

/// Row/column placement of the drawn line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLayout {
    /// Rows the line occupies beyond its first row.
    pub overhang: usize,
    /// Whether the line ends exactly at the right margin.
    pub ends_at_margin: bool,
    /// Row of the edit cursor, counted from the first row of the line.
    pub cursor_row: usize,
    /// Column of the edit cursor.
    pub cursor_col: usize,
}

/// Compute where prompt + line end up on a `cols`-wide terminal.
///
/// The line is laid out rune by rune the way the terminal wraps it: widths
/// are display columns, and a wide rune that does not fit in what is left of
/// a row starts the next row, leaving the last cell blank.
pub fn compute_input_layout(prompt: &str, buffer: &EditBuffer, cols: u16) -> InputLayout {
    let cols = usize::from(effective_columns(cols));
    let (before, after) = buffer.as_str().split_at(buffer.cursor_byte());

    let mut pen = Pen::default();
    for ch in prompt.chars().chain(before.chars()) {
        pen.write(rune_width(ch), cols);
    }
    let cursor = after
        .chars()
        .next()
        .map(|ch| pen.start_of(rune_width(ch), cols));
    for ch in after.chars() {
        pen.write(rune_width(ch), cols);
    }

    let ends_at_margin = pen.col >= cols;
    let overhang = pen.row + usize::from(ends_at_margin);
    let (cursor_row, cursor_col) = match cursor {
        Some(at) => (at.row, at.col),
        None if ends_at_margin => (overhang, 0),
        None => (overhang, pen.col),
    };
    InputLayout {
        overhang,
        ends_at_margin,
        cursor_row,
        cursor_col,
    }
}

/// Output position while laying out; `col == cols` is the pending-wrap
/// state after the last cell of a row was written.
#[derive(Debug, Clone, Copy, Default)]
struct Pen {
    row: usize,
    col: usize,
}

impl Pen {
    /// Where a rune `width` columns wide lands when written here.
    fn start_of(self, width: usize, cols: usize) -> Self {
        if self.col + width.max(1) > cols {
            Self {
                row: self.row + 1,
                col: 0,
            }
        } else {
            self
        }
    }

    fn write(&mut self, width: usize, cols: usize) {
        if width == 0 {
            return;
        }
        *self = self.start_of(width, cols);
        self.col += width;
    }
}

fn rune_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Terminal width to lay out against; zero means the size is unknown.
pub fn effective_columns(cols: u16) -> u16 {
    if cols == 0 {
        FALLBACK_COLUMNS
    } else {
        cols
    }
}

/// Redraws the input line; carries the cursor row between frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRenderer {
    layout: InputLayout,
}

impl LineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placement computed by the last `draw`.
    pub fn layout(&self) -> InputLayout {
        self.layout
    }

    /// Erase the previously drawn line and park the cursor at its start.
    ///
    /// # Errors
    ///
    /// Returns any error from queuing output on `out`.
    pub fn clear<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.layout.cursor_row > 0 {
            out.queue(MoveUp(saturating_u16(self.layout.cursor_row)))?;
        }
        out.write_all(CARRIAGE_RETURN.as_bytes())?;
        out.queue(Clear(ClearType::FromCursorDown))?;
        self.layout = InputLayout::default();
        Ok(())
    }

    /// Draw `prompt` and the buffer, then place the cursor on the edit point.
    ///
    /// Expects the cursor at the start of a clean row, as left by `clear`.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn draw<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        prompt: &str,
        buffer: &EditBuffer,
        cols: u16,
    ) -> io::Result<()> {
        out.write_all(prompt.as_bytes())?;
        out.write_all(buffer.as_bytes())?;

        let layout = compute_input_layout(prompt, buffer, cols);
        // The terminal defers the wrap at the right margin; force it so the
        // cursor row matches the overhang.
        if layout.ends_at_margin {
            out.write_all(WRAP_NEWLINE.as_bytes())?;
        }

        if !buffer.cursor_at_end() {
            let rows_up = layout.overhang - layout.cursor_row;
            if rows_up > 0 {
                out.queue(MoveUp(saturating_u16(rows_up)))?;
            }
            out.write_all(CARRIAGE_RETURN.as_bytes())?;
            // `CSI 0 C` moves one column, same as `CSI 1 C`.
            if layout.cursor_col > 0 {
                out.queue(MoveRight(saturating_u16(layout.cursor_col)))?;
            }
        }

        self.layout = layout;
        Ok(())
    }
}

fn saturating_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
