//! Append-only sink for submitted lines.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for committed lines.
pub trait LineSink {
    /// Persist one line. The sink adds the record terminator.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying target.
    fn append_line(&mut self, line: &str) -> io::Result<()>;

    /// Human-readable location, used in error messages.
    fn location(&self) -> &Path;
}

/// The chat's `in` file.
///
/// Opened, written once, and closed for every line, so no writable
/// descriptor is held between submissions. The file is never created: it
/// is usually a FIFO owned by the chat client.
#[derive(Debug, Clone)]
pub struct AppendFile {
    path: PathBuf,
}

impl AppendFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSink for AppendFile {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&record)?;
        tracing::debug!(path = %self.path.display(), bytes = record.len(), "line appended");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
