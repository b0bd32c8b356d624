//! The single-threaded chat loop.
//!
//! One iteration: wait for the keyboard or the transcript, erase the input
//! line, handle whatever woke us, redraw the input line. Erasing before
//! dispatch means transcript text always lands on a clean row above the
//! prompt.

use crate::chat::{BellMatcher, LineSink};
use crate::error::{EditError, SessionError, Utf8Fault};
use crate::repl::poller::{wait_either, Readiness};
use crate::tui::input::LineEditor;
use crate::tui::input_layout::LineRenderer;
use crate::tui::settings::{BELL, KEY_RETURN, TRANSCRIPT_CHUNK_BYTES};
use crate::tui::terminal::{write_title, TerminalColumns};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;

/// Per-session behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub prompt: String,
    /// Submit empty lines instead of treating them as "quit".
    pub allow_empty_submit: bool,
    pub bell_enabled: bool,
    pub line_capacity: usize,
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Return pressed on an empty line.
    UserQuit,
    /// The transcript stream hung up.
    TranscriptClosed,
}

/// Outcome of handling one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(SessionEnd),
}

/// Editor, renderer, and collaborators for one interactive session.
#[derive(Debug)]
pub struct ChatSession<W, S, B> {
    options: SessionOptions,
    editor: LineEditor,
    renderer: LineRenderer,
    columns: TerminalColumns,
    chunk: Box<[u8]>,
    out: W,
    sink: S,
    bell: B,
}

impl<W, S, B> ChatSession<W, S, B>
where
    W: Write,
    S: LineSink,
    B: BellMatcher,
{
    pub fn new(options: SessionOptions, columns: TerminalColumns, out: W, sink: S, bell: B) -> Self {
        let editor = LineEditor::with_capacity(options.line_capacity);
        Self {
            options,
            editor,
            renderer: LineRenderer::new(),
            columns,
            chunk: vec![0u8; TRANSCRIPT_CHUNK_BYTES].into_boxed_slice(),
            out,
            sink,
            bell,
        }
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Set the window title (if any) and show the first prompt.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Terminal`] if the terminal write fails.
    pub fn start(&mut self, title: Option<&str>) -> Result<(), SessionError> {
        if let Some(title) = title {
            write_title(&mut self.out, title).map_err(SessionError::Terminal)?;
        }
        self.draw()
    }

    /// Handle one keyboard byte.
    ///
    /// Return submits the line, or ends the session when the line is empty
    /// and empty submits are not allowed. Every other byte goes to the
    /// decoder.
    ///
    /// # Errors
    ///
    /// Decoder failures and outbox I/O failures are returned as fatal.
    pub fn handle_key(&mut self, byte: u8) -> Result<Flow, SessionError> {
        if byte != KEY_RETURN {
            self.editor.feed(byte)?;
            return Ok(Flow::Continue);
        }
        if !self.editor.pending_bytes().is_empty() {
            return Err(EditError::InvalidUtf8(Utf8Fault::Interrupted(byte)).into());
        }
        if self.editor.is_empty() && !self.options.allow_empty_submit {
            tracing::info!("empty line submitted; quitting");
            return Ok(Flow::Exit(SessionEnd::UserQuit));
        }
        self.sink
            .append_line(self.editor.buffer().as_str())
            .map_err(|source| SessionError::Outbox {
                path: self.sink.location().to_path_buf(),
                source,
            })?;
        self.editor.reset();
        Ok(Flow::Continue)
    }

    /// Show a transcript chunk verbatim and ring the bell if it matches.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Terminal`] if the terminal write fails.
    pub fn handle_transcript(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        self.out.write_all(chunk).map_err(SessionError::Terminal)?;
        if self.options.bell_enabled && self.bell.matches(&String::from_utf8_lossy(chunk)) {
            self.out.write_all(BELL).map_err(SessionError::Terminal)?;
        }
        Ok(())
    }

    /// Erase the input line.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Terminal`] if the terminal write fails.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.renderer
            .clear(&mut self.out)
            .map_err(SessionError::Terminal)
    }

    /// Draw the input line at the current terminal width and flush.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Terminal`] if the terminal write fails.
    pub fn draw(&mut self) -> Result<(), SessionError> {
        let cols = self.columns.get();
        self.renderer
            .draw(&mut self.out, &self.options.prompt, self.editor.buffer(), cols)
            .and_then(|()| self.out.flush())
            .map_err(SessionError::Terminal)
    }

    /// Run until the user quits, the transcript hangs up, or a fatal error.
    ///
    /// `keyboard` is read one byte per wake-up and must be unbuffered, or
    /// bytes would sit in a user-space buffer that `poll` cannot see.
    ///
    /// # Errors
    ///
    /// Returns the first fatal condition; the loop never retries.
    pub fn run<K, T>(&mut self, keyboard: &mut K, transcript: &mut T) -> Result<SessionEnd, SessionError>
    where
        K: Read + AsRawFd,
        T: Read + AsRawFd,
    {
        loop {
            let [keys, feed] = wait_either(keyboard.as_raw_fd(), transcript.as_raw_fd())
                .map_err(SessionError::Terminal)?;
            if keys.is_idle() && feed.is_idle() {
                // Woken by a signal, usually SIGWINCH.
                self.columns.refresh();
            }
            self.clear()?;
            if let Some(end) = self.dispatch(keys, feed, keyboard, transcript)? {
                self.out.flush().map_err(SessionError::Terminal)?;
                tracing::info!(?end, "session finished");
                return Ok(end);
            }
            self.draw()?;
        }
    }

    fn dispatch<K: Read, T: Read>(
        &mut self,
        keys: Readiness,
        feed: Readiness,
        keyboard: &mut K,
        transcript: &mut T,
    ) -> Result<Option<SessionEnd>, SessionError> {
        if keys.readable {
            let byte = read_key(keyboard)?;
            if let Flow::Exit(end) = self.handle_key(byte)? {
                return Ok(Some(end));
            }
        } else if keys.hangup {
            return Err(SessionError::KeyboardClosed);
        } else if keys.failed {
            return Err(SessionError::Terminal(io::Error::other(
                "poll reported an error on the keyboard",
            )));
        }

        if feed.readable {
            let n = read_retrying(transcript, &mut self.chunk).map_err(SessionError::Transcript)?;
            if n == 0 {
                if feed.hangup {
                    return Ok(Some(SessionEnd::TranscriptClosed));
                }
                return Err(SessionError::UpstreamClosed);
            }
            let chunk = std::mem::take(&mut self.chunk);
            let shown = self.handle_transcript(&chunk[..n]);
            self.chunk = chunk;
            shown?;
        } else if feed.hangup {
            tracing::debug!("transcript stream hung up");
            return Ok(Some(SessionEnd::TranscriptClosed));
        } else if feed.failed {
            return Err(SessionError::Transcript(io::Error::other(
                "poll reported an error on the transcript stream",
            )));
        }
        Ok(None)
    }
}

/// Read exactly one keyboard byte.
fn read_key<K: Read>(keyboard: &mut K) -> Result<u8, SessionError> {
    let mut byte = [0u8; 1];
    let n = read_retrying(keyboard, &mut byte).map_err(SessionError::Terminal)?;
    if n == 0 {
        return Err(SessionError::KeyboardClosed);
    }
    Ok(byte[0])
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Default)]
    struct RecordingSink {
        lines: Vec<String>,
        fail: bool,
    }

    impl LineSink for RecordingSink {
        fn append_line(&mut self, line: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader gone"));
            }
            self.lines.push(line.to_string());
            Ok(())
        }

        fn location(&self) -> &Path {
            Path::new("chat/in")
        }
    }

    #[derive(Debug)]
    struct FixedBell(bool);

    impl BellMatcher for FixedBell {
        fn matches(&self, _text: &str) -> bool {
            self.0
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            prompt: ">".to_string(),
            allow_empty_submit: false,
            bell_enabled: true,
            line_capacity: 64,
        }
    }

    fn session(
        options: SessionOptions,
        bell: bool,
    ) -> ChatSession<Vec<u8>, RecordingSink, FixedBell> {
        ChatSession::new(
            options,
            TerminalColumns::new(80),
            Vec::new(),
            RecordingSink::default(),
            FixedBell(bell),
        )
    }

    fn type_bytes(session: &mut ChatSession<Vec<u8>, RecordingSink, FixedBell>, bytes: &[u8]) {
        for byte in bytes {
            assert_eq!(session.handle_key(*byte).unwrap(), Flow::Continue);
        }
    }

    #[test]
    fn empty_submit_quits_without_writing() {
        let mut session = session(options(), false);
        assert_eq!(
            session.handle_key(KEY_RETURN).unwrap(),
            Flow::Exit(SessionEnd::UserQuit)
        );
        assert!(session.sink().lines.is_empty());
    }

    #[test]
    fn empty_submit_allowed_writes_empty_record() {
        let mut session = session(
            SessionOptions {
                allow_empty_submit: true,
                ..options()
            },
            false,
        );
        assert_eq!(session.handle_key(KEY_RETURN).unwrap(), Flow::Continue);
        assert_eq!(session.sink().lines, [""]);
    }

    #[test]
    fn submit_commits_line_and_resets_editor() {
        let mut session = session(options(), false);
        type_bytes(&mut session, b"hi\x1b[DX");
        assert_eq!(session.handle_key(KEY_RETURN).unwrap(), Flow::Continue);
        assert_eq!(session.sink().lines, ["hXi"]);
        assert!(session.editor().is_empty());
        assert_eq!(session.editor().buffer().cursor_rune(), 0);
    }

    #[test]
    fn submit_after_commit_on_empty_line_quits() {
        let mut session = session(options(), false);
        type_bytes(&mut session, b"one\r");
        assert_eq!(
            session.handle_key(KEY_RETURN).unwrap(),
            Flow::Exit(SessionEnd::UserQuit)
        );
        assert_eq!(session.sink().lines, ["one"]);
    }

    #[test]
    fn outbox_failure_is_fatal_and_keeps_line() {
        let mut session = session(options(), false);
        session.sink.fail = true;
        type_bytes(&mut session, b"hi");
        let err = session.handle_key(KEY_RETURN).unwrap_err();
        assert!(matches!(err, SessionError::Outbox { .. }), "got: {err}");
        assert!(err.to_string().contains("chat/in"));
        assert_eq!(session.editor().buffer().as_str(), "hi");
    }

    #[test]
    fn return_inside_multibyte_rune_is_rejected() {
        let mut session = session(options(), false);
        type_bytes(&mut session, &[0xC3]);
        let err = session.handle_key(KEY_RETURN).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Edit(EditError::InvalidUtf8(Utf8Fault::Interrupted(KEY_RETURN)))
        ));
        assert!(session.sink().lines.is_empty());
    }

    #[test]
    fn decoder_failure_is_fatal() {
        let mut session = session(options(), false);
        let err = session.handle_key(0xFF).unwrap_err();
        assert!(matches!(err, SessionError::Edit(EditError::InvalidUtf8(_))));
    }

    #[test]
    fn transcript_chunk_is_shown_and_rings_once_on_match() {
        let mut session = session(options(), true);
        session.handle_transcript(b"alert: fire\n").unwrap();
        assert_eq!(session.output().as_slice(), b"alert: fire\n\x07");
    }

    #[test]
    fn transcript_without_match_does_not_ring() {
        let mut session = session(options(), false);
        session.handle_transcript(b"quiet\n").unwrap();
        assert_eq!(session.output().as_slice(), b"quiet\n");
    }

    #[test]
    fn disabled_bell_never_rings() {
        let mut session = session(
            SessionOptions {
                bell_enabled: false,
                ..options()
            },
            true,
        );
        session.handle_transcript(b"alert: fire\n").unwrap();
        assert_eq!(session.output().as_slice(), b"alert: fire\n");
    }

    #[test]
    fn pattern_file_drives_the_bell() {
        let path: PathBuf =
            std::env::temp_dir().join(format!("lchat-loop-bell-{}", std::process::id()));
        std::fs::write(&path, "fire\n").unwrap();
        let mut session = ChatSession::new(
            options(),
            TerminalColumns::new(80),
            Vec::new(),
            RecordingSink::default(),
            crate::chat::PatternFile::new(&path),
        );
        session.handle_transcript(b"alert: fire").unwrap();
        session.handle_transcript(b"calm").unwrap();
        assert_eq!(session.output().as_slice(), b"alert: fire\x07calm");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn start_sets_title_and_draws_prompt() {
        let mut session = session(options(), false);
        session.start(None).unwrap();
        assert_eq!(session.output().as_slice(), b">");
    }

    #[test]
    fn clear_then_draw_reflects_edits() {
        let mut session = session(options(), false);
        session.start(None).unwrap();
        type_bytes(&mut session, b"ab\x1b[D");
        session.clear().unwrap();
        session.draw().unwrap();
        assert_eq!(
            String::from_utf8_lossy(session.output()),
            ">\r\x1b[J>ab\r\x1b[2C"
        );
    }

    fn ready(readable: bool, hangup: bool) -> Readiness {
        Readiness {
            readable,
            hangup,
            failed: false,
        }
    }

    #[test]
    fn empty_read_without_hangup_means_tail_died() {
        let mut session = session(options(), false);
        let err = session
            .dispatch(
                Readiness::default(),
                ready(true, false),
                &mut io::empty(),
                &mut io::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::UpstreamClosed));
    }

    #[test]
    fn empty_read_with_hangup_ends_cleanly() {
        let mut session = session(options(), false);
        let end = session
            .dispatch(
                Readiness::default(),
                ready(true, true),
                &mut io::empty(),
                &mut io::empty(),
            )
            .unwrap();
        assert_eq!(end, Some(SessionEnd::TranscriptClosed));
    }

    #[test]
    fn pending_data_is_shown_before_hangup() {
        let mut session = session(options(), false);
        let end = session
            .dispatch(
                Readiness::default(),
                ready(true, true),
                &mut io::empty(),
                &mut &b"last words\n"[..],
            )
            .unwrap();
        assert_eq!(end, None);
        assert_eq!(session.output().as_slice(), b"last words\n");

        let end = session
            .dispatch(
                Readiness::default(),
                ready(false, true),
                &mut io::empty(),
                &mut io::empty(),
            )
            .unwrap();
        assert_eq!(end, Some(SessionEnd::TranscriptClosed));
    }

    #[test]
    fn keyboard_hangup_is_fatal() {
        let mut session = session(options(), false);
        let err = session
            .dispatch(
                ready(false, true),
                Readiness::default(),
                &mut io::empty(),
                &mut io::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::KeyboardClosed));
    }

    #[test]
    fn interrupted_wait_does_nothing() {
        let mut session = session(options(), false);
        let end = session
            .dispatch(
                Readiness::default(),
                Readiness::default(),
                &mut io::empty(),
                &mut io::empty(),
            )
            .unwrap();
        assert_eq!(end, None);
        assert!(session.output().is_empty());
    }

    #[test]
    fn one_key_byte_is_consumed_per_wake() {
        let mut session = session(options(), false);
        let mut keys = &b"ab"[..];
        session
            .dispatch(
                ready(true, false),
                Readiness::default(),
                &mut keys,
                &mut io::empty(),
            )
            .unwrap();
        assert_eq!(session.editor().buffer().as_str(), "a");
        assert_eq!(keys, b"b");
    }

    #[test]
    fn draw_follows_terminal_resizes() {
        let columns = TerminalColumns::new(80);
        let mut session = ChatSession::new(
            options(),
            columns.clone(),
            Vec::new(),
            RecordingSink::default(),
            FixedBell(false),
        );
        type_bytes(&mut session, b"abc");
        columns.set(4);
        session.draw().unwrap();
        assert_eq!(session.output().as_slice(), b">abc\n");
    }
}
