//! Raw terminal mode, window title, and the resize/interrupt watcher.
//!
//! Raw mode here is narrower than `cfmakeraw`: output
//! post-processing and signal generation stay enabled, so transcript text
//! keeps its `\n` -> `\r\n` translation and Ctrl-C still raises SIGINT.

use crate::tui::input_layout::effective_columns;
use crate::tui::settings::{
    TITLE_SCREEN_PREFIX, TITLE_SCREEN_SUFFIX, TITLE_XTERM_PREFIX, TITLE_XTERM_SUFFIX,
};
use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGWINCH};
use signal_hook::iterator::Signals;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// ---------------------------------------------------------------------------
// Terminal width cell
// ---------------------------------------------------------------------------

/// Current terminal width, shared between the watcher thread and the loop.
///
/// A single atomic word: the watcher stores, the render path loads.
#[derive(Debug, Clone, Default)]
pub struct TerminalColumns(Arc<AtomicU16>);

impl TerminalColumns {
    pub fn new(cols: u16) -> Self {
        Self(Arc::new(AtomicU16::new(cols)))
    }

    /// Seed from the terminal's current size.
    pub fn detect() -> Self {
        let columns = Self::default();
        columns.refresh();
        columns
    }

    /// Width to lay out against, with the fallback applied.
    pub fn get(&self) -> u16 {
        effective_columns(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, cols: u16) {
        self.0.store(cols, Ordering::Relaxed);
    }

    /// Re-query the terminal size; keeps the old value if the query fails.
    pub fn refresh(&self) {
        match crossterm::terminal::size() {
            Ok((cols, _)) => self.set(cols),
            Err(err) => tracing::debug!(%err, "failed to query terminal size"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw mode
// ---------------------------------------------------------------------------

/// Original terminal attributes plus a once-only restore flag.
///
/// Shared by the raw-mode guard and the signal watcher so that whichever
/// exit path runs first restores the terminal, and nothing restores twice.
pub struct ModeRestorer {
    fd: RawFd,
    original: libc::termios,
    restored: AtomicBool,
}

impl std::fmt::Debug for ModeRestorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeRestorer")
            .field("fd", &self.fd)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl ModeRestorer {
    /// Put the original attributes back. Later calls are no-ops.
    ///
    /// Returns whether this call performed the restore.
    pub fn restore(&self) -> bool {
        if self.restored.swap(true, Ordering::SeqCst) {
            return false;
        }
        // SAFETY: `original` was filled by `tcgetattr` on this same fd.
        let rc = unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) };
        if rc == -1 {
            tracing::error!(err = %io::Error::last_os_error(), "tcsetattr restore failed");
        }
        true
    }
}

/// Raw mode lifetime guard so terminal state is restored on any return path.
#[derive(Debug)]
pub struct RawModeGuard {
    restorer: Arc<ModeRestorer>,
}

impl RawModeGuard {
    /// Switch the terminal behind `fd` to raw input mode.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `tcgetattr`/`tcsetattr`.
    pub fn acquire(fd: &impl AsRawFd) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        // SAFETY: termios is plain data; tcgetattr fully initialises it on success.
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } == -1 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original;
        raw.c_iflag &= !(libc::IMAXBEL
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        raw.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::IEXTEN);
        raw.c_cflag &= !(libc::CSIZE | libc::PARENB);
        raw.c_cflag |= libc::CS8;
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        // SAFETY: `raw` is a valid termios derived from the current settings.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } == -1 {
            return Err(io::Error::last_os_error());
        }
        tracing::debug!(fd, "terminal switched to raw mode");

        Ok(Self {
            restorer: Arc::new(ModeRestorer {
                fd,
                original,
                restored: AtomicBool::new(false),
            }),
        })
    }

    /// Handle for restoring from outside the guard's scope.
    pub fn restorer(&self) -> Arc<ModeRestorer> {
        Arc::clone(&self.restorer)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.restorer.restore() {
            tracing::debug!("terminal mode restored");
        }
    }
}

// ---------------------------------------------------------------------------
// Signal watcher
// ---------------------------------------------------------------------------

const WATCHED_SIGNALS: [libc::c_int; 5] = [SIGWINCH, SIGINT, SIGTERM, SIGHUP, SIGQUIT];

/// Spawn the thread that tracks SIGWINCH and handles termination signals.
///
/// On SIGWINCH the width cell is refreshed. On SIGINT, SIGTERM, SIGHUP or
/// SIGQUIT `on_terminate` runs, the terminal mode is restored, and the
/// signal's default action is re-raised, so the process dies the way it
/// would have without us.
///
/// The watcher blocks these signals for itself, so delivery lands on the
/// main thread and interrupts its `poll`.
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be registered.
pub fn spawn_signal_watcher(
    columns: TerminalColumns,
    restorer: Arc<ModeRestorer>,
    on_terminate: impl Fn() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let mut signals = Signals::new(WATCHED_SIGNALS)?;
    thread::Builder::new()
        .name("lchat-signals".to_string())
        .spawn(move || {
            if let Err(err) = block_in_current_thread(&WATCHED_SIGNALS) {
                tracing::debug!(%err, "could not mask signals on watcher thread");
            }
            for signal in signals.forever() {
                if signal == SIGWINCH {
                    columns.refresh();
                    tracing::debug!(cols = columns.get(), "terminal resized");
                    continue;
                }
                tracing::info!(signal, "terminating on signal");
                on_terminate();
                restorer.restore();
                if let Err(err) = signal_hook::low_level::emulate_default_handler(signal) {
                    tracing::error!(%err, signal, "failed to re-raise signal");
                    std::process::exit(128 + signal);
                }
            }
        })
}

fn block_in_current_thread(signals: &[libc::c_int]) -> io::Result<()> {
    // SAFETY: the set is initialised by sigemptyset before use and only
    // valid signal numbers are added.
    let rc = unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        for signal in signals {
            libc::sigaddset(&mut set, *signal);
        }
        libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut())
    };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Window title
// ---------------------------------------------------------------------------

/// Escape sequence that sets the window title for the given `$TERM`.
pub fn title_sequence(title: &str, term: Option<&str>) -> String {
    if term == Some("screen") {
        format!("{TITLE_SCREEN_PREFIX}{title}{TITLE_SCREEN_SUFFIX}")
    } else {
        format!("{TITLE_XTERM_PREFIX}{title}{TITLE_XTERM_SUFFIX}")
    }
}

/// Write the window-title sequence for the current `$TERM`.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_title<W: Write + ?Sized>(out: &mut W, title: &str) -> io::Result<()> {
    let term = std::env::var("TERM").ok();
    out.write_all(title_sequence(title, term.as_deref()).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::{FromRawFd, OwnedFd};

    #[test]
    fn columns_fall_back_when_unknown() {
        let columns = TerminalColumns::new(0);
        assert_eq!(columns.get(), 80);
        columns.set(132);
        assert_eq!(columns.get(), 132);
    }

    #[test]
    fn columns_are_shared_between_clones() {
        let columns = TerminalColumns::new(40);
        let watcher_side = columns.clone();
        watcher_side.set(100);
        assert_eq!(columns.get(), 100);
    }

    #[test]
    fn screen_gets_its_own_title_sequence() {
        assert_eq!(title_sequence("chat", Some("screen")), "\x1bkchat\x1b\\");
        assert_eq!(title_sequence("chat", Some("xterm")), "\x1b]0;chat\x07");
        assert_eq!(title_sequence("chat", None), "\x1b]0;chat\x07");
    }

    #[test]
    fn raw_mode_on_non_terminal_fails() {
        let file = std::fs::File::open("/dev/null").expect("open /dev/null");
        assert!(RawModeGuard::acquire(&file).is_err());
    }

    struct Pty {
        _master: OwnedFd,
        slave: OwnedFd,
    }

    fn open_pty() -> Pty {
        let (mut master, mut slave) = (-1, -1);
        // SAFETY: out-pointers are valid; name, termios and winsize may be null.
        let rc = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null(),
                std::ptr::null(),
            )
        };
        assert_eq!(rc, 0, "openpty: {}", io::Error::last_os_error());
        // SAFETY: openpty returned two fresh descriptors we now own.
        unsafe {
            Pty {
                _master: OwnedFd::from_raw_fd(master),
                slave: OwnedFd::from_raw_fd(slave),
            }
        }
    }

    fn attrs(fd: &impl AsRawFd) -> libc::termios {
        // SAFETY: tcgetattr fills the zeroed struct on success.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::tcgetattr(fd.as_raw_fd(), &mut termios) }, 0);
        termios
    }

    fn same_modes(a: &libc::termios, b: &libc::termios) -> bool {
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
    }

    #[test]
    fn raw_mode_keeps_output_processing_and_signals() {
        let pty = open_pty();
        let guard = RawModeGuard::acquire(&pty.slave).unwrap();
        let raw = attrs(&pty.slave);
        assert_eq!(raw.c_lflag & (libc::ICANON | libc::ECHO), 0);
        assert_ne!(raw.c_lflag & libc::ISIG, 0);
        assert_eq!(raw.c_iflag & libc::ICRNL, 0);
        drop(guard);
    }

    #[test]
    fn restore_happens_exactly_once() {
        let pty = open_pty();
        let original = attrs(&pty.slave);
        let guard = RawModeGuard::acquire(&pty.slave).unwrap();
        let raw = attrs(&pty.slave);
        assert!(!same_modes(&raw, &original));

        let restorer = guard.restorer();
        assert!(restorer.restore());
        assert!(same_modes(&attrs(&pty.slave), &original));
        assert!(!restorer.restore());

        // Put raw mode back by hand: a second restore from the guard's drop
        // would undo it.
        // SAFETY: `raw` came from tcgetattr on this fd.
        assert_eq!(
            unsafe { libc::tcsetattr(pty.slave.as_raw_fd(), libc::TCSANOW, &raw) },
            0
        );
        drop(guard);
        assert!(same_modes(&attrs(&pty.slave), &raw));
    }

    #[test]
    fn dropping_the_guard_restores_original_modes() {
        let pty = open_pty();
        let original = attrs(&pty.slave);
        let guard = RawModeGuard::acquire(&pty.slave).unwrap();
        let restorer = guard.restorer();
        drop(guard);
        assert!(same_modes(&attrs(&pty.slave), &original));
        assert!(!restorer.restore());
    }
}
