//! Child processes that replay and follow the chat's `out` file.

use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How to start the transcript stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSource {
    /// File to follow.
    pub out_file: PathBuf,
    /// Records replayed before following.
    pub history_lines: usize,
    /// Optional filter program the tail output is piped through.
    pub filter: Option<PathBuf>,
}

impl TranscriptSource {
    /// The `tail` invocation for this source.
    pub fn tail_command(&self) -> Command {
        let mut cmd = Command::new("tail");
        cmd.arg("-n")
            .arg(self.history_lines.to_string())
            .arg("-f")
            .arg(&self.out_file);
        cmd
    }
}

/// `tail -n K -f out [| filter]`, read through the last process's stdout.
///
/// Children are killed and reaped on drop.
#[derive(Debug)]
pub struct TranscriptStream {
    children: Vec<Child>,
    output: ChildStdout,
    live: Arc<AtomicBool>,
}

/// Sends SIGTERM to a stream's children from another thread.
///
/// Only the first `kill` signals anything, and nothing is signalled once the
/// stream has been dropped and its children reaped.
#[derive(Debug, Clone)]
pub struct ChildKiller {
    pids: Vec<libc::pid_t>,
    live: Arc<AtomicBool>,
}

impl ChildKiller {
    /// Terminate the pipeline. Returns whether this call sent the signals.
    pub fn kill(&self) -> bool {
        if !self.live.swap(false, Ordering::SeqCst) {
            return false;
        }
        for &pid in &self.pids {
            // SAFETY: plain syscall; the pid belongs to an unreaped child.
            if unsafe { libc::kill(pid, libc::SIGTERM) } == -1 {
                tracing::debug!(pid, err = %io::Error::last_os_error(), "kill failed");
            }
        }
        true
    }
}

impl TranscriptStream {
    /// Spawn the pipeline described by `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if any process in the pipeline fails to start.
    pub fn spawn(source: &TranscriptSource) -> io::Result<Self> {
        let mut tail = source
            .tail_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()?;
        let tail_out = take_stdout(&mut tail)?;
        tracing::info!(
            out = %source.out_file.display(),
            history = source.history_lines,
            "following transcript"
        );

        let Some(filter) = &source.filter else {
            return Ok(Self::new(vec![tail], tail_out));
        };

        let mut children = vec![tail];
        let spawned = Command::new(filter)
            .stdin(Stdio::from(tail_out))
            .stdout(Stdio::piped())
            .spawn();
        let mut filter_child = match spawned {
            Ok(child) => child,
            Err(err) => {
                reap(&mut children);
                return Err(err);
            }
        };
        let output = take_stdout(&mut filter_child);
        children.push(filter_child);
        let output = match output {
            Ok(output) => output,
            Err(err) => {
                reap(&mut children);
                return Err(err);
            }
        };
        tracing::info!(filter = %filter.display(), "transcript piped through filter");
        Ok(Self::new(children, output))
    }

    fn new(children: Vec<Child>, output: ChildStdout) -> Self {
        Self {
            children,
            output,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle that can terminate the children while the stream is in use.
    pub fn killer(&self) -> ChildKiller {
        ChildKiller {
            pids: self
                .children
                .iter()
                .filter_map(|child| libc::pid_t::try_from(child.id()).ok())
                .collect(),
            live: Arc::clone(&self.live),
        }
    }
}

impl Read for TranscriptStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.output.read(buf)
    }
}

impl AsRawFd for TranscriptStream {
    fn as_raw_fd(&self) -> RawFd {
        self.output.as_raw_fd()
    }
}

impl Drop for TranscriptStream {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        reap(&mut self.children);
    }
}

/// Return the executable filter at `path`, if there is one.
pub fn executable_filter(path: &Path) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).ok()?;
    let executable = metadata.is_file() && metadata.permissions().mode() & 0o111 != 0;
    executable.then(|| {
        if path.is_relative() && path.parent() == Some(Path::new("")) {
            // A bare name would be looked up on $PATH.
            Path::new(".").join(path)
        } else {
            path.to_path_buf()
        }
    })
}

fn take_stdout(child: &mut Child) -> io::Result<ChildStdout> {
    child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdout not captured"))
}

fn reap(children: &mut Vec<Child>) {
    for mut child in children.drain(..) {
        let _ = child.kill();
        let _ = child.wait();
    }
}
