//! Blocking readiness wait over the keyboard and transcript descriptors.

use std::io;
use std::os::fd::RawFd;

/// What `poll(2)` reported for one descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub readable: bool,
    /// The writing side is gone; no more data will ever arrive.
    pub hangup: bool,
    /// `POLLERR` or `POLLNVAL`.
    pub failed: bool,
}

impl Readiness {
    fn from_revents(revents: libc::c_short) -> Self {
        Self {
            readable: revents & libc::POLLIN != 0,
            hangup: revents & libc::POLLHUP != 0,
            failed: revents & (libc::POLLERR | libc::POLLNVAL) != 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.readable || self.hangup || self.failed)
    }
}

/// Block until either descriptor is ready. No timeout.
///
/// A wait interrupted by a signal returns with both descriptors idle so the
/// caller can redraw (e.g. after a resize) and wait again.
///
/// # Errors
///
/// Returns the OS error from `poll(2)` for anything but `EINTR`.
pub fn wait_either(first: RawFd, second: RawFd) -> io::Result<[Readiness; 2]> {
    let mut fds = [
        libc::pollfd {
            fd: first,
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: second,
            events: libc::POLLIN,
            revents: 0,
        },
    ];
    // SAFETY: `fds` is a valid, initialised array of two pollfd structs.
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), 2, -1) };
    if rc == -1 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok([Readiness::default(); 2]);
        }
        return Err(err);
    }
    Ok([
        Readiness::from_revents(fds[0].revents),
        Readiness::from_revents(fds[1].revents),
    ])
}
