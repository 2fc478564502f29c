//! Self-pipe wake mechanism.
//!
//! A [`WakeSender`] (cloneable write end) and [`WakeReceiver`] (read end)
//! backed by an OS pipe. The interactive process wait adds the read end to
//! its poll set, so any thread can cancel a blocked forwarding loop by
//! waking it.

use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;

/// Write end of the wake pipe. Hand out clones to any thread that needs to
/// interrupt the wait; the fd closes when the last clone is dropped.
#[derive(Clone)]
pub struct WakeSender {
    fd: Arc<OwnedFd>,
}

/// Read end of the wake pipe. Exposes `raw_fd()` for the poll set and
/// `drain()` to consume pending wake bytes.
pub struct WakeReceiver {
    fd: OwnedFd,
}

/// Raw fd that closes on drop.
struct OwnedFd(RawFd);

impl Drop for OwnedFd {
    fn drop(&mut self) {
        // SAFETY: fd is a valid pipe end created by pipe().
        unsafe {
            libc::close(self.0);
        }
    }
}

// SAFETY: the raw fd is an integer handle; moving it across threads is safe.
unsafe impl Send for OwnedFd {}
unsafe impl Sync for OwnedFd {}

/// Create a wake pipe pair. The read end is non-blocking so `drain()` never
/// blocks.
pub fn wake_pipe() -> io::Result<(WakeSender, WakeReceiver)> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: fds is a valid 2-element array.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    if let Err(err) = set_nonblocking(read_fd) {
        // SAFETY: both fds were just created by pipe() and are unowned.
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        return Err(err);
    }

    Ok((
        WakeSender {
            fd: Arc::new(OwnedFd(write_fd)),
        },
        WakeReceiver {
            fd: OwnedFd(read_fd),
        },
    ))
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fd is a valid descriptor owned by the caller.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

impl WakeSender {
    /// Write a single byte to wake the waiting thread. Errors (pipe full,
    /// receiver gone) are ignored: the wake is best-effort.
    pub fn wake(&self) {
        // SAFETY: fd is a valid pipe write end; the buffer is one live byte.
        unsafe {
            libc::write(self.fd.0, [1u8].as_ptr().cast(), 1);
        }
    }
}

impl WakeReceiver {
    /// The raw fd to include in a poll set.
    pub fn raw_fd(&self) -> RawFd {
        self.fd.0
    }

    /// Consume all pending wake bytes without blocking.
    pub fn drain(&self) {
        let mut buf = [0u8; 64];
        loop {
            // SAFETY: fd is a valid non-blocking pipe read end; buf is live.
            let n = unsafe { libc::read(self.fd.0, buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                break;
            }
        }
    }
}
