//! Interactive terminal-passthrough execution.
//!
//! `run_interactive` hands the caller's terminal to a child running on a
//! pseudo-terminal: the caller terminal goes raw, and a poll loop forwards
//! bytes verbatim in both directions until the child exits. The original
//! terminal mode is restored on every exit path, error propagation and
//! unwinding included.

use std::fmt;
use std::io::{self, Write};
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};

use portable_pty::{native_pty_system, CommandBuilder, MasterPty, PtySize};

use super::{split_args, ProcessError};
use crate::session::wake::WakeReceiver;
use crate::session::TerminalLease;

/// Captured terminal mode settings, restored when the interactive call
/// ends.
#[derive(Clone, Copy)]
pub struct ModeSnapshot(libc::termios);

impl fmt::Debug for ModeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeSnapshot").finish()
    }
}

/// Terminal mode transitions, mockable for tests.
pub trait RawModeOps {
    /// Capture the current mode and switch to raw.
    fn enter_raw(&self) -> io::Result<ModeSnapshot>;
    /// Restore a previously captured mode.
    fn restore(&self, snapshot: &ModeSnapshot) -> io::Result<()>;
}

/// Real termios transitions on the caller's stdin.
#[derive(Debug, Default)]
pub struct StdinRawMode;

impl RawModeOps for StdinRawMode {
    fn enter_raw(&self) -> io::Result<ModeSnapshot> {
        // SAFETY: a zeroed termios is a valid output buffer for tcgetattr.
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: stdin is a valid fd; original points to writable memory.
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original;
        // No line buffering, echo, signal keys, or output post-processing:
        // bytes pass through untouched in both directions.
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_cflag &= !(libc::CSIZE | libc::PARENB);
        raw.c_cflag |= libc::CS8;
        raw.c_oflag &= !libc::OPOST;

        // SAFETY: stdin is a valid fd; raw is fully initialized.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ModeSnapshot(original))
    }

    fn restore(&self, snapshot: &ModeSnapshot) -> io::Result<()> {
        // SAFETY: stdin is a valid fd; the snapshot holds settings captured
        // from it earlier.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &snapshot.0) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Scoped raw-mode acquisition: restores the captured mode exactly once, on
/// drop or explicit [`restore`](Self::restore), whichever comes first.
pub struct RawModeGuard<'a> {
    ops: &'a dyn RawModeOps,
    snapshot: ModeSnapshot,
    restored: AtomicBool,
}

impl<'a> RawModeGuard<'a> {
    pub fn enter(ops: &'a dyn RawModeOps) -> Result<Self, ProcessError> {
        let snapshot = ops.enter_raw().map_err(ProcessError::Terminal)?;
        Ok(Self {
            ops,
            snapshot,
            restored: AtomicBool::new(false),
        })
    }

    pub fn restore(&self) -> io::Result<()> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.restore(&self.snapshot)
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::error!(error = %err, "failed to restore terminal mode");
        }
    }
}

/// Run `program` attached to a pseudo-terminal with full bidirectional
/// passthrough, blocking until it exits. Returns the child's exit code.
///
/// The lease is the proof that the caller holds exclusive terminal
/// ownership: input stays paused and the display suspended for as long as
/// it lives.
pub fn run_interactive(
    lease: &TerminalLease<'_>,
    program: &str,
    args: &str,
) -> Result<i32, ProcessError> {
    let _ = lease;
    let mut stdout = io::stdout().lock();
    run_interactive_with(
        &StdinRawMode,
        libc::STDIN_FILENO,
        &mut stdout,
        None,
        program,
        args,
    )
}

/// Like [`run_interactive`], with every boundary injectable: the mode ops,
/// the caller input descriptor, the output stream, and an optional wake
/// pipe whose readability cancels the wait.
pub fn run_interactive_with(
    ops: &dyn RawModeOps,
    input_fd: RawFd,
    output: &mut dyn Write,
    cancel: Option<&WakeReceiver>,
    program: &str,
    args: &str,
) -> Result<i32, ProcessError> {
    let guard = RawModeGuard::enter(ops)?;

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let pty = native_pty_system();
    let pair = pty
        .openpty(PtySize {
            rows: rows.max(1),
            cols: cols.max(1),
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|err| ProcessError::Pty(err.to_string()))?;

    let mut cmd = CommandBuilder::new(program);
    cmd.args(split_args(args));
    let mut child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|err| ProcessError::Pty(err.to_string()))?;
    // The parent keeps only the master side; the child owns the slave.
    drop(pair.slave);

    let master_fd = pair
        .master
        .as_raw_fd()
        .ok_or_else(|| ProcessError::Pty("pty master exposes no file descriptor".to_string()))?;

    let outcome = pump(input_fd, master_fd, output, cancel);

    // On anything but a clean end-of-stream the child may still be running;
    // kill it so the reap below cannot block forever.
    if !matches!(outcome, Ok(PumpEnd::ChildEof)) {
        let _ = child.kill();
    }
    let status = child.wait().map_err(ProcessError::Io)?;
    drop(pair.master);

    guard.restore().map_err(ProcessError::Terminal)?;

    match outcome {
        Ok(PumpEnd::ChildEof) => Ok(status.exit_code() as i32),
        Ok(PumpEnd::Cancelled) => Err(ProcessError::Cancelled),
        Err(err) => Err(ProcessError::Io(err)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpEnd {
    /// The master reported end-of-stream: the child exited or closed.
    ChildEof,
    /// The wake pipe became readable.
    Cancelled,
}

/// Forward bytes between the caller input and the pty master until the
/// master reports end-of-stream. Transient signal interruptions are retried
/// transparently; any other poll failure is fatal.
pub(crate) fn pump(
    input_fd: RawFd,
    master_fd: RawFd,
    output: &mut dyn Write,
    cancel: Option<&WakeReceiver>,
) -> io::Result<PumpEnd> {
    let mut buf = [0u8; 4096];
    let mut input_open = true;

    loop {
        let mut fds = [
            libc::pollfd {
                fd: master_fd,
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                // poll ignores negative fds, which drops a closed input
                // stream out of the wait set.
                fd: if input_open { input_fd } else { -1 },
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: cancel.map_or(-1, WakeReceiver::raw_fd),
                events: libc::POLLIN,
                revents: 0,
            },
        ];

        // SAFETY: fds points to three initialized pollfd entries.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }

        if fds[2].revents & libc::POLLIN != 0 {
            if let Some(cancel) = cancel {
                cancel.drain();
            }
            return Ok(PumpEnd::Cancelled);
        }

        if fds[0].revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
            // SAFETY: master_fd stays open for the duration of the loop;
            // buf is a live writable buffer.
            let n = unsafe { libc::read(master_fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                // Linux reports EIO on the master once the child is gone;
                // treat every read failure here as end-of-stream.
                return Ok(PumpEnd::ChildEof);
            }
            if n == 0 {
                return Ok(PumpEnd::ChildEof);
            }
            output.write_all(&buf[..n as usize])?;
            output.flush()?;
        }

        if fds[1].revents & libc::POLLIN != 0 {
            // SAFETY: input_fd is a valid open descriptor; buf is writable.
            let n = unsafe { libc::read(input_fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n > 0 {
                write_all_fd(master_fd, &buf[..n as usize])?;
            } else if n == 0 {
                input_open = false;
            }
        }
    }
}

fn write_all_fd(fd: RawFd, mut bytes: &[u8]) -> io::Result<()> {
    while !bytes.is_empty() {
        // SAFETY: fd is valid; bytes is a live slice.
        let n = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        bytes = &bytes[n as usize..];
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/process/interactive.rs"]
mod tests;
