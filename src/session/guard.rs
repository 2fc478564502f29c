//! Terminal display ownership.
//!
//! The display session (raw mode + alternate screen + hidden cursor) is a
//! single mutable resource. [`ScreenGuard`] owns it for the UI; `suspend`
//! hands the terminal back so a child process can use it, `resume`
//! re-acquires it. A cloneable [`ScreenRestorer`] lets a signal handler or
//! panic path release the display from any thread, exactly once.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait ScreenOps: Send + Sync + 'static {
    fn enter(&self) -> io::Result<()>;
    fn leave(&self) -> io::Result<()>;
}

/// Raw mode, alternate screen, hidden cursor: the mode the compositor
/// paints in.
#[derive(Debug, Default)]
pub struct CrosstermScreenOps;

impl ScreenOps for CrosstermScreenOps {
    fn enter(&self) -> io::Result<()> {
        use crossterm::{
            cursor, execute,
            terminal::{enable_raw_mode, EnterAlternateScreen},
        };

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        use crossterm::{
            cursor, execute,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
        };

        // Best-effort release: try all steps even if one fails.
        let mut first_err: Option<io::Error> = None;

        if let Err(err) = disable_raw_mode() {
            first_err.get_or_insert(err);
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            first_err.get_or_insert(err);
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Release-only handle, safe to use from any thread. Releasing an already
/// released display is a no-op.
#[derive(Clone)]
pub struct ScreenRestorer {
    active: Arc<AtomicBool>,
    ops: Arc<dyn ScreenOps>,
}

impl ScreenRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.leave()
    }
}

pub struct ScreenGuard {
    active: Arc<AtomicBool>,
    ops: Arc<dyn ScreenOps>,
}

impl ScreenGuard {
    pub fn new() -> io::Result<Self> {
        Self::with_ops(Arc::new(CrosstermScreenOps))
    }

    pub fn with_ops(ops: Arc<dyn ScreenOps>) -> io::Result<Self> {
        ops.enter()?;
        Ok(Self {
            active: Arc::new(AtomicBool::new(true)),
            ops,
        })
    }

    /// Hand the terminal back. Idempotent: suspending a suspended screen
    /// does nothing.
    pub fn suspend(&self) -> io::Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.leave()
    }

    /// Re-acquire the display after a suspend. Idempotent.
    pub fn resume(&self) -> io::Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(err) = self.ops.enter() {
            self.active.store(false, Ordering::SeqCst);
            return Err(err);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn restorer(&self) -> ScreenRestorer {
        ScreenRestorer {
            active: Arc::clone(&self.active),
            ops: Arc::clone(&self.ops),
        }
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = self.suspend();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Watch for SIGINT/SIGTERM and notify `tx`. If the main loop does not wind
/// down within the grace period, the display is released here and the
/// process exits, so the terminal is never left corrupted.
#[cfg(unix)]
pub fn install_termination_signals(
    restorer: ScreenRestorer,
    tx: std::sync::mpsc::Sender<TerminationSignal>,
) -> io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::time::Duration;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    Ok(std::thread::spawn(move || {
        for sig in signals.forever() {
            let signal = match sig {
                SIGINT => TerminationSignal::SigInt,
                SIGTERM => TerminationSignal::SigTerm,
                _ => continue,
            };

            let _ = tx.send(signal);

            std::thread::sleep(Duration::from_secs(2));
            let _ = restorer.restore();
            std::process::exit(signal.exit_code());
        }
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/session/guard.rs"]
mod tests;
