//! Dry-run execution.
//!
//! With the dry-run flag set, process operations never reach the OS: the
//! display is suspended, the would-be action is printed to the plain
//! stream, and the operator acknowledges before a synthetic success is
//! returned. Under a debugger (nonzero tracer pid) the acknowledgment is a
//! SIGTRAP instead of a prompt, so each intercepted step becomes a
//! breakpoint.

use std::io::{self, BufRead, Write};

use super::{interactive, run_captured, write_file, ProcessError};
use crate::session::Session;

/// Clear the terminal and home the cursor, bypassing the compositor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// Executes process operations for a calling context, optionally in
/// dry-run mode.
#[derive(Debug)]
pub struct Executor {
    dry_run: bool,
    debugger_present: bool,
}

impl Executor {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            debugger_present: debugger_attached(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Captured execution, or a logged no-op returning empty output.
    pub fn run_captured(
        &self,
        session: &mut Session,
        program: &str,
        args: &str,
    ) -> Result<String, ProcessError> {
        if self.dry_run {
            self.announce(session, &format!("Dry Run: {program} {args}"))?;
            return Ok(String::new());
        }
        run_captured(program, args)
    }

    /// Interactive execution under a terminal lease, or a logged no-op
    /// returning exit code 0.
    pub fn run_interactive(
        &self,
        session: &mut Session,
        program: &str,
        args: &str,
    ) -> Result<i32, ProcessError> {
        if self.dry_run {
            self.announce(session, &format!("Dry Run: {program} {args}"))?;
            return Ok(0);
        }
        let lease = session.lease_terminal().map_err(ProcessError::Terminal)?;
        let code = interactive::run_interactive(&lease, program, args)?;
        lease.release().map_err(ProcessError::Terminal)?;
        Ok(code)
    }

    /// Scoped file write, or a logged no-op.
    pub fn write_file(
        &self,
        session: &mut Session,
        path: &str,
        content: &str,
    ) -> Result<(), ProcessError> {
        if self.dry_run {
            self.announce(session, &format!("Dry Run: {path}:\n{content}"))?;
            return Ok(());
        }
        write_file(path, content)
    }

    fn announce(&self, session: &mut Session, message: &str) -> Result<(), ProcessError> {
        let lease = session.lease_terminal().map_err(ProcessError::Terminal)?;
        {
            let mut out = io::stdout().lock();
            write!(out, "{CLEAR_SCREEN}").map_err(ProcessError::Io)?;
            writeln!(out, "{message}").map_err(ProcessError::Io)?;
            out.flush().map_err(ProcessError::Io)?;
        }
        self.acknowledge().map_err(ProcessError::Io)?;
        lease.release().map_err(ProcessError::Terminal)
    }

    fn acknowledge(&self) -> io::Result<()> {
        if self.debugger_present {
            // SAFETY: raising a signal at our own process is always valid.
            unsafe {
                libc::raise(libc::SIGTRAP);
            }
            return Ok(());
        }
        {
            let mut out = io::stdout().lock();
            writeln!(out, "Press enter to continue . . .")?;
            out.flush()?;
        }
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// True when a tracer is attached to this process.
///
/// Reads the `TracerPid:` line of `/proc/self/status`; a nonzero pid means
/// a debugger (or strace-alike) is receiving our signals.
pub fn debugger_attached() -> bool {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return false;
    };
    tracer_pid(&status).is_some_and(|pid| pid != 0)
}

pub(crate) fn tracer_pid(status: &str) -> Option<u32> {
    status.lines().find_map(|line| {
        line.strip_prefix("TracerPid:")
            .and_then(|rest| rest.trim().parse().ok())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/process/rehearsal.rs"]
mod tests;
