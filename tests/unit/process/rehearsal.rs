use super::*;
use crate::compositor::backend::TestBackend;
use crate::config::SessionConfig;
use crate::input::event::Key;
use crate::input::source::EventFeed;
use crate::session::guard::{ScreenGuard, ScreenOps};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct NullScreenOps;

impl ScreenOps for NullScreenOps {
    fn enter(&self) -> io::Result<()> {
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        Ok(())
    }
}

struct QuietFeed;

impl EventFeed for QuietFeed {
    fn next(&mut self, _timeout: Duration) -> io::Result<Option<Key>> {
        std::thread::sleep(Duration::from_millis(1));
        Ok(None)
    }
}

fn mock_session() -> Session {
    let screen = ScreenGuard::with_ops(Arc::new(NullScreenOps)).unwrap();
    let backend = Box::new(TestBackend::new(10, 20));
    Session::with_parts(screen, backend, QuietFeed, SessionConfig::default()).unwrap()
}

#[test]
fn tracer_pid_parses_proc_status() {
    let status = "Name:\tterrace\nState:\tR (running)\nTracerPid:\t0\nUid:\t0\n";
    assert_eq!(tracer_pid(status), Some(0));

    let traced = "Name:\tterrace\nTracerPid:\t4242\n";
    assert_eq!(tracer_pid(traced), Some(4242));
}

#[test]
fn tracer_pid_handles_missing_line() {
    assert_eq!(tracer_pid("Name:\tterrace\n"), None);
    assert_eq!(tracer_pid(""), None);
}

#[test]
fn no_debugger_under_the_test_runner() {
    assert!(!debugger_attached());
}

#[test]
fn executor_passes_captured_runs_through() {
    let executor = Executor::new(false);
    let mut session = mock_session();

    let output = executor.run_captured(&mut session, "echo", "ok").unwrap();
    assert_eq!(output, "ok\n");
}

#[test]
fn executor_passes_file_writes_through() {
    let executor = Executor::new(false);
    let mut session = mock_session();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostname");
    executor
        .write_file(&mut session, path.to_str().unwrap(), "arch-box\n")
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "arch-box\n");
}

#[test]
fn executor_reports_its_mode() {
    assert!(Executor::new(true).is_dry_run());
    assert!(!Executor::new(false).is_dry_run());
}
