//! Display backends.
//!
//! The trait keeps the compositor free of any direct terminal dependency
//! and gives tests an in-memory target.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

pub trait DisplayBackend: Send {
    /// Current display size as `(rows, cols)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Present one composed frame, top row first.
    fn present(&mut self, rows: &[String]) -> io::Result<()>;
}

/// Crossterm-backed terminal output. Assumes the screen session holds the
/// alternate screen; every frame repaints from the top-left.
#[derive(Debug, Default)]
pub struct TerminalBackend;

impl DisplayBackend for TerminalBackend {
    fn size(&self) -> io::Result<(u16, u16)> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok((rows, cols))
    }

    fn present(&mut self, rows: &[String]) -> io::Result<()> {
        use crossterm::{cursor::MoveTo, queue, style::Print};

        let mut out = io::stdout().lock();
        for (y, row) in rows.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16), Print(row))?;
        }
        out.flush()
    }
}

#[derive(Debug, Default)]
struct FrameState {
    frame: Vec<String>,
    frames_presented: usize,
}

/// Headless backend for tests: captures every presented frame into shared
/// state a [`TestFrameHandle`] can inspect after the backend is boxed away.
#[derive(Debug)]
pub struct TestBackend {
    rows: u16,
    cols: u16,
    state: Arc<Mutex<FrameState>>,
}

/// Read side of a [`TestBackend`].
#[derive(Clone, Debug)]
pub struct TestFrameHandle {
    state: Arc<Mutex<FrameState>>,
}

impl TestBackend {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            state: Arc::new(Mutex::new(FrameState::default())),
        }
    }

    pub fn handle(&self) -> TestFrameHandle {
        TestFrameHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl TestFrameHandle {
    pub fn frame(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.frame.clone(),
            Err(poisoned) => poisoned.into_inner().frame.clone(),
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.frame().get(y as usize).cloned().unwrap_or_default()
    }

    pub fn frames_presented(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.frames_presented,
            Err(poisoned) => poisoned.into_inner().frames_presented,
        }
    }
}

impl DisplayBackend for TestBackend {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.rows, self.cols))
    }

    fn present(&mut self, rows: &[String]) -> io::Result<()> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.frame = rows.to_vec();
        state.frames_presented += 1;
        Ok(())
    }
}
