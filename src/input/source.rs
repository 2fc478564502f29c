//! Keyboard reader thread.
//!
//! Reading and decoding happen on a dedicated thread so the UI loop polling
//! the queue never blocks on the terminal. `pause` surrenders terminal input
//! to whoever needs it (an interactive child); `resume` reinstates the loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use super::event::{self, Key};
use super::queue::EventQueue;

/// Source of decoded key events. The real implementation reads the
/// terminal; tests substitute a scripted feed.
pub trait EventFeed: Send + 'static {
    /// Wait up to `timeout` for one event. `Ok(None)` means the timeout
    /// elapsed with nothing to read.
    fn next(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

/// Terminal-backed feed. Requires the display session to hold raw mode;
/// otherwise keys arrive line-buffered.
#[derive(Debug, Default)]
pub struct TerminalFeed;

impl EventFeed for TerminalFeed {
    fn next(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        Ok(event::decode(&crossterm::event::read()?))
    }
}

struct Shared {
    paused: AtomicBool,
    degraded: AtomicBool,
    shutdown: AtomicBool,
    error: Mutex<Option<io::Error>>,
}

/// Owns the reading loop.
pub struct InputSource {
    shared: Arc<Shared>,
    queue: Arc<EventQueue>,
    handle: Option<JoinHandle<()>>,
}

impl InputSource {
    /// Start reading the terminal into `queue`.
    pub fn spawn(queue: Arc<EventQueue>, feed_timeout: Duration) -> Self {
        Self::spawn_with(TerminalFeed, queue, feed_timeout)
    }

    pub fn spawn_with<F: EventFeed>(
        feed: F,
        queue: Arc<EventQueue>,
        feed_timeout: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            paused: AtomicBool::new(false),
            degraded: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            error: Mutex::new(None),
        });
        let handle = std::thread::spawn({
            let shared = Arc::clone(&shared);
            let queue = Arc::clone(&queue);
            let mut feed = feed;
            move || read_loop(&mut feed, &shared, &queue, feed_timeout)
        });
        Self {
            shared,
            queue,
            handle: Some(handle),
        }
    }

    /// Stop consuming terminal input and discard anything already queued, so
    /// a child process can take the terminal over.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        self.queue.clear();
    }

    /// Reinstate the reading loop after a [`pause`](Self::pause). Also
    /// clears a degraded state left behind by a feed failure.
    pub fn resume(&self) {
        self.shared.degraded.store(false, Ordering::SeqCst);
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Take the feed error that degraded the loop, if any. The loop stays
    /// degraded (no further events) until [`resume`](Self::resume).
    pub fn take_error(&self) -> Option<io::Error> {
        match self.shared.error.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Drop for InputSource {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_loop(feed: &mut dyn EventFeed, shared: &Shared, queue: &EventQueue, timeout: Duration) {
    const IDLE: Duration = Duration::from_millis(20);

    while !shared.shutdown.load(Ordering::SeqCst) {
        if shared.paused.load(Ordering::SeqCst) || shared.degraded.load(Ordering::SeqCst) {
            std::thread::sleep(IDLE);
            continue;
        }
        match feed.next(timeout) {
            Ok(Some(key)) => {
                // A key decoded while a pause raced the flag belongs to the
                // stale context; drop it with the rest of the cleared queue.
                if !shared.paused.load(Ordering::SeqCst) {
                    queue.push(key);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "input feed failed; no further events until resume");
                if let Ok(mut slot) = shared.error.lock() {
                    *slot = Some(err);
                }
                shared.degraded.store(true, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/source.rs"]
mod tests;
