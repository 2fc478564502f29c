//! FIFO queue between the input thread and UI widgets.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::event::Key;

/// Process-wide keyboard event queue.
///
/// Pushed from the input thread, popped from the UI loop. `pop` never
/// blocks, so the UI loop is free to service other work when the queue is
/// empty.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Mutex<VecDeque<Key>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<Key>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, key: Key) {
        self.guard().push_back(key);
    }

    pub fn pop(&self) -> Option<Key> {
        self.guard().pop_front()
    }

    /// Discard everything queued. Used when input pauses so stale keystrokes
    /// do not leak into a different UI context.
    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}
