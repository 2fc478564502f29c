//! The terminal session context.
//!
//! One [`Session`] owns the single mutable terminal: the display
//! (compositor), the input pipeline (reader thread + queue), and every
//! transition between UI ownership and child-process ownership. Callers
//! never toggle raw mode or pause input directly; they take a
//! [`TerminalLease`] and the borrow checker keeps the two worlds from
//! overlapping.

pub mod guard;
pub mod wake;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::compositor::backend::DisplayBackend;
use crate::compositor::layer::LayerId;
use crate::compositor::{Compositor, CompositorError};
use crate::config::SessionConfig;
use crate::input::queue::EventQueue;
use crate::input::source::{EventFeed, InputSource, TerminalFeed};
use crate::widgets::menu::Menu;
use guard::ScreenGuard;

pub struct Session {
    compositor: Compositor,
    input: InputSource,
    events: Arc<EventQueue>,
    tick: Duration,
    menu_mark: String,
}

impl Session {
    /// Acquire the terminal and start the input thread.
    pub fn new(config: SessionConfig) -> Result<Self, CompositorError> {
        let compositor = Compositor::new()?;
        Ok(Self::assemble(compositor, TerminalFeed, config))
    }

    /// Assemble a session from explicit parts; tests pass mock screen ops,
    /// a test backend, and a scripted feed.
    pub fn with_parts<F: EventFeed>(
        screen: ScreenGuard,
        backend: Box<dyn DisplayBackend>,
        feed: F,
        config: SessionConfig,
    ) -> Result<Self, CompositorError> {
        let compositor = Compositor::with_parts(screen, backend)?;
        Ok(Self::assemble(compositor, feed, config))
    }

    fn assemble<F: EventFeed>(compositor: Compositor, feed: F, config: SessionConfig) -> Self {
        let events = Arc::new(EventQueue::new());
        let input = InputSource::spawn_with(feed, Arc::clone(&events), config.feed_timeout());
        Self {
            compositor,
            input,
            events,
            tick: config.tick(),
            menu_mark: config.menu_mark,
        }
    }

    pub fn compositor(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn events(&self) -> &Arc<EventQueue> {
        &self.events
    }

    pub fn input(&self) -> &InputSource {
        &self.input
    }

    /// A menu bound to `frame`/`viewport`, carrying the session's
    /// configured mark.
    pub fn new_menu(&self, frame: LayerId, viewport: LayerId) -> Menu {
        let mut menu = Menu::new(frame, viewport);
        menu.set_mark(&self.menu_mark);
        menu
    }

    /// Pause input, discard stale keys, and suspend the display, handing
    /// the terminal to whoever holds the returned lease. Dropping the lease
    /// (or calling [`TerminalLease::release`]) reverses both transitions.
    pub fn lease_terminal(&mut self) -> io::Result<TerminalLease<'_>> {
        self.input.pause();
        self.compositor.stop()?;
        Ok(TerminalLease {
            session: Some(self),
        })
    }

    /// Drive a menu until the operator confirms; returns the selection
    /// text.
    ///
    /// This is the cooperative UI loop: pop one event, feed the widget,
    /// repaint, check the latch, sleep one tick when idle. `pop` never
    /// blocks, so the loop stays responsive to whatever else the caller
    /// interleaves.
    pub fn run_menu(&mut self, menu: &mut Menu) -> Result<String, CompositorError> {
        loop {
            let key = self.events.pop();
            if let Some(key) = key {
                menu.on_event(key);
            }
            menu.paint(&mut self.compositor)?;
            self.compositor.refresh()?;
            if menu.take_selected() {
                return Ok(menu.selected_text());
            }
            if key.is_none() {
                std::thread::sleep(self.tick);
            }
        }
    }
}

/// Exclusive ownership of the terminal, taken from a [`Session`].
///
/// While the lease lives, session input is paused and the display is
/// suspended; the mutable borrow makes any overlapping UI work a compile
/// error. Both transitions reverse when the lease is released or dropped.
pub struct TerminalLease<'a> {
    session: Option<&'a mut Session>,
}

impl TerminalLease<'_> {
    /// Give the terminal back explicitly, surfacing any failure the drop
    /// path could only log.
    pub fn release(mut self) -> io::Result<()> {
        self.reclaim()
    }

    fn reclaim(&mut self) -> io::Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        // Display first: the input thread needs raw mode back before it
        // starts reading keys again.
        session.compositor.start()?;
        session.input.resume();
        Ok(())
    }
}

impl Drop for TerminalLease<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.reclaim() {
            tracing::error!(error = %err, "failed to re-acquire terminal after lease");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mod.rs"]
mod tests;
