//! Keyboard input pipeline: decode once at the boundary, queue, poll.

pub mod event;
pub mod queue;
pub mod source;

pub use event::Key;
pub use queue::EventQueue;
pub use source::{EventFeed, InputSource, TerminalFeed};
