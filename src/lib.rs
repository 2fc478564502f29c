//! terrace: layered terminal session toolkit.
//!
//! Module map:
//! - `session`: the terminal session context (display/input ownership, leases)
//! - `compositor`: layered text-window compositor
//! - `input`: key decoding, event queue, reader thread
//! - `widgets`: list widgets driven by the event queue
//! - `process`: captured, interactive, and dry-run execution of external programs
//! - `config` / `logging`: session tunables and file-backed tracing

pub mod compositor;
pub mod config;
pub mod input;
pub mod logging;
pub mod process;
pub mod session;
pub mod widgets;
