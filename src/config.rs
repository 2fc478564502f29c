use std::time::Duration;

/// Tunables for a terminal session. Plain values with defaults; nothing is
/// persisted across runs.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Idle sleep between UI loop iterations.
    pub tick_ms: u64,
    /// How long the input thread waits on the terminal per poll.
    pub feed_timeout_ms: u64,
    /// Visual prefix for the highlighted/marked menu rows.
    pub menu_mark: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            feed_timeout_ms: 50,
            menu_mark: " > ".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_timeout_ms)
    }
}
