
use std::time::Duration;

/// Default number of chat messages a room keeps for late joiners.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;
/// Default capacity of each connection's outbound queue, in envelopes.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;
/// Default bound on a single socket write.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables shared by the registry, the rooms and the per-connection writers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// Oldest messages are evicted once a room holds this many.
    pub history_limit: usize,
    pub outbound_buffer: usize,
    pub send_timeout: Duration,
    /// Reject `create: true` on existing rooms and `create: false` on unknown ones.
    pub strict_create: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            history_limit: DEFAULT_HISTORY_LIMIT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            strict_create: false,
        }
    }
}

impl RelayConfig {
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_outbound_buffer(mut self, outbound_buffer: usize) -> Self {
        // tokio's bounded channel panics on zero capacity
        self.outbound_buffer = outbound_buffer.max(1);
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn with_strict_create(mut self, strict_create: bool) -> Self {
        self.strict_create = strict_create;
        self
    }
}
