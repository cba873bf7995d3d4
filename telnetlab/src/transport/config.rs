//! Telnet connection configuration.

use std::time::Duration;

/// Telnet connection configuration.
#[derive(Debug, Clone)]
pub struct TelnetConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Telnet port (console servers and emulators use high ports).
    pub port: u16,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// How long `read_available` keeps draining after the last byte arrived.
    pub drain_idle: Duration,

    /// Size of a single socket read.
    pub read_chunk_size: usize,
}

impl TelnetConfig {
    /// Create a configuration with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23,
            connect_timeout: Duration::from_secs(10),
            drain_idle: Duration::from_millis(100),
            read_chunk_size: 4096,
        }
    }
}
