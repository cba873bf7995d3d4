//! Builder for creating device sessions.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use super::session::Session;
use crate::config::Timings;
use crate::error::{DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::topology::Device;
use crate::transport::TelnetConfig;

/// Builder for constructing device sessions.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use telnetlab::driver::SessionBuilder;
///
/// # async fn example() -> Result<(), telnetlab::Error> {
/// let mut session = SessionBuilder::new("192.168.100.10")
///     .port(5001)
///     .hostname("R1")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// session.open().await?;
/// session.send("show version").await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    host: String,
    port: u16,
    device: Option<String>,
    hostname: Option<String>,
    platform: Option<PlatformDefinition>,
    timeout: Duration,
    connect_timeout: Duration,
    drain_idle: Duration,
    search_depth: usize,
}

impl SessionBuilder {
    /// Create a new session builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        let defaults = TelnetConfig::default();
        Self {
            host: host.into(),
            port: defaults.port,
            device: None,
            hostname: None,
            platform: None,
            timeout: Duration::from_secs(10),
            connect_timeout: defaults.connect_timeout,
            drain_idle: defaults.drain_idle,
            search_depth: 1000,
        }
    }

    /// Start from a testbed device: endpoint, names and the given timings.
    pub fn for_device(device: &Device, timings: &Timings) -> Result<Self> {
        let endpoint = device
            .telnet
            .as_ref()
            .ok_or_else(|| DriverError::NoEndpoint {
                device: device.name.clone(),
            })?;

        Ok(Self::new(endpoint.host.clone())
            .port(endpoint.port)
            .device(device.name.clone())
            .hostname(device.hostname.clone())
            .timeout(timings.prompt)
            .connect_timeout(timings.connect))
    }

    /// Set the Telnet port (default: 23).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the device name used in logs and reports (default: the host).
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Set the hostname expected in prompts (default: the device name).
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set a custom platform definition (default: Cisco IOS).
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the default prompt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the quiet window that ends `read_available`.
    pub fn drain_idle(mut self, idle: Duration) -> Self {
        self.drain_idle = idle;
        self
    }

    /// Set how many trailing bytes are searched for prompts.
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Build the session.
    ///
    /// This does not connect. Call `open()` on the returned session.
    pub fn build(self) -> Result<Session<TcpStream>> {
        self.build_with()
    }

    /// Build a session over any stream type, to be connected with
    /// [`Session::attach`].
    pub fn build_with<S>(self) -> Result<Session<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        if self.port == 0 {
            return Err(DriverError::InvalidConfig {
                message: "Port must be non-zero".to_string(),
            }
            .into());
        }
        if self.search_depth == 0 {
            return Err(DriverError::InvalidConfig {
                message: "Search depth must be non-zero".to_string(),
            }
            .into());
        }

        let device = self.device.unwrap_or_else(|| self.host.clone());
        let hostname = self.hostname.unwrap_or_else(|| device.clone());

        let config = TelnetConfig {
            host: self.host,
            port: self.port,
            connect_timeout: self.connect_timeout,
            drain_idle: self.drain_idle,
            ..Default::default()
        };

        Ok(Session::new(
            device,
            hostname,
            config,
            self.platform.unwrap_or_default(),
            self.search_depth,
            self.timeout,
        ))
    }
}
