//! A live Telnet session with one device.

use std::fmt;
use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::channel::{ExpectMatch, PatternBuffer};
use crate::error::{ChannelError, DriverError, Error, Result, TransportError};
use crate::platform::{CliMode, PlatformDefinition};
use crate::transport::{TelnetConfig, TelnetTransport};

/// Text placed in logs and reports instead of hidden input.
pub const MASK: &str = "********";

/// How much of the unmatched output a prompt timeout reports.
const TIMEOUT_TAIL: usize = 256;

/// Output gathered by [`Session::read_until_or_deadline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// Everything read, including the pattern when it appeared.
    pub text: String,

    /// Whether the pattern appeared before the deadline.
    pub pattern_seen: bool,
}

/// A session with exactly one device.
///
/// Created by [`SessionBuilder`](super::SessionBuilder); connected with
/// [`open`](Session::open). The session owns its transport: dropping it
/// releases the socket even when [`close`](Session::close) was never called.
pub struct Session<S = TcpStream> {
    /// Testbed name of the device.
    device: String,

    /// Hostname used in the device's prompts.
    hostname: String,

    /// Connection settings.
    config: TelnetConfig,

    /// CLI dialect.
    platform: PlatformDefinition,

    /// Transport (None when closed).
    transport: Option<TelnetTransport<S>>,

    /// Output not yet consumed by an expect.
    buffer: PatternBuffer,

    /// Default wait for `expect` in scripts.
    timeout: Duration,

    /// Text of the last matched prompt.
    last_prompt: Option<String>,
}

impl Session<TcpStream> {
    /// Connect to the device.
    pub async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = TelnetTransport::connect(self.config.clone()).await?;
        debug!(
            "Session opened to {} ({})",
            self.device,
            self.config.socket_addr()
        );
        self.transport = Some(transport);
        Ok(())
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(
        device: String,
        hostname: String,
        config: TelnetConfig,
        platform: PlatformDefinition,
        search_depth: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            device,
            hostname,
            config,
            platform,
            transport: None,
            buffer: PatternBuffer::new(search_depth),
            timeout,
            last_prompt: None,
        }
    }

    /// Attach an already connected stream instead of dialing.
    pub fn attach(&mut self, stream: S) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }
        self.transport = Some(TelnetTransport::from_stream(stream, self.config.clone()));
        Ok(())
    }

    /// Shut the connection down. Closing a closed session does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
            debug!("Session to {} closed", self.device);
        }
        self.buffer.clear();
        Ok(())
    }

    /// Whether the session holds a transport.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn transport_mut(&mut self) -> Result<&mut TelnetTransport<S>> {
        self.transport
            .as_mut()
            .ok_or_else(|| DriverError::NotConnected.into())
    }

    /// Send a line of text.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        debug!("[{}] >> {}", self.device, text);
        self.transport_mut()?.send(text).await
    }

    /// Send a line of text without logging it.
    pub async fn send_secret(&mut self, text: &str) -> Result<()> {
        debug!("[{}] >> {}", self.device, MASK);
        self.transport_mut()?.send(text).await
    }

    /// Send bytes verbatim, e.g. the interrupt byte.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        debug!("[{}] >> {:?}", self.device, bytes);
        self.transport_mut()?.send_raw(bytes).await
    }

    /// Send the platform interrupt byte.
    pub async fn interrupt(&mut self) -> Result<()> {
        let byte = self.platform.interrupt;
        self.send_raw(&[byte]).await
    }

    /// Read one chunk into the buffer. Returns `false` once `deadline` passes.
    async fn fill(&mut self, deadline: Instant) -> Result<bool> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(DriverError::NotConnected)?;

        match tokio::time::timeout_at(deadline, transport.read_chunk()).await {
            Ok(chunk) => {
                self.buffer.extend(&chunk?);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Wait until one of `patterns` matches the output.
    ///
    /// The match that ends first wins; ties go to the pattern listed first.
    /// Output up to the end of the match is consumed.
    pub async fn expect(&mut self, patterns: &[Regex], timeout: Duration) -> Result<ExpectMatch> {
        let start = Instant::now();
        let deadline = start + timeout;

        loop {
            if let Some(found) = self.buffer.find_earliest(patterns) {
                let consumed = self.buffer.consume_through(found.end);
                let before = String::from_utf8_lossy(&consumed[..found.start]).into_owned();
                let matched = String::from_utf8_lossy(&consumed[found.start..]).into_owned();

                trace!("[{}] matched {:?}", self.device, matched);
                if CliMode::from_prompt(&matched).is_some() {
                    self.last_prompt = Some(matched.trim().to_string());
                }

                return Ok(ExpectMatch {
                    index: found.index,
                    matched,
                    before,
                    elapsed: start.elapsed(),
                });
            }

            if !self.fill(deadline).await? {
                return Err(ChannelError::PromptTimeout {
                    patterns: patterns.iter().map(|p| p.as_str().to_string()).collect(),
                    timeout,
                    tail: self.buffer.tail_lossy(TIMEOUT_TAIL),
                }
                .into());
            }
        }
    }

    /// Read until `pattern` shows up or `max` elapses, then hand over
    /// everything read. Running out of time is not an error.
    pub async fn read_until_or_deadline(
        &mut self,
        pattern: &Regex,
        max: Duration,
    ) -> Result<Collected> {
        let deadline = Instant::now() + max;
        let mut pattern_seen = self.buffer.tail_contains(pattern);

        while !pattern_seen {
            if !self.fill(deadline).await? {
                break;
            }
            pattern_seen = self.buffer.tail_contains(pattern);
        }

        let text = String::from_utf8_lossy(&self.buffer.take()).into_owned();
        Ok(Collected { text, pattern_seen })
    }

    /// Drain the buffer and whatever the socket delivers before it goes
    /// quiet for the configured idle window.
    pub async fn read_available(&mut self) -> Result<String> {
        let idle = self.config.drain_idle;
        let transport = self
            .transport
            .as_mut()
            .ok_or(DriverError::NotConnected)?;

        loop {
            match tokio::time::timeout(idle, transport.read_chunk()).await {
                Ok(Ok(chunk)) => self.buffer.extend(&chunk),
                Ok(Err(Error::Transport(TransportError::Disconnected))) | Err(_) => break,
                Ok(Err(e)) => return Err(e),
            }
        }

        Ok(String::from_utf8_lossy(&self.buffer.take()).into_owned())
    }

    /// Testbed name of the device.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Hostname expected in prompts.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Default wait used by scripts.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// The last prompt matched by `expect`.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    /// CLI mode derived from the last prompt.
    pub fn current_mode(&self) -> Option<CliMode> {
        self.last_prompt.as_deref().and_then(CliMode::from_prompt)
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("device", &self.device)
            .field("hostname", &self.hostname)
            .field("open", &self.transport.is_some())
            .field("last_prompt", &self.last_prompt)
            .finish()
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            debug!("Session to {} dropped while open, releasing socket", self.device);
        }
    }
}
