//! Telnet transport implementation over a tokio stream.

use bytes::{Buf, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::config::TelnetConfig;
use super::negotiation::{TelnetDecoder, escape_iac};
use crate::error::{Result, TransportError};

/// Line terminator for every command sent to the device.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Telnet transport wrapping a byte stream (a `TcpStream` in production).
pub struct TelnetTransport<S = TcpStream> {
    /// The underlying stream.
    stream: S,

    /// Configuration used for this connection.
    config: TelnetConfig,

    /// Negotiation state carried across reads.
    decoder: TelnetDecoder,

    /// Scratch space for socket reads.
    scratch: Vec<u8>,

    /// Decoded data not yet handed to the caller.
    pending: BytesMut,

    /// Negotiation answers not yet written.
    replies: BytesMut,
}

impl TelnetTransport<TcpStream> {
    /// Connect to the Telnet endpoint.
    pub async fn connect(config: TelnetConfig) -> Result<Self> {
        let stream = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.connect_timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

        stream.set_nodelay(true).map_err(TransportError::Io)?;
        debug!("Connected to {}", config.socket_addr());

        Ok(Self::from_stream(stream, config))
    }
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, config: TelnetConfig) -> Self {
        let scratch = vec![0; config.read_chunk_size.max(64)];
        Self {
            stream,
            config,
            decoder: TelnetDecoder::new(),
            scratch,
            pending: BytesMut::new(),
            replies: BytesMut::new(),
        }
    }

    /// Send a line of text followed by CR-LF.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let mut payload = escape_iac(text.as_bytes());
        payload.extend_from_slice(LINE_TERMINATOR);
        self.write(&payload).await
    }

    /// Send bytes verbatim, without a line terminator.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.write(&escape_iac(bytes)).await
    }

    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        self.stream
            .write_all(payload)
            .await
            .map_err(TransportError::Io)?;
        self.stream.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Read the next chunk of data from the device.
    ///
    /// Negotiation requests found in the chunk are answered before returning.
    /// The returned chunk may be empty when the read carried only Telnet
    /// commands. End of stream is reported as `TransportError::Disconnected`.
    ///
    /// Cancel-safe: decoded data and unsent answers live on the transport, so
    /// a call dropped by a timeout loses nothing and the next call resumes.
    pub async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            self.flush_replies().await?;

            let n = self
                .stream
                .read(&mut self.scratch)
                .await
                .map_err(TransportError::Io)?;

            if n == 0 {
                return Err(TransportError::Disconnected.into());
            }

            self.decoder
                .decode(&self.scratch[..n], &mut self.pending, &mut self.replies);
        }

        self.flush_replies().await?;

        let data = self.pending.split();
        trace!("<< {:?}", String::from_utf8_lossy(&data));
        Ok(data.to_vec())
    }

    /// Write queued negotiation answers, advancing past each partial write.
    async fn flush_replies(&mut self) -> Result<()> {
        if self.replies.is_empty() {
            return Ok(());
        }
        trace!("Telnet negotiation reply: {:?}", self.replies.as_ref());

        while !self.replies.is_empty() {
            let n = self
                .stream
                .write(&self.replies)
                .await
                .map_err(TransportError::Io)?;
            if n == 0 {
                return Err(TransportError::Disconnected.into());
            }
            self.replies.advance(n);
        }
        self.stream.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Shut down the write side of the connection.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(TransportError::Io)?;
        debug!("Closed connection to {}", self.config.socket_addr());
        Ok(())
    }

    /// Configuration used for this connection.
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }
}
