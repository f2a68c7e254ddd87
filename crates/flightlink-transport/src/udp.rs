use std::io::{ErrorKind, Read, Write};
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Largest datagram we accept from the wire.
pub const MAX_DATAGRAM: usize = 64 * 1024;

/// Configuration for [`UdpTransport`].
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Local address to bind. Default: `0.0.0.0:0`.
    pub bind: String,
    /// How long a read waits before re-checking for shutdown. Default: 100 ms.
    pub poll_interval: Duration,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:0".to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Datagram transport to a single peer.
///
/// Inbound datagrams are concatenated into a byte stream; outbound bytes are
/// buffered until `flush` and then sent as one datagram, so one frame maps to
/// one datagram.
pub struct UdpTransport {
    peer: String,
    config: UdpConfig,
    closed: Option<Arc<AtomicBool>>,
}

impl UdpTransport {
    /// Create a transport sending to `peer`.
    pub fn new(peer: impl Into<String>) -> Self {
        Self::with_config(peer, UdpConfig::default())
    }

    /// Create a transport with explicit configuration.
    pub fn with_config(peer: impl Into<String>, config: UdpConfig) -> Self {
        Self {
            peer: peer.into(),
            config,
            closed: None,
        }
    }

    /// Whether a link is currently open.
    pub fn is_open(&self) -> bool {
        self.closed.is_some()
    }
}

impl Transport for UdpTransport {
    type Reader = DatagramReader;
    type Writer = DatagramWriter;

    fn connect(&mut self) -> Result<(DatagramReader, DatagramWriter)> {
        self.disconnect();

        let socket = UdpSocket::bind(&self.config.bind).map_err(|source| TransportError::Bind {
            addr: self.config.bind.clone(),
            source,
        })?;
        socket
            .connect(&self.peer)
            .map_err(|source| TransportError::Connect {
                addr: self.peer.clone(),
                source,
            })?;
        socket.set_read_timeout(Some(self.config.poll_interval))?;

        let closed = Arc::new(AtomicBool::new(false));
        let reader = DatagramReader::new(socket.try_clone()?, Arc::clone(&closed));
        let writer = DatagramWriter::new(socket, Arc::clone(&closed));
        info!(peer = %self.peer, "udp link established");
        self.closed = Some(closed);
        Ok((reader, writer))
    }

    fn disconnect(&mut self) {
        if let Some(closed) = self.closed.take() {
            debug!(peer = %self.peer, "closing udp link");
            closed.store(true, Ordering::SeqCst);
        }
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.peer)
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Inbound half of a UDP link, presented as a byte stream.
pub struct DatagramReader {
    socket: UdpSocket,
    closed: Arc<AtomicBool>,
    datagram: Vec<u8>,
    len: usize,
    pos: usize,
}

impl DatagramReader {
    fn new(socket: UdpSocket, closed: Arc<AtomicBool>) -> Self {
        Self {
            socket,
            closed,
            datagram: vec![0u8; MAX_DATAGRAM],
            len: 0,
            pos: 0,
        }
    }
}

impl Read for DatagramReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.len {
            if self.closed.load(Ordering::SeqCst) {
                return Err(std::io::Error::new(
                    ErrorKind::ConnectionAborted,
                    "udp link closed",
                ));
            }
            match self.socket.recv(&mut self.datagram) {
                Ok(n) => {
                    self.len = n;
                    self.pos = 0;
                }
                // ConnectionRefused is an ICMP port-unreachable for an earlier
                // send; the peer may not be bound yet, so keep the socket.
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::WouldBlock
                            | ErrorKind::TimedOut
                            | ErrorKind::Interrupted
                            | ErrorKind::ConnectionRefused
                    ) =>
                {
                    continue
                }
                Err(err) => return Err(err),
            }
        }

        let n = (self.len - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.datagram[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Outbound half of a UDP link. Each `flush` emits one datagram.
pub struct DatagramWriter {
    socket: UdpSocket,
    closed: Arc<AtomicBool>,
    pending: Vec<u8>,
}

impl DatagramWriter {
    fn new(socket: UdpSocket, closed: Arc<AtomicBool>) -> Self {
        Self {
            socket,
            closed,
            pending: Vec::new(),
        }
    }

    fn ensure_open(&self) -> std::io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "udp link closed"));
        }
        Ok(())
    }
}

impl Write for DatagramWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.ensure_open()?;
        if self.pending.len() + buf.len() > MAX_DATAGRAM {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "datagram exceeds maximum size",
            ));
        }
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.ensure_open()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self.socket.send(&self.pending);
        self.pending.clear();
        match result {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::ConnectionRefused => {
                debug!("udp peer unreachable; datagram dropped");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
