use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Configuration for [`TcpTransport`].
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Upper bound for establishing the connection. Default: 5 s.
    pub connect_timeout: Duration,
    /// Read timeout on the inbound half. Default: none (block until data).
    pub read_timeout: Option<Duration>,
    /// Write timeout on the outbound half. Default: 5 s.
    pub write_timeout: Option<Duration>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: None,
            write_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Stream-socket transport to `host:port`.
///
/// Send coalescing (Nagle) is disabled so every frame leaves as soon as it is
/// flushed.
pub struct TcpTransport {
    addr: String,
    config: TcpConfig,
    control: Option<TcpStream>,
}

impl TcpTransport {
    /// Create a transport for `addr` (anything `ToSocketAddrs` accepts as a string).
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_config(addr, TcpConfig::default())
    }

    /// Create a transport with explicit configuration.
    pub fn with_config(addr: impl Into<String>, config: TcpConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
            control: None,
        }
    }

    /// Target address as given.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether a link is currently open.
    pub fn is_open(&self) -> bool {
        self.control.is_some()
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = self
            .addr
            .to_socket_addrs()
            .map_err(|source| TransportError::Connect {
                addr: self.addr.clone(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                addr: self.addr.clone(),
            });
        }
        Ok(addrs)
    }

    fn open(&self) -> Result<TcpStream> {
        let mut last_err = None;
        for addr in self.resolve()? {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!(%addr, error = %err, "tcp connect attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(TransportError::Connect {
            addr: self.addr.clone(),
            source: last_err.unwrap_or_else(|| std::io::Error::other("no address reachable")),
        })
    }
}

impl Transport for TcpTransport {
    type Reader = TcpStream;
    type Writer = TcpStream;

    fn connect(&mut self) -> Result<(TcpStream, TcpStream)> {
        self.disconnect();

        let stream = self.open()?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;

        let reader = stream.try_clone()?;
        let writer = stream.try_clone()?;
        info!(addr = %self.addr, "tcp link established");
        self.control = Some(stream);
        Ok((reader, writer))
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.control.take() {
            debug!(addr = %self.addr, "closing tcp link");
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.addr)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
