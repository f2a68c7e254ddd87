//! Transport abstraction for the flightlink ground/vehicle link.
//!
//! A [`Transport`] knows how to open a duplex byte stream to the vehicle and
//! how to force that stream closed again. Two adapters are provided:
//! - [`TcpTransport`] for stream sockets
//! - [`UdpTransport`] for datagram sockets
//!
//! This is the lowest layer of flightlink. The channel is generic over the
//! capability described here and never depends on a concrete socket type.

pub mod error;
pub mod tcp;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use tcp::{TcpConfig, TcpTransport};
pub use traits::Transport;
pub use udp::{DatagramReader, DatagramWriter, UdpConfig, UdpTransport};
