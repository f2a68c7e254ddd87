//! Marker-delimited, checksummed framing for the flightlink protocol.
//!
//! Every message travels as one frame:
//! - two marker bytes `0xFF 0xFF` for stream synchronization
//! - a 1-byte message kind and a 1-byte payload length
//! - the payload
//! - a 2-byte big-endian additive checksum over kind, length and payload
//!
//! The [`Scanner`] turns an unreliable byte stream back into validated frames,
//! skipping over corrupt or truncated input without giving up on the stream.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod kind;
pub mod reader;
pub mod scanner;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::FlightCodec;
pub use codec::{
    checks_out, decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_KIND,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MARKER, MAX_WIRE_PAYLOAD, OVERHEAD, TRAILER_SIZE,
};
pub use error::{FrameError, Result};
pub use kind::kind_name;
pub use reader::FrameReader;
pub use scanner::{ScanStats, Scanner};
pub use writer::FrameWriter;
