//! Fixed-layout telemetry and command records.
//!
//! Each record is a plain struct with a fixed big-endian binary layout,
//! carried as the payload of one frame. Records encode and decode at an
//! arbitrary offset so several of them can sit back-to-back in one frame
//! (see [`GroundReport`]). Decoding overwrites the record in place.

mod layout;

pub mod any;
pub mod error;
pub mod records;
pub mod report;

pub use any::{payload_size, AnyMessage, GainAxis};
pub use error::{MessageError, Result};
pub use records::{
    CommandMessage, GainMessage, ModeStateMessage, MotorOffsetMessage, MotorSignalMessage,
    RevvingMessage, SensorMessage, SwitchMessage, TraceMessage, TRACE_SLOTS,
};
pub use report::GroundReport;

use bytes::BytesMut;
use flightlink_frame::Frame;

/// A record with a fixed binary layout.
pub trait Message: Default + Clone {
    /// Encoded size in bytes.
    const PACKET_SIZE: usize;

    /// Write this record into `buf[offset..offset + PACKET_SIZE]`.
    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()>;

    /// Overwrite this record from `buf[offset..offset + PACKET_SIZE]`.
    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<()>;

    /// Return every field to the zero baseline.
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Encode this record as the payload of a frame of `kind`.
    fn to_frame(&self, kind: u8) -> Result<Frame> {
        let mut payload = BytesMut::zeroed(Self::PACKET_SIZE);
        self.encode(&mut payload, 0)?;
        Ok(Frame::new(kind, payload.freeze())?)
    }

    /// Decode this record from a frame whose payload is exactly one record.
    fn read_frame(&mut self, frame: &Frame) -> Result<()> {
        let actual = frame.payload().len();
        if actual > Self::PACKET_SIZE {
            return Err(MessageError::SizeMismatch {
                kind: frame.kind(),
                expected: Self::PACKET_SIZE,
                actual,
            });
        }
        self.decode(frame.payload(), 0)
    }
}
