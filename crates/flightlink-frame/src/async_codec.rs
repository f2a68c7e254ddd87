//! `tokio_util::codec` adapter for the flightlink wire format.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::FrameError;
use crate::scanner::{scan, scan_eof, ScanStats};

/// Frame codec for `FramedRead` / `FramedWrite`.
///
/// Decoding resynchronizes exactly like [`crate::Scanner`]; corrupt input is
/// skipped and counted, never returned as an error.
#[derive(Debug, Default)]
pub struct FlightCodec {
    config: FrameConfig,
    stats: ScanStats,
}

impl FlightCodec {
    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            stats: ScanStats::default(),
        }
    }

    /// Scanner counters since creation.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

impl Decoder for FlightCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        Ok(scan(src, &self.config, &mut self.stats))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        Ok(scan_eof(src, &self.config, &mut self.stats))
    }
}

impl Encoder<Frame> for FlightCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        let size = item.payload().len();
        if size > self.config.payload_limit() {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.config.payload_limit(),
            });
        }
        if !item.is_checksum_valid() {
            return Err(FrameError::StaleChecksum(item.kind()));
        }
        encode_frame(&item, dst);
        Ok(())
    }
}
