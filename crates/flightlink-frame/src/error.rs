/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The bytes at the head of the buffer are not the `0xFF 0xFF` marker.
    #[error("invalid frame marker (expected 0xFF 0xFF)")]
    InvalidMarker,

    /// The kind byte is outside the accepted range.
    #[error("invalid message kind 0x{0:02X}")]
    InvalidKind(u8),

    /// The declared payload length exceeds the accepted maximum.
    #[error("invalid payload length ({size} bytes, max {max})")]
    InvalidLength { size: usize, max: usize },

    /// The checksum trailer does not match the frame contents.
    #[error("checksum mismatch on kind 0x{kind:02X} (expected 0x{expected:04X}, got 0x{received:04X})")]
    ChecksumMismatch {
        kind: u8,
        expected: u16,
        received: u16,
    },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload was changed after the checksum was computed.
    #[error("stale checksum on kind 0x{0:02X} (call calc_checksum before sending)")]
    StaleChecksum(u8),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Framing errors the scanner recovers from by resynchronizing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidMarker
                | FrameError::InvalidKind(_)
                | FrameError::InvalidLength { .. }
                | FrameError::ChecksumMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
