use flightlink_frame::FrameError;

/// Errors that can occur while marshaling records.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The buffer does not hold `need` bytes at the requested offset.
    #[error("buffer too short (need {need} bytes at offset {offset}, have {have})")]
    BufferTooShort {
        need: usize,
        offset: usize,
        have: usize,
    },

    /// A frame payload is longer than the record it should carry.
    #[error("payload size mismatch on kind 0x{kind:02X} (expected {expected}, got {actual})")]
    SizeMismatch {
        kind: u8,
        expected: usize,
        actual: usize,
    },

    /// The frame kind carries no known record.
    #[error("no record layout for kind 0x{0:02X}")]
    UnknownKind(u8),

    /// Building the frame failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, MessageError>;
