use flightlink_frame::FrameError;
use flightlink_message::MessageError;
use flightlink_transport::TransportError;

/// Errors that can occur in channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Opening the link failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The frame was refused before any byte was written.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Encoding a record failed.
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// There is no open link to send on.
    #[error("channel is not connected")]
    NotConnected,

    /// Writing to the link failed; the channel has been halted.
    #[error("send failed: {0}")]
    SendFailed(#[source] FrameError),

    /// The channel was halted and must be reconnected explicitly.
    #[error("channel halted")]
    Halted,

    /// The receive thread could not be started.
    #[error("failed to start receive thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
