use std::time::Duration;

/// Errors that can occur on a connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] gamewire_transport::TransportError),

    /// Frame-level error while setting up the stream.
    #[error("frame error: {0}")]
    Frame(#[from] gamewire_frame::FrameError),

    /// Packet-level error.
    #[error("packet error: {0}")]
    Packet(#[from] gamewire_packet::PacketError),

    /// A receive or send thread could not be started.
    #[error("failed to spawn connection thread: {0}")]
    Spawn(std::io::Error),

    /// The connection is closed; no more packets will arrive or leave.
    #[error("connection closed")]
    Closed,

    /// Nothing arrived in time.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The outbound queue is full.
    #[error("outbound queue full")]
    Full,
}

pub type Result<T> = std::result::Result<T, SessionError>;
