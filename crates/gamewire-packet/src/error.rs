use gamewire_frame::FrameError;
use gamewire_registry::{PacketId, ShapeMismatch};
use gamewire_value::ValueError;

/// Errors raised while encoding or decoding packets.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// Framing failed: the stream ended, the length was invalid, or I/O failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The payload bytes are not a valid encoding of the registered shape.
    #[error("payload error: {0}")]
    Value(#[from] ValueError),

    /// A frame arrived under an id with no registry entry. The frame was
    /// consumed in full.
    #[error("unknown packet id {0}")]
    UnknownPacketId(PacketId),

    /// The value handed to the encoder does not match the registered shape.
    /// Nothing was written.
    #[error("value does not match shape of packet {id}: {reason}")]
    ShapeMismatch {
        id: PacketId,
        #[source]
        reason: ShapeMismatch,
    },

    /// Encoding under an unregistered id while the registry requires one.
    #[error("packet id {0} is not registered")]
    Unregistered(PacketId),

    /// A typed read found a different packet than the one requested.
    #[error("expected packet {expected}, found {found}")]
    UnexpectedPacket { expected: PacketId, found: PacketId },
}

impl PacketError {
    /// Whether the connection this error came from should be closed.
    ///
    /// Stream-level failures and corrupt or over-nested payloads are fatal. Errors confined
    /// to one well-framed message (unknown id, a record missing a field, a
    /// value of the wrong kind) and every encode-side error are not.
    pub fn is_fatal(&self) -> bool {
        match self {
            PacketError::Frame(_) => true,
            PacketError::Value(err) => !matches!(
                err,
                ValueError::MissingField { .. }
                    | ValueError::UnknownField { .. }
                    | ValueError::TypeMismatch { .. }
            ),
            PacketError::UnknownPacketId(_)
            | PacketError::ShapeMismatch { .. }
            | PacketError::Unregistered(_)
            | PacketError::UnexpectedPacket { .. } => false,
        }
    }

    /// True when the peer closed the stream on a frame boundary.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, PacketError::Frame(FrameError::ConnectionClosed))
    }
}

impl From<std::io::Error> for PacketError {
    fn from(err: std::io::Error) -> Self {
        PacketError::Frame(FrameError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, PacketError>;
