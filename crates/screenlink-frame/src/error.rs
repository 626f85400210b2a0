/// Errors that can occur during frame encoding, decoding, or value conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The first byte of the frame is not the start sentinel.
    #[error("invalid frame start byte 0x{0:02x} (expected 0x8a)")]
    InvalidFrameStart(u8),

    /// The last byte of the frame is not the stop sentinel.
    #[error("invalid frame end byte 0x{0:02x} (expected 0x51)")]
    InvalidFrameEnd(u8),

    /// The frame is shorter than header plus footer.
    #[error("incomplete frame ({len} bytes, min 3)")]
    IncompleteFrame { len: usize },

    /// The payload length disagrees with the registry for the resolved type.
    #[error("invalid payload length for {msg_type}: {actual} bytes (expected {expected})")]
    InvalidPayloadLength {
        msg_type: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The type code has no registry entry.
    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),

    /// A value is outside its semantic domain.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The encoded payload exceeds the frame ceiling.
    #[error("payload too long ({size} bytes, max {max})")]
    PayloadTooLong { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
