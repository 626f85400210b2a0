/// Errors that can occur in peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Frame-level or value-domain error.
    #[error("frame error: {0}")]
    Frame(#[from] screenlink_frame::FrameError),

    /// The transmit capability failed to send a frame.
    #[error("uart error: {0}")]
    Uart(#[source] screenlink_transport::TransportError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PeerError {
    /// Returns true for semantic-domain rejections (`InvalidData`).
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            PeerError::Frame(screenlink_frame::FrameError::InvalidData(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
