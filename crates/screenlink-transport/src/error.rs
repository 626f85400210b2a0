/// Errors that can occur on the physical link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link accepted zero bytes for a non-empty write.
    #[error("link closed (write returned zero bytes)")]
    WriteZero,
}

pub type Result<T> = std::result::Result<T, TransportError>;
