//! Framed UART protocol between a robot controller and its screen peripheral.
//!
//! The link carries short fixed-length frames (`0x8A, TYPE, PAYLOAD, 0x51`)
//! in both directions over a single serial line.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial link and the `Transmit` capability
//! - [`frame`]: message registry, frame codec and stream parser
//! - [`peer`]: event dispatch, outbound commands and per-link sessions

/// Re-export transport types.
pub mod transport {
    pub use screenlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use screenlink_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use screenlink_peer::*;
}
