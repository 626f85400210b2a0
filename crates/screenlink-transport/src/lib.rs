//! Physical link transport for the screen UART protocol.
//!
//! Provides the two capabilities the protocol engine consumes from its
//! environment:
//! - [`Transmit`], the write side used to place encoded frames on the wire
//! - [`SerialLink`], a serial port whose received bytes are fed to the parser
//!
//! This is the lowest layer of screenlink. Framing lives in
//! `screenlink-frame`; nothing here knows about frame contents.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{SerialConfig, SerialLink, DEFAULT_BAUD_RATE, DEFAULT_PORT};
pub use traits::{LinkWriter, Transmit};
