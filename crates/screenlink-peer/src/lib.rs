//! Peripheral-facing layer of the screen UART protocol.
//!
//! Turns validated inbound frames into typed [`PeripheralEvent`]s delivered
//! to a [`PeripheralHandler`], and turns outbound commands into frames handed
//! to a [`Transmit`](screenlink_transport::Transmit) capability. A
//! [`Session`] ties one stream parser, one handler and one commander to a
//! single physical link.

pub mod command;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod session;

pub use command::{
    parse_queue_entry, CommandField, Commander, OutboundCommand, MAX_TOOL_ID, TOOL_NAME_LEN,
};
pub use dispatch::{decode_event, dispatch};
pub use error::{PeerError, Result};
pub use handler::{EventLog, PeripheralEvent, PeripheralHandler};
pub use session::Session;
