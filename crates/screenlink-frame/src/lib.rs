//! Fixed-catalog message framing for the screen UART link.
//!
//! Every message on the wire is framed as:
//! - a start sentinel (`0x8A`)
//! - a one-byte message type code
//! - a payload whose length is fixed per message type (1 to 16 bytes)
//! - a stop sentinel (`0x51`)
//!
//! The catalog is closed: [`registry`] holds the only message types that can
//! be encoded or decoded. [`StreamParser`] rebuilds frames from a raw byte
//! stream one byte at a time and never lets a malformed frame escape as more
//! than a returned error.

pub mod codec;
pub mod error;
pub mod parser;
pub mod registry;
pub mod value;

pub use codec::{
    decode_frame, encode, encode_payload, Frame, FOOTER_LEN, FRAME_START, FRAME_STOP, HEADER_LEN,
    MAX_PAYLOAD_LEN, MIN_FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use parser::{ParserState, StreamParser};
pub use registry::{lookup, Direction, MessageDescriptor, MessageType, ValueKind, REGISTRY};
pub use value::{ArmState, MessageValue};
