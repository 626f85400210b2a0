use crate::error::{FrameError, Result};
use crate::registry::{MessageType, ValueKind};

/// Mechanical state reported by the peripheral for the robot arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArmState {
    Idle = 0x01,
    Ready = 0x02,
    Closed = 0x04,
    Display = 0x08,
}

impl ArmState {
    /// Wire byte for this state.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ArmState::Idle => "idle",
            ArmState::Ready => "ready",
            ArmState::Closed => "closed",
            ArmState::Display => "display",
        }
    }
}

impl TryFrom<u8> for ArmState {
    type Error = FrameError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(ArmState::Idle),
            0x02 => Ok(ArmState::Ready),
            0x04 => Ok(ArmState::Closed),
            0x08 => Ok(ArmState::Display),
            other => Err(FrameError::InvalidData(format!(
                "invalid arm state 0x{other:02x}"
            ))),
        }
    }
}

impl std::fmt::Display for ArmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A semantic value carried by a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValue {
    Integer(u8),
    Text(String),
    Boolean(bool),
    Arm(ArmState),
    Raw(Vec<u8>),
}

impl MessageValue {
    /// Convert to payload bytes for `msg_type`.
    ///
    /// Only the variant is checked against the type's [`ValueKind`]; range
    /// checks belong to the command layer. Text is space-padded or truncated
    /// to the fixed payload length.
    pub fn to_payload(&self, msg_type: MessageType) -> Result<Vec<u8>> {
        match (msg_type.descriptor().kind, self) {
            (ValueKind::Integer { .. }, MessageValue::Integer(n)) => Ok(vec![*n]),
            (ValueKind::Boolean, MessageValue::Boolean(b)) => Ok(vec![u8::from(*b)]),
            (ValueKind::ArmState, MessageValue::Arm(state)) => Ok(vec![state.as_byte()]),
            (ValueKind::RawBytes, MessageValue::Raw(bytes)) => Ok(bytes.clone()),
            (ValueKind::Text, MessageValue::Text(text)) => {
                if !text.is_ascii() {
                    return Err(FrameError::InvalidData(format!(
                        "{msg_type} must be ASCII: {text:?}"
                    )));
                }
                let mut payload = text.as_bytes().to_vec();
                payload.resize(msg_type.payload_len(), b' ');
                Ok(payload)
            }
            (kind, value) => Err(FrameError::InvalidData(format!(
                "{value:?} does not match {msg_type} ({kind:?})"
            ))),
        }
    }
}
