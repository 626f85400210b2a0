use bytes::BytesMut;
use screenlink_frame::{encode_payload, FrameError, MessageType, MAX_PAYLOAD_LEN, MIN_FRAME_LEN};
use screenlink_transport::Transmit;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{PeerError, Result};

/// Exclusive upper bound for tool ids; valid ids are `1..MAX_TOOL_ID`.
pub const MAX_TOOL_ID: u8 = 7;

/// Tool names are padded or truncated to exactly this many ASCII bytes.
pub const TOOL_NAME_LEN: usize = 16;

/// A device-originated command for the peripheral display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum OutboundCommand {
    ToolId(u8),
    ToolName(String),
    FollowMode(bool),
    RfidValidity(bool),
}

impl OutboundCommand {
    /// Message type carrying this command.
    pub fn msg_type(&self) -> MessageType {
        match self {
            OutboundCommand::ToolId(_) => MessageType::ToolId,
            OutboundCommand::ToolName(_) => MessageType::ToolName,
            OutboundCommand::FollowMode(_) => MessageType::FollowModeEnable,
            OutboundCommand::RfidValidity(_) => MessageType::RfidValid,
        }
    }

    /// Validate the value domain and produce the canonical payload.
    pub fn to_payload(&self) -> std::result::Result<Vec<u8>, FrameError> {
        match self {
            OutboundCommand::ToolId(id) => {
                if !(0 < *id && *id < MAX_TOOL_ID) {
                    return Err(FrameError::InvalidData(format!(
                        "tool id out of range (0, {MAX_TOOL_ID}): {id}"
                    )));
                }
                Ok(vec![*id])
            }
            OutboundCommand::ToolName(name) => {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(FrameError::InvalidData(format!(
                        "tool name must be alphanumeric: {name:?}"
                    )));
                }
                let mut payload = name.as_bytes().to_vec();
                payload.resize(TOOL_NAME_LEN, b' ');
                Ok(payload)
            }
            OutboundCommand::FollowMode(enabled) => Ok(vec![u8::from(*enabled)]),
            OutboundCommand::RfidValidity(valid) => Ok(vec![u8::from(*valid)]),
        }
    }

    /// Map one inbound queue entry to a command.
    ///
    /// Returns `Ok(None)` for field names that are not forwarded to the
    /// peripheral; those are logged and dropped. A value of the wrong JSON
    /// type is `InvalidData`.
    pub fn from_field(name: &str, value: &Value) -> Result<Option<Self>> {
        let field = match CommandField::from_name(name) {
            Some(field) => field,
            None => {
                error!(field = name, "unknown command field");
                return Ok(None);
            }
        };

        let command = match field {
            CommandField::ToolNumber => {
                let id = value
                    .as_u64()
                    .and_then(|id| u8::try_from(id).ok())
                    .ok_or_else(|| invalid_value(field, value))?;
                OutboundCommand::ToolId(id)
            }
            CommandField::ToolName => {
                let name = value.as_str().ok_or_else(|| invalid_value(field, value))?;
                OutboundCommand::ToolName(name.to_string())
            }
            CommandField::UserFollowEnabled => {
                OutboundCommand::FollowMode(value.as_bool().ok_or_else(|| invalid_value(field, value))?)
            }
            CommandField::IsRfidValid => {
                OutboundCommand::RfidValidity(value.as_bool().ok_or_else(|| invalid_value(field, value))?)
            }
            CommandField::JoystickDirection
            | CommandField::Speed
            | CommandField::ArmMovement
            | CommandField::BatteryLevel => {
                warn!(field = field.as_str(), "command field not forwarded to peripheral");
                return Ok(None);
            }
        };
        Ok(Some(command))
    }
}

fn invalid_value(field: CommandField, value: &Value) -> PeerError {
    PeerError::Frame(FrameError::InvalidData(format!(
        "invalid value for {}: {value}",
        field.as_str()
    )))
}

/// Field names used by the inbound command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandField {
    ToolNumber,
    ToolName,
    UserFollowEnabled,
    JoystickDirection,
    Speed,
    IsRfidValid,
    ArmMovement,
    BatteryLevel,
}

impl CommandField {
    pub const ALL: [CommandField; 8] = [
        CommandField::ToolNumber,
        CommandField::ToolName,
        CommandField::UserFollowEnabled,
        CommandField::JoystickDirection,
        CommandField::Speed,
        CommandField::IsRfidValid,
        CommandField::ArmMovement,
        CommandField::BatteryLevel,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandField::ToolNumber => "tool_number",
            CommandField::ToolName => "tool_name",
            CommandField::UserFollowEnabled => "user_follow_enabled",
            CommandField::JoystickDirection => "joystick_direction",
            CommandField::Speed => "speed",
            CommandField::IsRfidValid => "is_rfid_valid",
            CommandField::ArmMovement => "arm_movement",
            CommandField::BatteryLevel => "battery_level",
        }
    }
}

/// Parse one queue line: a JSON object of `field: value` pairs.
pub fn parse_queue_entry(line: &str) -> Result<Vec<(String, Value)>> {
    let map: serde_json::Map<String, Value> = serde_json::from_str(line)?;
    Ok(map.into_iter().collect())
}

/// Validates, encodes and transmits outbound commands.
///
/// Validation errors are returned before anything is written; a transmit
/// failure surfaces as [`PeerError::Uart`]. There is no retry.
pub struct Commander<T> {
    transmitter: T,
    buf: BytesMut,
}

impl<T: Transmit> Commander<T> {
    pub fn new(transmitter: T) -> Self {
        Self {
            transmitter,
            buf: BytesMut::with_capacity(MIN_FRAME_LEN + MAX_PAYLOAD_LEN),
        }
    }

    /// Select the active tool. Valid ids are `1..=6`.
    pub fn set_tool_id(&mut self, id: u8) -> Result<()> {
        self.send(&OutboundCommand::ToolId(id))
    }

    /// Set the displayed tool name (alphanumeric, padded to 16 bytes).
    pub fn set_tool_name(&mut self, name: &str) -> Result<()> {
        self.send(&OutboundCommand::ToolName(name.to_string()))
    }

    /// Enable or disable user follow mode.
    pub fn set_follow_mode(&mut self, enabled: bool) -> Result<()> {
        self.send(&OutboundCommand::FollowMode(enabled))
    }

    /// Report whether the last scanned RFID tag is authorised.
    pub fn set_rfid_validity(&mut self, valid: bool) -> Result<()> {
        self.send(&OutboundCommand::RfidValidity(valid))
    }

    /// Encode and transmit a command.
    pub fn send(&mut self, command: &OutboundCommand) -> Result<()> {
        let msg_type = command.msg_type();
        let payload = command.to_payload()?;

        self.buf.clear();
        encode_payload(msg_type, &payload, &mut self.buf)?;

        self.transmitter
            .transmit(&self.buf)
            .map_err(PeerError::Uart)?;
        debug!(msg_type = %msg_type, frame = %hex::encode(&self.buf), "command sent");
        Ok(())
    }

    /// Frame bytes of the most recently encoded command.
    pub fn last_frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn get_ref(&self) -> &T {
        &self.transmitter
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    pub fn into_inner(self) -> T {
        self.transmitter
    }
}
