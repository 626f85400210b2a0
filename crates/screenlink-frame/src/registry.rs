//! Message type registry.
//!
//! Codes `0x01..=0x08` are sent by the device to the peripheral display.
//! Codes `0x81..=0x84` originate from the peripheral. The table is static and
//! read-only, so it may be shared freely between parser sessions.

use crate::error::{FrameError, Result};

/// Which side of the link originates a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device → peripheral (commands).
    ToPeripheral,
    /// Peripheral → device (events).
    FromPeripheral,
}

/// Semantic domain of a message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Unsigned integer in the inclusive range `min..=max`, one byte.
    Integer { min: u8, max: u8 },
    /// ASCII text padded to the payload length.
    Text,
    /// `1` for true, `0` for false.
    Boolean,
    /// One [`ArmState`](crate::ArmState) byte.
    ArmState,
    /// Opaque identifier bytes.
    RawBytes,
}

/// Closed catalog of message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    ToolId = 0x01,
    ToolName = 0x02,
    FollowModeEnable = 0x04,
    RfidValid = 0x08,
    BatteryLevel = 0x81,
    ArmStatus = 0x82,
    RfidValue = 0x84,
}

/// Static description of one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub msg_type: MessageType,
    pub direction: Direction,
    /// Fixed payload length in bytes.
    pub length: usize,
    pub kind: ValueKind,
}

/// The full catalog, ordered by code.
pub static REGISTRY: [MessageDescriptor; 7] = [
    MessageDescriptor {
        msg_type: MessageType::ToolId,
        direction: Direction::ToPeripheral,
        length: 1,
        kind: ValueKind::Integer { min: 1, max: 6 },
    },
    MessageDescriptor {
        msg_type: MessageType::ToolName,
        direction: Direction::ToPeripheral,
        length: 16,
        kind: ValueKind::Text,
    },
    MessageDescriptor {
        msg_type: MessageType::FollowModeEnable,
        direction: Direction::ToPeripheral,
        length: 1,
        kind: ValueKind::Boolean,
    },
    MessageDescriptor {
        msg_type: MessageType::RfidValid,
        direction: Direction::ToPeripheral,
        length: 1,
        kind: ValueKind::Boolean,
    },
    MessageDescriptor {
        msg_type: MessageType::BatteryLevel,
        direction: Direction::FromPeripheral,
        length: 1,
        kind: ValueKind::Integer { min: 0, max: 255 },
    },
    MessageDescriptor {
        msg_type: MessageType::ArmStatus,
        direction: Direction::FromPeripheral,
        length: 1,
        kind: ValueKind::ArmState,
    },
    MessageDescriptor {
        msg_type: MessageType::RfidValue,
        direction: Direction::FromPeripheral,
        length: 4,
        kind: ValueKind::RawBytes,
    },
];

/// Resolve a type code to its descriptor.
pub fn lookup(code: u8) -> Result<&'static MessageDescriptor> {
    REGISTRY
        .iter()
        .find(|desc| desc.msg_type.code() == code)
        .ok_or(FrameError::UnknownMessageType(code))
}

impl MessageType {
    /// Every catalog entry, ordered by code.
    pub const ALL: [MessageType; 7] = [
        MessageType::ToolId,
        MessageType::ToolName,
        MessageType::FollowModeEnable,
        MessageType::RfidValid,
        MessageType::BatteryLevel,
        MessageType::ArmStatus,
        MessageType::RfidValue,
    ];

    /// Resolve a wire code.
    pub fn from_code(code: u8) -> Result<Self> {
        lookup(code).map(|desc| desc.msg_type)
    }

    /// Wire code of this type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Registry entry for this type.
    pub fn descriptor(self) -> &'static MessageDescriptor {
        match self {
            MessageType::ToolId => &REGISTRY[0],
            MessageType::ToolName => &REGISTRY[1],
            MessageType::FollowModeEnable => &REGISTRY[2],
            MessageType::RfidValid => &REGISTRY[3],
            MessageType::BatteryLevel => &REGISTRY[4],
            MessageType::ArmStatus => &REGISTRY[5],
            MessageType::RfidValue => &REGISTRY[6],
        }
    }

    /// Fixed payload length.
    pub fn payload_len(self) -> usize {
        self.descriptor().length
    }

    /// Returns true for peripheral-originated (inbound) types.
    pub fn is_from_peripheral(self) -> bool {
        self.descriptor().direction == Direction::FromPeripheral
    }

    /// Human-readable name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::ToolId => "tool_id",
            MessageType::ToolName => "tool_name",
            MessageType::FollowModeEnable => "follow_mode_enable",
            MessageType::RfidValid => "rfid_valid",
            MessageType::BatteryLevel => "battery_level",
            MessageType::ArmStatus => "arm_status",
            MessageType::RfidValue => "rfid_value",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
