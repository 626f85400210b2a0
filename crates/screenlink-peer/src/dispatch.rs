use screenlink_frame::{ArmState, Frame, FrameError, MessageType};
use tracing::trace;

use crate::handler::{PeripheralEvent, PeripheralHandler};

/// Convert a decoded frame into a typed event.
///
/// Device-originated types observed inbound yield `Ok(None)`: they are
/// dropped, not treated as errors. An undefined arm-state byte fails with
/// `InvalidData`.
pub fn decode_event(frame: &Frame) -> Result<Option<PeripheralEvent>, FrameError> {
    if !frame.msg_type.is_from_peripheral() {
        trace!(msg_type = %frame.msg_type, "ignoring device-originated frame");
        return Ok(None);
    }

    let event = match frame.msg_type {
        MessageType::RfidValue => PeripheralEvent::RfidReceived(hex::encode(&frame.payload)),
        MessageType::ArmStatus => {
            PeripheralEvent::ArmStateChanged(ArmState::try_from(first_byte(frame)?)?)
        }
        MessageType::BatteryLevel => PeripheralEvent::BatteryLevel(first_byte(frame)?),
        other => {
            return Err(FrameError::InvalidData(format!(
                "no dispatch rule for {other}"
            )))
        }
    };
    Ok(Some(event))
}

/// Decode `frame` and invoke the matching handler callback.
///
/// Returns the delivered event, or `None` when the frame was ignored.
pub fn dispatch<H: PeripheralHandler + ?Sized>(
    frame: &Frame,
    handler: &mut H,
) -> Result<Option<PeripheralEvent>, FrameError> {
    let event = decode_event(frame)?;
    if let Some(event) = &event {
        event.deliver(handler);
    }
    Ok(event)
}

fn first_byte(frame: &Frame) -> Result<u8, FrameError> {
    frame
        .payload
        .first()
        .copied()
        .ok_or(FrameError::InvalidPayloadLength {
            msg_type: frame.msg_type.name(),
            expected: frame.msg_type.payload_len(),
            actual: 0,
        })
}
