use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::registry::MessageType;
use crate::value::MessageValue;

/// Start sentinel.
pub const FRAME_START: u8 = 0x8A;

/// Stop sentinel.
pub const FRAME_STOP: u8 = 0x51;

/// Frame header: start (1) + type (1).
pub const HEADER_LEN: usize = 2;

/// Frame footer: stop (1).
pub const FOOTER_LEN: usize = 1;

/// Smallest well-formed frame (empty payload).
pub const MIN_FRAME_LEN: usize = HEADER_LEN + FOOTER_LEN;

/// Payload ceiling for any message type.
pub const MAX_PAYLOAD_LEN: usize = 16;

/// A decoded frame: resolved type plus raw payload.
///
/// The payload length has been checked against the registry, but its contents
/// have not been checked against the type's semantic domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: MessageType,
    pub payload: Bytes,
}

impl Frame {
    /// The total wire size of this frame (header + payload + footer).
    pub fn wire_size(&self) -> usize {
        HEADER_LEN + self.payload.len() + FOOTER_LEN
    }
}

/// Encode a raw payload for `msg_type` into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬─────────┬──────────────────────┬─────────┐
/// │ START   │ TYPE    │ PAYLOAD              │ STOP    │
/// │ 0x8A    │ (1B)    │ (fixed per TYPE)     │ 0x51    │
/// └─────────┴─────────┴──────────────────────┴─────────┘
/// ```
pub fn encode_payload(msg_type: MessageType, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLong {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let expected = msg_type.payload_len();
    if payload.len() != expected {
        return Err(FrameError::InvalidData(format!(
            "invalid data length for {msg_type}: {} (expected {expected})",
            payload.len()
        )));
    }

    dst.reserve(MIN_FRAME_LEN + payload.len());
    dst.put_u8(FRAME_START);
    dst.put_u8(msg_type.code());
    dst.put_slice(payload);
    dst.put_u8(FRAME_STOP);
    Ok(())
}

/// Encode a semantic value for `msg_type` into a complete frame.
pub fn encode(msg_type: MessageType, value: &MessageValue) -> Result<Bytes> {
    let payload = value.to_payload(msg_type)?;
    let mut buf = BytesMut::with_capacity(MIN_FRAME_LEN + payload.len());
    encode_payload(msg_type, &payload, &mut buf)?;
    Ok(buf.freeze())
}

/// Decode one complete frame.
///
/// `src` must hold exactly one frame, sentinels included.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    if src.len() < MIN_FRAME_LEN {
        return Err(FrameError::IncompleteFrame { len: src.len() });
    }

    let first = src[0];
    let last = src[src.len() - 1];
    if first != FRAME_START {
        return Err(FrameError::InvalidFrameStart(first));
    }
    if last != FRAME_STOP {
        return Err(FrameError::InvalidFrameEnd(last));
    }

    let msg_type = MessageType::from_code(src[1])?;

    let payload = &src[HEADER_LEN..src.len() - FOOTER_LEN];
    let expected = msg_type.payload_len();
    if payload.len() != expected {
        return Err(FrameError::InvalidPayloadLength {
            msg_type: msg_type.name(),
            expected,
            actual: payload.len(),
        });
    }

    Ok(Frame {
        msg_type,
        payload: Bytes::copy_from_slice(payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArmState;

    #[test]
    fn encode_tool_id() {
        let frame = encode(MessageType::ToolId, &MessageValue::Integer(5)).unwrap();
        assert_eq!(frame.as_ref(), &[0x8A, 0x01, 0x05, 0x51]);
    }

    #[test]
    fn encode_decode_roundtrip_device_types() {
        let cases = [
            (MessageType::ToolId, MessageValue::Integer(1), vec![1u8]),
            (MessageType::ToolId, MessageValue::Integer(6), vec![6]),
            (
                MessageType::ToolName,
                MessageValue::Text("pince".into()),
                b"pince           ".to_vec(),
            ),
            (MessageType::FollowModeEnable, MessageValue::Boolean(true), vec![1]),
            (MessageType::RfidValid, MessageValue::Boolean(false), vec![0]),
        ];

        for (msg_type, value, canonical) in cases {
            let wire = encode(msg_type, &value).unwrap();
            let frame = decode_frame(&wire).unwrap();
            assert_eq!(frame.msg_type, msg_type);
            assert_eq!(frame.payload.as_ref(), canonical.as_slice());
            assert_eq!(frame.wire_size(), wire.len());
        }
    }

    #[test]
    fn decode_arm_status() {
        let frame = decode_frame(&[0x8A, 0x82, 0x02, 0x51]).unwrap();
        assert_eq!(frame.msg_type, MessageType::ArmStatus);
        assert_eq!(ArmState::try_from(frame.payload[0]).unwrap(), ArmState::Ready);
    }

    #[test]
    fn decode_rfid_value() {
        let frame = decode_frame(&[0x8A, 0x84, 0xDE, 0xAD, 0xBE, 0xEF, 0x51]).unwrap();
        assert_eq!(frame.msg_type, MessageType::RfidValue);
        assert_eq!(frame.payload.as_ref(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn decode_too_short() {
        assert_eq!(
            decode_frame(&[0x8A, 0x01]),
            Err(FrameError::IncompleteFrame { len: 2 })
        );
        assert_eq!(
            decode_frame(&[]),
            Err(FrameError::IncompleteFrame { len: 0 })
        );
    }

    #[test]
    fn decode_wrong_start() {
        assert_eq!(
            decode_frame(&[0x00, 0x01, 0x05, 0x51]),
            Err(FrameError::InvalidFrameStart(0x00))
        );
    }

    #[test]
    fn decode_wrong_stop() {
        assert_eq!(
            decode_frame(&[0x8A, 0x01, 0x05, 0x52]),
            Err(FrameError::InvalidFrameEnd(0x52))
        );
    }

    #[test]
    fn decode_unknown_type() {
        assert_eq!(
            decode_frame(&[0x8A, 0x99, 0x51]),
            Err(FrameError::UnknownMessageType(0x99))
        );
    }

    #[test]
    fn decode_payload_length_mismatch() {
        assert_eq!(
            decode_frame(&[0x8A, 0x84, 0xDE, 0xAD, 0x51]),
            Err(FrameError::InvalidPayloadLength {
                msg_type: "rfid_value",
                expected: 4,
                actual: 2,
            })
        );
        assert!(matches!(
            decode_frame(&[0x8A, 0x01, 0x05, 0x06, 0x51]),
            Err(FrameError::InvalidPayloadLength { .. })
        ));
    }

    #[test]
    fn encode_payload_too_long() {
        let raw = MessageValue::Raw(vec![0; 17]);
        assert_eq!(
            encode(MessageType::RfidValue, &raw),
            Err(FrameError::PayloadTooLong { size: 17, max: 16 })
        );
    }

    #[test]
    fn encode_tool_name_pads_with_spaces() {
        let frame = encode(MessageType::ToolName, &MessageValue::Text("marteau".into())).unwrap();
        assert_eq!(frame.len(), 19);
        assert_eq!(&frame[..2], &[0x8A, 0x02]);
        assert_eq!(&frame[2..18], b"marteau         ");
        assert_eq!(frame[18], 0x51);
    }

    #[test]
    fn encode_payload_wrong_length() {
        let mut buf = BytesMut::new();
        let err = encode_payload(MessageType::ToolName, b"short", &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::InvalidData(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_payload_appends() {
        let mut buf = BytesMut::new();
        encode_payload(MessageType::FollowModeEnable, &[1], &mut buf).unwrap();
        encode_payload(MessageType::RfidValid, &[0], &mut buf).unwrap();
        assert_eq!(
            buf.as_ref(),
            &[0x8A, 0x04, 0x01, 0x51, 0x8A, 0x08, 0x00, 0x51]
        );
    }
}
