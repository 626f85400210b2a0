use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::codec::{decode_frame, Frame, FOOTER_LEN, FRAME_START, MAX_PAYLOAD_LEN, MIN_FRAME_LEN};
use crate::error::Result;
use crate::registry::lookup;

/// Where the parser is within the current frame attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the start sentinel; everything else is discarded.
    Idle,
    /// Start seen, waiting for the type byte.
    ReadingHeader,
    /// Reading the fixed-length payload.
    ReadingPayload,
    /// Waiting for the stop sentinel.
    ReadingFooter,
}

/// Rebuilds frames from an unbounded byte stream, one byte at a time.
///
/// One parser belongs to one physical link. Feeding takes `&mut self`, so a
/// parser can only ever have a single writer; share it across threads only
/// behind a lock owned by the caller.
///
/// There is no timeout: a partial frame waits indefinitely for its next byte.
#[derive(Debug, Clone)]
pub struct StreamParser {
    buf: BytesMut,
    remaining: usize,
    state: ParserState,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    /// Create an idle parser.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MIN_FRAME_LEN + MAX_PAYLOAD_LEN),
            remaining: 0,
            state: ParserState::Idle,
        }
    }

    /// Drop any partial frame and return to idle.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.remaining = 0;
        self.state = ParserState::Idle;
    }

    /// Current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Bytes accumulated for the frame in progress.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Returns true when no frame is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle && self.buf.is_empty()
    }

    /// Feed one received byte.
    ///
    /// Returns `Some` exactly once per completed frame attempt: the decoded
    /// frame, or the reason it was rejected. Either way the parser is idle
    /// again afterwards.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame>> {
        match self.state {
            ParserState::Idle => {
                if byte == FRAME_START {
                    self.buf.clear();
                    self.buf.put_u8(byte);
                    self.remaining = 1;
                    self.state = ParserState::ReadingHeader;
                }
                None
            }
            ParserState::ReadingHeader => {
                self.store(byte);
                if self.remaining == 0 {
                    self.remaining = match lookup(byte) {
                        Ok(desc) => desc.length,
                        Err(_) => {
                            // Assume an empty payload: the next byte is taken as the stop byte.
                            debug!(code = byte, "unknown message type in header");
                            0
                        }
                    };
                    self.state = ParserState::ReadingPayload;
                }
                None
            }
            ParserState::ReadingPayload if self.remaining == 0 => {
                self.store_footer(byte);
                Some(self.complete())
            }
            ParserState::ReadingPayload => {
                self.store(byte);
                if self.remaining == 0 {
                    self.remaining = FOOTER_LEN;
                    self.state = ParserState::ReadingFooter;
                }
                None
            }
            ParserState::ReadingFooter => {
                self.store(byte);
                if self.remaining == 0 {
                    return Some(self.complete());
                }
                None
            }
        }
    }

    fn store(&mut self, byte: u8) {
        self.buf.put_u8(byte);
        self.remaining -= 1;
    }

    fn store_footer(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    fn complete(&mut self) -> Result<Frame> {
        let result = decode_frame(&self.buf);
        if let Ok(frame) = &result {
            debug!(msg_type = %frame.msg_type, len = frame.payload.len(), "frame parsed");
        }
        self.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::codec::{encode, FRAME_STOP};
    use crate::error::FrameError;
    use crate::registry::{MessageType, REGISTRY};
    use crate::value::MessageValue;

    fn feed_all(parser: &mut StreamParser, bytes: &[u8]) -> Vec<Result<Frame>> {
        bytes.iter().filter_map(|&b| parser.push(b)).collect()
    }

    #[test]
    fn noise_before_rfid_frame() {
        let mut parser = StreamParser::new();
        let results = feed_all(
            &mut parser,
            &[0xFF, 0xFF, 0x8A, 0x84, 0xDE, 0xAD, 0xBE, 0xEF, 0x51],
        );

        assert_eq!(results.len(), 1);
        let frame = results[0].as_ref().unwrap();
        assert_eq!(frame.msg_type, MessageType::RfidValue);
        assert_eq!(frame.payload.as_ref(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(parser.is_idle());
    }

    #[test]
    fn unknown_type_takes_next_byte_as_stop() {
        let mut parser = StreamParser::new();

        assert!(parser.push(0x8A).is_none());
        assert_eq!(parser.state(), ParserState::ReadingHeader);
        assert!(parser.push(0x99).is_none());
        assert_eq!(parser.state(), ParserState::ReadingPayload);

        let result = parser.push(0x51).expect("frame attempt should complete");
        assert_eq!(result, Err(FrameError::UnknownMessageType(0x99)));
        assert!(parser.is_idle());

        let results = feed_all(&mut parser, &[0x8A, 0x82, 0x02, 0x51]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().msg_type, MessageType::ArmStatus);
    }

    #[test]
    fn state_transitions_for_one_byte_payload() {
        let mut parser = StreamParser::new();
        let states: Vec<ParserState> = [0x8A, 0x81, 0x7F]
            .iter()
            .map(|&b| {
                assert!(parser.push(b).is_none());
                parser.state()
            })
            .collect();

        assert_eq!(
            states,
            vec![
                ParserState::ReadingHeader,
                ParserState::ReadingPayload,
                ParserState::ReadingFooter,
            ]
        );
        assert_eq!(parser.buffered(), &[0x8A, 0x81, 0x7F]);

        let frame = parser.push(0x51).unwrap().unwrap();
        assert_eq!(frame.msg_type, MessageType::BatteryLevel);
        assert_eq!(frame.payload.as_ref(), &[0x7F]);
    }

    #[test]
    fn bad_stop_byte_resets_and_recovers() {
        let mut parser = StreamParser::new();
        let results = feed_all(
            &mut parser,
            &[0x8A, 0x81, 0x10, 0x00, 0x8A, 0x81, 0x20, 0x51],
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Err(FrameError::InvalidFrameEnd(0x00)));
        assert_eq!(results[1].as_ref().unwrap().payload.as_ref(), &[0x20]);
        assert!(parser.is_idle());
    }

    #[test]
    fn payload_bytes_matching_sentinels_are_accepted_verbatim() {
        let mut parser = StreamParser::new();
        let results = feed_all(
            &mut parser,
            &[0x8A, 0x84, 0x8A, 0x51, 0x8A, 0x51, 0x51],
        );

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].as_ref().unwrap().payload.as_ref(),
            &[0x8A, 0x51, 0x8A, 0x51]
        );
    }

    #[test]
    fn partial_frame_waits_indefinitely() {
        let mut parser = StreamParser::new();
        assert!(feed_all(&mut parser, &[0x8A, 0x84, 0x01, 0x02]).is_empty());
        assert_eq!(parser.state(), ParserState::ReadingPayload);
        assert_eq!(parser.buffered(), &[0x8A, 0x84, 0x01, 0x02]);

        let results = feed_all(&mut parser, &[0x03, 0x04, 0x51]);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn reset_drops_partial_frame() {
        let mut parser = StreamParser::new();
        feed_all(&mut parser, &[0x8A, 0x02, b'a', b'b']);
        parser.reset();

        assert!(parser.is_idle());
        assert!(parser.buffered().is_empty());
    }

    #[test]
    fn unknown_type_with_payload_can_swallow_next_frame() {
        // A peer-side type missing from the registry, carrying two payload
        // bytes, followed by a valid battery frame. The guessed stop byte is
        // wrong, and the trailing payload byte happens to be a start sentinel,
        // which desynchronises the parser long enough to lose the next frame.
        let mut parser = StreamParser::new();
        let results = feed_all(
            &mut parser,
            &[0x8A, 0x99, 0x01, 0x8A, 0x51, 0x8A, 0x81, 0x40, 0x51],
        );

        assert_eq!(
            results,
            vec![
                Err(FrameError::InvalidFrameEnd(0x01)),
                Err(FrameError::InvalidFrameEnd(0x8A)),
            ]
        );
        assert!(parser.is_idle());
    }

    fn device_frame() -> impl Strategy<Value = (MessageType, MessageValue, Vec<u8>)> {
        prop_oneof![
            (1u8..=6).prop_map(|id| (MessageType::ToolId, MessageValue::Integer(id), vec![id])),
            "[a-zA-Z0-9]{1,16}".prop_map(|name| {
                let padded = format!("{name:<16}");
                (MessageType::ToolName, MessageValue::Text(name), padded.into_bytes())
            }),
            any::<bool>().prop_map(|b| {
                (MessageType::FollowModeEnable, MessageValue::Boolean(b), vec![u8::from(b)])
            }),
            any::<bool>().prop_map(|b| {
                (MessageType::RfidValid, MessageValue::Boolean(b), vec![u8::from(b)])
            }),
        ]
    }

    fn any_frame() -> impl Strategy<Value = (MessageType, Vec<u8>)> {
        (0..REGISTRY.len()).prop_flat_map(|idx| {
            let desc = REGISTRY[idx];
            proptest::collection::vec(any::<u8>(), desc.length)
                .prop_map(move |payload| (desc.msg_type, payload))
        })
    }

    fn wire(msg_type: MessageType, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![FRAME_START, msg_type.code()];
        out.extend_from_slice(payload);
        out.push(FRAME_STOP);
        out
    }

    proptest! {
        #[test]
        fn device_values_roundtrip((msg_type, value, canonical) in device_frame()) {
            let encoded = encode(msg_type, &value).unwrap();
            let frame = decode_frame(&encoded).unwrap();
            prop_assert_eq!(frame.msg_type, msg_type);
            prop_assert_eq!(frame.payload.as_ref(), canonical.as_slice());
        }

        #[test]
        fn noise_without_start_never_corrupts_next_frame(
            noise in proptest::collection::vec(any::<u8>().prop_filter("not a start byte", |b| *b != FRAME_START), 0..64),
            (msg_type, payload) in any_frame(),
        ) {
            let mut parser = StreamParser::new();
            let mut bytes = noise;
            bytes.extend(wire(msg_type, &payload));

            let results = feed_all(&mut parser, &bytes);
            prop_assert_eq!(results.len(), 1);
            let frame = results[0].clone().unwrap();
            prop_assert_eq!(frame.msg_type, msg_type);
            prop_assert_eq!(frame.payload.as_ref(), payload.as_slice());
            prop_assert!(parser.is_idle());
        }

        #[test]
        fn back_to_back_frames_all_parse(frames in proptest::collection::vec(any_frame(), 1..16)) {
            let mut parser = StreamParser::new();
            let bytes: Vec<u8> = frames.iter().flat_map(|(t, p)| wire(*t, p)).collect();

            let results = feed_all(&mut parser, &bytes);
            prop_assert_eq!(results.len(), frames.len());
            for (result, (msg_type, payload)) in results.iter().zip(&frames) {
                let frame = result.as_ref().unwrap();
                prop_assert_eq!(frame.msg_type, *msg_type);
                prop_assert_eq!(frame.payload.as_ref(), payload.as_slice());
            }
        }

        #[test]
        fn unknown_empty_frame_then_valid_frame_resyncs(
            code in any::<u8>().prop_filter("unregistered", |c| lookup(*c).is_err()),
            (msg_type, payload) in any_frame(),
        ) {
            let mut parser = StreamParser::new();
            let mut bytes = vec![FRAME_START, code, FRAME_STOP];
            bytes.extend(wire(msg_type, &payload));

            let results = feed_all(&mut parser, &bytes);
            prop_assert_eq!(results.len(), 2);
            prop_assert_eq!(&results[0], &Err(FrameError::UnknownMessageType(code)));
            prop_assert_eq!(results[1].as_ref().unwrap().msg_type, msg_type);
        }

        #[test]
        fn unknown_type_with_payload_loses_at_most_one_frame(
            code in any::<u8>().prop_filter("unregistered", |c| lookup(*c).is_err()),
            junk in proptest::collection::vec(
                any::<u8>().prop_filter("not a start byte", |b| *b != FRAME_START),
                0..=16,
            ),
            frames in proptest::collection::vec(any_frame(), 1..8),
        ) {
            let mut parser = StreamParser::new();
            let mut bytes = vec![FRAME_START, code];
            bytes.extend_from_slice(&junk);
            bytes.push(FRAME_STOP);
            for (msg_type, payload) in &frames {
                bytes.extend(wire(*msg_type, payload));
            }

            let mut decoded = Vec::new();
            for byte in bytes {
                if let Some(result) = parser.push(byte) {
                    prop_assert!(parser.is_idle());
                    if let Ok(frame) = result {
                        decoded.push((frame.msg_type, frame.payload.to_vec()));
                    }
                }
            }

            prop_assert!(decoded.len() <= frames.len());
            let lost = frames.len() - decoded.len();
            prop_assert!(lost <= 1, "lost {} frames", lost);
            prop_assert_eq!(&decoded[..], &frames[lost..]);
            prop_assert!(parser.is_idle());
        }

        #[test]
        fn arbitrary_input_keeps_buffer_bounded(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut parser = StreamParser::new();
            for byte in bytes {
                if parser.push(byte).is_some() {
                    prop_assert!(parser.is_idle());
                }
                prop_assert!(parser.buffered().len() <= MIN_FRAME_LEN + MAX_PAYLOAD_LEN);
            }
        }
    }
}
