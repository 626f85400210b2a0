use screenlink_frame::{ParserState, StreamParser};
use screenlink_transport::Transmit;
use serde_json::Value;
use tracing::{debug, warn};

use crate::command::{Commander, OutboundCommand};
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::handler::PeripheralHandler;

/// One physical link: a stream parser feeding a handler, plus a commander
/// writing to the same link.
///
/// Frame errors never escape [`feed`](Session::feed); they are logged and
/// the parser resynchronises on the next start byte.
pub struct Session<H, T> {
    parser: StreamParser,
    handler: H,
    commander: Commander<T>,
}

impl<H: PeripheralHandler, T: Transmit> Session<H, T> {
    pub fn new(handler: H, transmitter: T) -> Self {
        Self {
            parser: StreamParser::new(),
            handler,
            commander: Commander::new(transmitter),
        }
    }

    /// Feed received bytes, dispatching every completed frame.
    ///
    /// Returns the number of events delivered to the handler.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let mut delivered = 0;
        for &byte in bytes {
            let Some(result) = self.parser.push(byte) else {
                continue;
            };
            match result.and_then(|frame| dispatch(&frame, &mut self.handler)) {
                Ok(Some(event)) => {
                    debug!(event = event.name(), "event delivered");
                    delivered += 1;
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "dropping frame"),
            }
        }
        delivered
    }

    /// Apply one inbound command queue entry, sending it when it maps to
    /// a peripheral command.
    pub fn apply(&mut self, field: &str, value: &Value) -> Result<Option<OutboundCommand>> {
        let Some(command) = OutboundCommand::from_field(field, value)? else {
            return Ok(None);
        };
        self.commander.send(&command)?;
        Ok(Some(command))
    }

    pub fn commander(&self) -> &Commander<T> {
        &self.commander
    }

    pub fn commander_mut(&mut self) -> &mut Commander<T> {
        &mut self.commander
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn parser_state(&self) -> ParserState {
        self.parser.state()
    }

    /// Drop any partial inbound frame.
    pub fn reset_parser(&mut self) {
        self.parser.reset();
    }

    pub fn into_parts(self) -> (H, Commander<T>) {
        (self.handler, self.commander)
    }
}
