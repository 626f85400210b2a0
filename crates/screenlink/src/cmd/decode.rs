use screenlink_frame::ParserState;
use screenlink_peer::{EventLog, Session};
use screenlink_transport::LinkWriter;
use tracing::warn;

use crate::cmd::DecodeArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_events, OutputFormat, ReportedEvent};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;

    let mut session = Session::new(EventLog::new(), LinkWriter::new(std::io::sink()));
    session.feed(&bytes);
    if session.parser_state() != ParserState::Idle {
        warn!(state = ?session.parser_state(), "input ends inside a frame");
    }

    let events: Vec<ReportedEvent> = session
        .handler_mut()
        .drain()
        .into_iter()
        .map(ReportedEvent::from)
        .collect();
    print_events(&events, format);
    Ok(SUCCESS)
}

fn parse_hex(parts: &[String]) -> CliResult<Vec<u8>> {
    let joined: String = parts
        .iter()
        .flat_map(|part| part.chars())
        .filter(|c| !c.is_whitespace())
        .collect();
    let digits = joined
        .strip_prefix("0x")
        .or_else(|| joined.strip_prefix("0X"))
        .unwrap_or(&joined);
    hex::decode(digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_joins_parts_and_spaces() {
        let parts = vec!["ff ff 8a84".to_string(), "DEADBEEF".to_string(), "51".to_string()];
        assert_eq!(
            parse_hex(&parts).unwrap(),
            vec![0xFF, 0xFF, 0x8A, 0x84, 0xDE, 0xAD, 0xBE, 0xEF, 0x51]
        );
    }

    #[test]
    fn parse_hex_rejects_odd_length() {
        assert_eq!(parse_hex(&["8a8".to_string()]).unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_hex_accepts_prefix() {
        assert_eq!(parse_hex(&["0x8a9951".to_string()]).unwrap(), vec![0x8A, 0x99, 0x51]);
    }
}
