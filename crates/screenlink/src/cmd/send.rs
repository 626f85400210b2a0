use screenlink_peer::Commander;
use screenlink_transport::{LinkWriter, SerialLink};
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{frame_error, peer_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_command, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = args.command.to_command()?;
    // Reject bad values before touching the device.
    command
        .to_payload()
        .map_err(|err| frame_error("invalid command", err))?;

    let config = args.link.serial_config()?;
    let link = SerialLink::open(&config).map_err(|err| transport_error("open failed", err))?;
    let mut commander = Commander::new(LinkWriter::new(link));
    commander
        .send(&command)
        .map_err(|err| peer_error("send failed", err))?;

    info!(port = %config.port, msg_type = %command.msg_type(), "command sent");
    print_command(&command, commander.last_frame(), format);
    Ok(SUCCESS)
}
