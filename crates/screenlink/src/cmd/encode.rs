use screenlink_peer::Commander;
use screenlink_transport::LinkWriter;

use crate::cmd::EncodeArgs;
use crate::exit::{peer_error, CliResult, SUCCESS};
use crate::output::{print_command, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let command = args.command.to_command()?;
    let mut commander = Commander::new(LinkWriter::new(std::io::sink()));
    commander
        .send(&command)
        .map_err(|err| peer_error("encode failed", err))?;

    print_command(&command, commander.last_frame(), format);
    Ok(SUCCESS)
}
