use std::time::Duration;

use clap::{Args, Subcommand};
use screenlink_peer::OutboundCommand;
use screenlink_transport::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod catalog;
pub mod decode;
pub mod encode;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive the link: print peripheral events, apply JSON commands from stdin.
    Run(RunArgs),
    /// Send a single command to the peripheral.
    Send(SendArgs),
    /// Print the frame bytes for a command without opening the link.
    Encode(EncodeArgs),
    /// Parse hex bytes as a received stream and print the resulting events.
    Decode(DecodeArgs),
    /// List the message catalog.
    Catalog(CatalogArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Catalog(_) => catalog::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device path.
    #[arg(long, env = "SCREENLINK_PORT", default_value = DEFAULT_PORT)]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "SCREENLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout (e.g. 100ms, 1s).
    #[arg(long, env = "SCREENLINK_TIMEOUT", default_value = "100ms")]
    pub timeout: String,
}

impl LinkArgs {
    pub fn serial_config(&self) -> CliResult<SerialConfig> {
        Ok(SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud,
            timeout: parse_duration(&self.timeout)?,
        })
    }
}

/// Exactly one outbound command.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CommandArgs {
    /// Select tool 1..=6.
    #[arg(long, value_name = "ID")]
    pub tool_id: Option<u8>,
    /// Display a tool name (alphanumeric).
    #[arg(long, value_name = "NAME")]
    pub tool_name: Option<String>,
    /// Enable or disable user follow mode.
    #[arg(long, value_name = "BOOL")]
    pub follow_mode: Option<bool>,
    /// Report the last RFID tag as valid or invalid.
    #[arg(long, value_name = "BOOL")]
    pub rfid_valid: Option<bool>,
}

impl CommandArgs {
    pub fn to_command(&self) -> CliResult<OutboundCommand> {
        if let Some(id) = self.tool_id {
            return Ok(OutboundCommand::ToolId(id));
        }
        if let Some(name) = &self.tool_name {
            return Ok(OutboundCommand::ToolName(name.clone()));
        }
        if let Some(enabled) = self.follow_mode {
            return Ok(OutboundCommand::FollowMode(enabled));
        }
        if let Some(valid) = self.rfid_valid {
            return Ok(OutboundCommand::RfidValidity(valid));
        }
        Err(CliError::new(USAGE, "no command given"))
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Authorised RFID tag (hex). Every other tag is reported invalid.
    #[arg(long, value_name = "HEX", env = "SCREENLINK_RFID_UID")]
    pub rfid_uid: Option<String>,
    /// Do not read commands from stdin.
    #[arg(long)]
    pub no_stdin: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    #[command(flatten)]
    pub command: CommandArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub command: CommandArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Received bytes as hex; whitespace and multiple arguments are joined.
    #[arg(required = true, value_name = "HEX")]
    pub hex: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
