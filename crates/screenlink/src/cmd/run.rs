use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use screenlink_frame::ArmState;
use screenlink_peer::{
    parse_queue_entry, OutboundCommand, PeripheralEvent, PeripheralHandler, Session,
};
use screenlink_transport::{LinkWriter, SerialLink, Transmit};
use tracing::{debug, error, info};

use crate::cmd::RunArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_events, OutputFormat, ReportedEvent};

const READ_CHUNK: usize = 64;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.serial_config()?;
    let mut reader =
        SerialLink::open(&config).map_err(|err| transport_error("open failed", err))?;
    let writer = reader
        .try_clone()
        .map_err(|err| transport_error("clone failed", err))?;

    let mut session = Session::new(RobotHandler::new(args.rfid_uid), LinkWriter::new(writer));

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut queue = if args.no_stdin {
        None
    } else {
        Some(spawn_command_queue()?)
    };

    info!(port = %config.port, "link running");
    let mut buf = [0u8; READ_CHUNK];
    while running.load(Ordering::SeqCst) {
        let n = reader
            .read_available(&mut buf)
            .map_err(|err| transport_error("read failed", err))?;
        if n > 0 {
            session.feed(&buf[..n]);
        }
        answer_events(&mut session, format);

        if let Some(rx) = &queue {
            if !drain_queue(&mut session, rx) {
                debug!("command queue closed");
                queue = None;
            }
        }
    }

    info!("link stopped");
    Ok(SUCCESS)
}

/// Handler for the deployed robot: records events and queues the RFID
/// validity reply for each scanned tag.
#[derive(Debug, Default)]
pub struct RobotHandler {
    authorised: Option<String>,
    events: Vec<ReportedEvent>,
    replies: Vec<OutboundCommand>,
}

impl RobotHandler {
    pub fn new(authorised: Option<String>) -> Self {
        Self {
            authorised: authorised.map(|uid| uid.trim().to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn take_events(&mut self) -> Vec<ReportedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_replies(&mut self) -> Vec<OutboundCommand> {
        std::mem::take(&mut self.replies)
    }
}

impl PeripheralHandler for RobotHandler {
    fn on_rfid_received(&mut self, rfid: &str) {
        let valid = self.authorised.as_deref() == Some(rfid);
        info!(rfid, valid, "rfid received");
        self.events.push(ReportedEvent {
            event: PeripheralEvent::RfidReceived(rfid.to_string()),
            rfid_valid: Some(valid),
        });
        self.replies.push(OutboundCommand::RfidValidity(valid));
    }

    fn on_battery_level(&mut self, level: u8) {
        debug!(level, "battery level");
        self.events.push(PeripheralEvent::BatteryLevel(level).into());
    }

    fn on_arm_state_changed(&mut self, state: ArmState) {
        info!(state = %state, "arm state changed");
        self.events.push(PeripheralEvent::ArmStateChanged(state).into());
    }
}

/// Print pending events and send queued replies.
fn answer_events<T: Transmit>(session: &mut Session<RobotHandler, T>, format: OutputFormat) {
    let events = session.handler_mut().take_events();
    print_events(&events, format);

    for reply in session.handler_mut().take_replies() {
        if let Err(err) = session.commander_mut().send(&reply) {
            error!(error = %err, "failed to send reply");
        }
    }
}

/// Apply every queued line. Returns false once the queue is closed.
fn drain_queue<H: PeripheralHandler, T: Transmit>(
    session: &mut Session<H, T>,
    rx: &Receiver<String>,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(line) => {
                apply_line(session, &line);
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Apply one JSON command line; returns the number of commands sent.
fn apply_line<H: PeripheralHandler, T: Transmit>(
    session: &mut Session<H, T>,
    line: &str,
) -> usize {
    let line = line.trim();
    if line.is_empty() {
        return 0;
    }

    let entries = match parse_queue_entry(line) {
        Ok(entries) => entries,
        Err(err) => {
            error!(error = %err, "invalid command line");
            return 0;
        }
    };

    let mut sent = 0;
    for (field, value) in entries {
        match session.apply(&field, &value) {
            Ok(Some(command)) => {
                debug!(field = %field, command = ?command, "command applied");
                sent += 1;
            }
            Ok(None) => {}
            Err(err) => error!(field = %field, error = %err, "command rejected"),
        }
    }
    sent
}

fn spawn_command_queue() -> CliResult<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("command-queue".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_err(|err| io_error("failed to start stdin reader", err))?;
    Ok(rx)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
