use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use screenlink_frame::{Direction, MessageDescriptor, ValueKind, REGISTRY};
use screenlink_peer::{OutboundCommand, PeripheralEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct EventOutput<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rfid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rfid_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    battery_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    battery_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arm_state: Option<&'a str>,
    timestamp: String,
}

/// An event as printed, with the RFID verdict when one was given.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedEvent {
    pub event: PeripheralEvent,
    pub rfid_valid: Option<bool>,
}

impl From<PeripheralEvent> for ReportedEvent {
    fn from(event: PeripheralEvent) -> Self {
        Self {
            event,
            rfid_valid: None,
        }
    }
}

impl<'a> EventOutput<'a> {
    fn new(reported: &'a ReportedEvent) -> Self {
        let event = &reported.event;
        let mut out = EventOutput {
            event: event.name(),
            rfid: None,
            rfid_valid: reported.rfid_valid,
            battery_level: None,
            battery_percent: event.battery_percent(),
            arm_state: None,
            timestamp: now_unix_seconds(),
        };
        match event {
            PeripheralEvent::RfidReceived(rfid) => out.rfid = Some(rfid),
            PeripheralEvent::BatteryLevel(level) => out.battery_level = Some(*level),
            PeripheralEvent::ArmStateChanged(state) => out.arm_state = Some(state.name()),
        }
        out
    }
}

/// One-line human summary of an event's value.
pub fn event_value(reported: &ReportedEvent) -> String {
    let event = &reported.event;
    match event {
        PeripheralEvent::RfidReceived(rfid) => match reported.rfid_valid {
            Some(true) => format!("{rfid} (valid)"),
            Some(false) => format!("{rfid} (invalid)"),
            None => rfid.clone(),
        },
        PeripheralEvent::BatteryLevel(level) => {
            let percent = event.battery_percent().unwrap_or_default();
            format!("{level} ({percent:.0}%)")
        }
        PeripheralEvent::ArmStateChanged(state) => state.name().to_string(),
    }
}

/// Print events; JSON output is one object per line.
pub fn print_events(events: &[ReportedEvent], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for event in events {
                println!(
                    "{}",
                    serde_json::to_string(&EventOutput::new(event))
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            if events.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "VALUE"]);
            for event in events {
                table.add_row(vec![event.event.name().to_string(), event_value(event)]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for event in events {
                println!("event={} value={}", event.event.name(), event_value(event));
            }
        }
    }
}

/// Print a command together with the frame bytes it encodes to.
pub fn print_command(command: &OutboundCommand, frame: &[u8], format: OutputFormat) {
    let frame_hex = hex::encode(frame);
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_value(command).unwrap_or_default();
            if let Some(map) = out.as_object_mut() {
                map.insert("frame".to_string(), serde_json::Value::String(frame_hex));
            }
            println!("{out}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "CODE", "FRAME"])
                .add_row(vec![
                    command.msg_type().name().to_string(),
                    format!("0x{:02x}", command.msg_type().code()),
                    frame_hex,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("type={} frame={}", command.msg_type(), frame_hex);
        }
    }
}

#[derive(Serialize)]
struct CatalogEntry {
    code: String,
    name: &'static str,
    direction: &'static str,
    length: usize,
    value: String,
}

impl From<&MessageDescriptor> for CatalogEntry {
    fn from(desc: &MessageDescriptor) -> Self {
        Self {
            code: format!("0x{:02x}", desc.msg_type.code()),
            name: desc.msg_type.name(),
            direction: direction_name(desc.direction),
            length: desc.length,
            value: kind_name(desc.kind),
        }
    }
}

pub fn print_catalog(format: OutputFormat) {
    let entries: Vec<CatalogEntry> = REGISTRY.iter().map(CatalogEntry::from).collect();
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "NAME", "DIRECTION", "LENGTH", "VALUE"]);
            for entry in entries {
                table.add_row(vec![
                    entry.code,
                    entry.name.to_string(),
                    entry.direction.to_string(),
                    entry.length.to_string(),
                    entry.value,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!(
                    "{} {:<20} {:<15} len={:<2} {}",
                    entry.code, entry.name, entry.direction, entry.length, entry.value
                );
            }
        }
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::ToPeripheral => "to_peripheral",
        Direction::FromPeripheral => "from_peripheral",
    }
}

fn kind_name(kind: ValueKind) -> String {
    match kind {
        ValueKind::Integer { min, max } => format!("integer {min}..={max}"),
        ValueKind::Text => "text".to_string(),
        ValueKind::Boolean => "boolean".to_string(),
        ValueKind::ArmState => "arm_state".to_string(),
        ValueKind::RawBytes => "raw_bytes".to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use screenlink_frame::ArmState;

    use super::*;

    #[test]
    fn battery_event_output_carries_percent() {
        let event = ReportedEvent::from(PeripheralEvent::BatteryLevel(255));
        let out = EventOutput::new(&event);
        assert_eq!(out.event, "battery_level");
        assert_eq!(out.battery_level, Some(255));
        assert_eq!(out.battery_percent, Some(100.0));
        assert_eq!(out.rfid, None);
    }

    #[test]
    fn rfid_event_json_omits_empty_fields() {
        let event = ReportedEvent::from(PeripheralEvent::RfidReceived("deadbeef".into()));
        let json = serde_json::to_value(EventOutput::new(&event)).unwrap();
        assert_eq!(json["event"], "rfid_received");
        assert_eq!(json["rfid"], "deadbeef");
        assert!(json.get("rfid_valid").is_none());
        assert!(json.get("battery_level").is_none());
        assert!(json.get("arm_state").is_none());
    }

    #[test]
    fn rfid_verdict_is_reported() {
        let event = ReportedEvent {
            event: PeripheralEvent::RfidReceived("deadbeef".into()),
            rfid_valid: Some(false),
        };
        let json = serde_json::to_value(EventOutput::new(&event)).unwrap();
        assert_eq!(json["rfid_valid"], false);
        assert_eq!(event_value(&event), "deadbeef (invalid)");
    }

    #[test]
    fn event_values_are_readable() {
        assert_eq!(
            event_value(&PeripheralEvent::ArmStateChanged(ArmState::Closed).into()),
            "closed"
        );
        assert_eq!(event_value(&PeripheralEvent::BatteryLevel(0).into()), "0 (0%)");
    }

    #[test]
    fn catalog_entry_formats_code() {
        let entry = CatalogEntry::from(&REGISTRY[6]);
        assert_eq!(entry.code, "0x84");
        assert_eq!(entry.name, "rfid_value");
        assert_eq!(entry.direction, "from_peripheral");
        assert_eq!(entry.length, 4);
    }
}
