use screenlink_frame::ArmState;

/// Callbacks invoked for validated peripheral-originated messages.
///
/// Called synchronously from inside [`Session::feed`](crate::Session::feed),
/// on the byte that completes the frame.
pub trait PeripheralHandler {
    /// An RFID tag was read. `rfid` is lowercase hex.
    fn on_rfid_received(&mut self, rfid: &str);

    /// Battery level changed. 0 is empty, 255 is full.
    fn on_battery_level(&mut self, level: u8);

    /// The robot arm changed state.
    fn on_arm_state_changed(&mut self, state: ArmState);
}

impl<H: PeripheralHandler + ?Sized> PeripheralHandler for &mut H {
    fn on_rfid_received(&mut self, rfid: &str) {
        (**self).on_rfid_received(rfid)
    }

    fn on_battery_level(&mut self, level: u8) {
        (**self).on_battery_level(level)
    }

    fn on_arm_state_changed(&mut self, state: ArmState) {
        (**self).on_arm_state_changed(state)
    }
}

/// A decoded peripheral-originated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralEvent {
    RfidReceived(String),
    BatteryLevel(u8),
    ArmStateChanged(ArmState),
}

impl PeripheralEvent {
    /// Deliver this event to the matching handler callback.
    pub fn deliver<H: PeripheralHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            PeripheralEvent::RfidReceived(rfid) => handler.on_rfid_received(rfid),
            PeripheralEvent::BatteryLevel(level) => handler.on_battery_level(*level),
            PeripheralEvent::ArmStateChanged(state) => handler.on_arm_state_changed(*state),
        }
    }

    /// Short event name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            PeripheralEvent::RfidReceived(_) => "rfid_received",
            PeripheralEvent::BatteryLevel(_) => "battery_level",
            PeripheralEvent::ArmStateChanged(_) => "arm_state_changed",
        }
    }

    /// Battery level scaled to 0–100 %, for battery events.
    pub fn battery_percent(&self) -> Option<f64> {
        match self {
            PeripheralEvent::BatteryLevel(level) => Some(f64::from(*level) / 255.0 * 100.0),
            _ => None,
        }
    }
}

/// Handler that records every event it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<PeripheralEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PeripheralEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<PeripheralEvent> {
        std::mem::take(&mut self.events)
    }
}

impl PeripheralHandler for EventLog {
    fn on_rfid_received(&mut self, rfid: &str) {
        self.events
            .push(PeripheralEvent::RfidReceived(rfid.to_string()));
    }

    fn on_battery_level(&mut self, level: u8) {
        self.events.push(PeripheralEvent::BatteryLevel(level));
    }

    fn on_arm_state_changed(&mut self, state: ArmState) {
        self.events.push(PeripheralEvent::ArmStateChanged(state));
    }
}
