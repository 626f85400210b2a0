use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default serial device on the Raspberry Pi side of the link.
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default link speed.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/serial0`, `/dev/ttyUSB0`).
    pub port: String,
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Read timeout. A read that times out yields zero bytes, not an error.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }
}

/// An open serial link to the peripheral display unit.
///
/// Implements `Read + Write`. Wrap a clone in
/// [`LinkWriter`](crate::LinkWriter) to obtain a transmit capability while
/// keeping this handle for the receive side.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    config: SerialConfig,
}

impl SerialLink {
    /// Open the serial device described by `config`.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;

        info!(port = %config.port, baud_rate = config.baud_rate, "serial link opened");
        Ok(Self {
            port,
            config: config.clone(),
        })
    }

    /// Read whatever bytes are currently available.
    ///
    /// Returns `Ok(0)` when the read timeout elapses with nothing received.
    pub fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.port.read(buf) {
                Ok(n) => {
                    if n > 0 {
                        debug!(len = n, "received bytes");
                    }
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_idle(&err) => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Try to clone this link (a second handle on the same device).
    pub fn try_clone(&self) -> Result<Self> {
        let port = self
            .port
            .try_clone()
            .map_err(|err| TransportError::Io(err.into()))?;
        Ok(Self {
            port,
            config: self.config.clone(),
        })
    }

    /// Settings this link was opened with.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

fn is_idle(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.config.port)
            .field("baud_rate", &self.config.baud_rate)
            .finish()
    }
}
