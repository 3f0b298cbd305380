//! Connection and engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default serial device of a USB-connected hub.
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Baud rate the hub's USB serial port runs at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long a single blocking read may wait for the first byte.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Wait used while blocking for a response or the next push event.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/ttyACM0` or `COM3`).
    pub path: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Per-read blocking bound.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Settings for the given device with default baud rate and timeout.
    pub fn new(path: impl Into<String>) -> Self {
        SerialConfig {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            path: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Engine timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Timeout passed to each `receive_frame` call while awaiting a response
    /// or streaming events.
    pub receive_timeout: Duration,
    /// Give up on a response after this long. `None` waits forever.
    pub response_timeout: Option<Duration>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        RpcConfig {
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            response_timeout: None,
        }
    }
}

impl RpcConfig {
    /// Bound every response wait.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    /// Change the per-call receive timeout.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }
}
