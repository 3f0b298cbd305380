//! Error types for the RPC engine.
//!
//! Every failure the engine can hit ends up in [`RpcError`]. Callers decide
//! whether to abort; [`RpcError::exit_code`] and [`RpcError::hint`] give a
//! command-line front end everything it needs to report a fault.

use std::fmt;
use std::io;
use std::time::Duration;

use spike_protocol::{ProtocolError, RemoteError};
use thiserror::Error;

/// Which transport operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// Opening the serial device.
    Open,
    /// Reading from the device.
    Read,
    /// Writing a request.
    Write,
    /// Writing an acknowledgment.
    Acknowledge,
}

impl TransportFault {
    /// Numeric fault identifier shown to users.
    pub fn code(&self) -> i32 {
        match self {
            TransportFault::Open => 0,
            TransportFault::Read => 1,
            TransportFault::Write => 2,
            TransportFault::Acknowledge => 3,
        }
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            TransportFault::Open => "open",
            TransportFault::Read => "read",
            TransportFault::Write => "write",
            TransportFault::Acknowledge => "acknowledge",
        };
        write!(f, "{} (fault {})", op, self.code())
    }
}

/// Numeric fault identifier for a failed local file read.
pub const LOCAL_FILE_FAULT_CODE: i32 = -1;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The serial link failed.
    #[error("USB {fault} failed: {source}")]
    Transport {
        /// The failed operation.
        fault: TransportFault,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading the file to upload failed.
    #[error("failed to read the file to upload: {0}")]
    LocalIo(#[source] io::Error),

    /// The hub answered a request with an error.
    #[error("hub reported an error: {0}")]
    Remote(#[from] RemoteError),

    /// A message could not be encoded or a result had the wrong shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No matching response arrived in time.
    #[error("no response to {method} within {timeout:?}")]
    ResponseTimeout {
        /// Request method.
        method: String,
        /// The configured bound.
        timeout: Duration,
    },
}

impl RpcError {
    pub(crate) fn transport(fault: TransportFault) -> impl FnOnce(io::Error) -> RpcError {
        move |source| RpcError::Transport { fault, source }
    }

    /// Historic numeric fault identifier, for transport and local file faults.
    pub fn fault_code(&self) -> Option<i32> {
        match self {
            RpcError::Transport { fault, .. } => Some(fault.code()),
            RpcError::LocalIo(_) => Some(LOCAL_FILE_FAULT_CODE),
            _ => None,
        }
    }

    /// Process exit status for this fault category.
    pub fn exit_code(&self) -> i32 {
        match self {
            RpcError::Remote(_) => 1,
            RpcError::Transport { .. } => 2,
            RpcError::LocalIo(_) => 3,
            RpcError::Protocol(_) => 4,
            RpcError::ResponseTimeout { .. } => 5,
        }
    }

    /// What the user can do about it, if anything.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RpcError::Transport { .. } | RpcError::ResponseTimeout { .. } => {
                Some("Unplug the USB cable and plug it back in after 5 seconds.")
            }
            RpcError::LocalIo(_) => {
                Some("Check that the file to upload exists and is readable, or ask for help.")
            }
            _ => None,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, RpcError>;
