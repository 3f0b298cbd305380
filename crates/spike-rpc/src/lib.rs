//! # spike-rpc
//!
//! Synchronous RPC engine for LEGO SPIKE hubs connected over USB serial.
//!
//! The engine is built from four parts that share one owned receive buffer:
//!
//! - **Framer** ([`FrameReader`]): turns the byte stream into frames,
//!   skipping malformed ones.
//! - **Correlator** ([`RpcClient::send_request`]): drains stale frames,
//!   sends a request with a fresh token and waits for the frame carrying
//!   that token, discarding everything else.
//! - **Event dispatcher** ([`RpcClient::consume_until_done`]): streams a
//!   running program's push events into an [`EventSink`].
//! - **Upload driver** ([`RpcClient::upload`]): start, chunked writes and
//!   an optional execute.
//!
//! Every failure is returned as an [`RpcError`]; nothing here exits the
//! process.
//!
//! ## Example
//!
//! ```no_run
//! use spike_rpc::{RpcClient, SerialConfig, SerialTransport};
//!
//! let transport = SerialTransport::open(&SerialConfig::new("/dev/ttyACM0"))?;
//! let mut client = RpcClient::new(transport);
//!
//! let info = client.hub_info()?;
//! println!("firmware {}", info.firmware.dotted());
//! # Ok::<(), spike_rpc::RpcError>(())
//! ```

mod client;
mod config;
mod dispatcher;
mod error;
mod framer;
mod transport;
mod upload;

pub use client::{ClientStats, RpcClient};
pub use config::{
    RpcConfig, SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_DEVICE, DEFAULT_READ_TIMEOUT,
    DEFAULT_RECEIVE_TIMEOUT,
};
pub use dispatcher::{DecodeFailure, EventSink};
pub use error::{Result, RpcError, TransportFault, LOCAL_FILE_FAULT_CODE};
pub use framer::FrameReader;
pub use transport::{SerialTransport, Transport};
pub use upload::{TransferSession, UploadProgress, UploadRequest};
