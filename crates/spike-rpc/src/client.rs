//! Correlator: synchronous request/response over the frame stream.
//!
//! Exactly one request is outstanding at a time. Before each request the
//! receive side is drained so stale push events cannot be mistaken for the
//! answer; while waiting, every frame that does not carry the request's
//! token is logged and discarded.

use std::io;
use std::time::{Duration, Instant};

use serde_json::Value;
use spike_protocol::{
    parse_result, Command, CorrelationToken, Frame, HubInfo, ProgramMeta, RemoteError,
    StorageStatus, WriteStart,
};
use tracing::debug;

use crate::config::RpcConfig;
use crate::dispatcher::EventSink;
use crate::error::{Result, RpcError, TransportFault};
use crate::framer::FrameReader;
use crate::transport::Transport;

/// Counters describing what the client has seen and sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Requests written.
    pub requests_sent: u64,
    /// Acknowledgments written.
    pub acknowledgments_sent: u64,
    /// Well-formed frames thrown away by a drain or while awaiting a response.
    pub frames_discarded: u64,
    /// Delimited chunks that did not parse.
    pub frames_malformed: u64,
}

/// RPC client for one hub connection.
pub struct RpcClient<T: Transport> {
    reader: FrameReader<T>,
    config: RpcConfig,
    stats: ClientStats,
}

impl<T: Transport> RpcClient<T> {
    /// Create a client with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, RpcConfig::default())
    }

    /// Create a client with the given configuration.
    pub fn with_config(transport: T, config: RpcConfig) -> Self {
        RpcClient {
            reader: FrameReader::new(transport),
            config,
            stats: ClientStats::default(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Snapshot of the client counters.
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            frames_malformed: self.reader.malformed_count(),
            ..self.stats
        }
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        self.reader.transport()
    }

    /// Release the transport. The client is unusable afterwards.
    pub fn close(&mut self) -> io::Result<()> {
        self.reader.transport_mut().close()
    }

    /// Unwrap the transport.
    pub fn into_transport(self) -> T {
        self.reader.into_transport()
    }

    // ========================================================================
    // Frame primitives
    // ========================================================================

    /// Receive one frame, waiting up to `timeout`.
    pub fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        self.reader.receive_frame(timeout)
    }

    /// Discard every frame that is already buffered or available.
    ///
    /// Returns the number of frames discarded.
    pub fn drain(&mut self) -> Result<usize> {
        let mut drained = 0;
        while let Some(frame) = self.reader.receive_frame(Duration::ZERO)? {
            debug!("discarding stale frame: {}", frame);
            drained += 1;
        }
        self.stats.frames_discarded += drained as u64;
        Ok(drained)
    }

    /// Perform one request and wait for its result.
    ///
    /// Returns the `r` field (`Value::Null` when absent). A response that
    /// carries an `e` field becomes [`RpcError::Remote`].
    pub fn send_request(&mut self, method: &str, params: Value) -> Result<Value> {
        self.drain()?;

        let token = CorrelationToken::mint();
        let frame = Frame::request(method, params, &token);
        debug!("sending: {}", frame);
        self.reader.send_frame(&frame, TransportFault::Write)?;
        self.stats.requests_sent += 1;

        self.await_response(method, &token)
    }

    /// Send a typed command.
    pub fn send_command(&mut self, command: &Command) -> Result<Value> {
        self.send_request(command.method(), command.params())
    }

    /// Answer a push request from the hub with a bare `{i, r: null}`.
    ///
    /// Pending frames are drained first. No response is expected.
    pub fn send_acknowledgment(&mut self, id: &str) -> Result<()> {
        self.drain()?;
        self.write_acknowledgment(id)
    }

    /// Write an acknowledgment without draining.
    ///
    /// Used inside an event stream, where the frames still queued behind the
    /// one being acknowledged belong to the same stream.
    pub(crate) fn write_acknowledgment(&mut self, id: &str) -> Result<()> {
        let frame = Frame::acknowledgment(id);
        debug!("sending: {}", frame);
        self.reader.send_frame(&frame, TransportFault::Acknowledge)?;
        self.stats.acknowledgments_sent += 1;
        Ok(())
    }

    fn await_response(&mut self, method: &str, token: &CorrelationToken) -> Result<Value> {
        let started = Instant::now();
        loop {
            if let Some(frame) = self.reader.receive_frame(self.config.receive_timeout)? {
                if frame.answers(token) {
                    debug!("response: {}", frame);
                    return Self::resolve(frame);
                }
                debug!("while waiting for response: {}", frame);
                self.stats.frames_discarded += 1;
            }

            if let Some(limit) = self.config.response_timeout {
                if started.elapsed() >= limit {
                    return Err(RpcError::ResponseTimeout {
                        method: method.to_string(),
                        timeout: limit,
                    });
                }
            }
        }
    }

    fn resolve(frame: Frame) -> Result<Value> {
        if let Some(encoded) = &frame.error {
            return Err(RemoteError::decode(encoded).into());
        }
        Ok(frame.result.unwrap_or(Value::Null))
    }

    // ========================================================================
    // Hub operations
    // ========================================================================

    /// Storage usage and the programs in each slot.
    pub fn storage_status(&mut self) -> Result<StorageStatus> {
        let command = Command::GetStorageStatus;
        let result = self.send_command(&command)?;
        Ok(parse_result(command.method(), result)?)
    }

    /// Firmware and runtime versions.
    pub fn hub_info(&mut self) -> Result<HubInfo> {
        let command = Command::GetHubInfo;
        let result = self.send_command(&command)?;
        Ok(parse_result(command.method(), result)?)
    }

    /// Run the program in `slot` and stream its events until it finishes.
    pub fn program_execute<S: EventSink + ?Sized>(&mut self, slot: u8, sink: &mut S) -> Result<()> {
        self.send_command(&Command::ProgramExecute { slot })?;
        self.consume_until_done(slot, sink)
    }

    /// Stop the running program.
    pub fn program_terminate(&mut self) -> Result<Value> {
        self.send_command(&Command::ProgramTerminate)
    }

    /// Open an upload into `slot`.
    pub fn start_write_program(&mut self, slot: u8, size: u64, meta: ProgramMeta) -> Result<WriteStart> {
        let command = Command::StartWriteProgram { slot, size, meta };
        let result = self.send_command(&command)?;
        Ok(parse_result(command.method(), result)?)
    }

    /// Send one upload chunk.
    pub fn write_package(&mut self, data: Vec<u8>, transfer_id: &str) -> Result<Value> {
        self.send_command(&Command::WritePackage {
            data,
            transfer_id: transfer_id.to_string(),
        })
    }

    /// Move a program to another slot.
    pub fn move_project(&mut self, from_slot: u8, to_slot: u8) -> Result<Value> {
        self.send_command(&Command::MoveProject { from_slot, to_slot })
    }

    /// Delete the program in `slot`.
    pub fn remove_project(&mut self, slot: u8) -> Result<Value> {
        self.send_command(&Command::RemoveProject { slot })
    }

    /// Set one LED.
    pub fn display_set_pixel(&mut self, x: u8, y: u8, brightness: u8) -> Result<Value> {
        self.send_command(&Command::DisplaySetPixel { x, y, brightness })
    }

    /// Turn all LEDs off.
    pub fn display_clear(&mut self) -> Result<Value> {
        self.send_command(&Command::DisplayClear)
    }

    /// Show a static image.
    pub fn display_image(&mut self, image: &str) -> Result<Value> {
        self.send_command(&Command::DisplayImage {
            image: image.to_string(),
        })
    }

    /// Show an image for `duration_ms` milliseconds.
    pub fn display_image_for(&mut self, image: &str, duration_ms: u32) -> Result<Value> {
        self.send_command(&Command::DisplayImageFor {
            image: image.to_string(),
            duration_ms,
        })
    }

    /// Scroll text across the display.
    pub fn display_text(&mut self, text: &str) -> Result<Value> {
        self.send_command(&Command::DisplayText {
            text: text.to_string(),
        })
    }
}
