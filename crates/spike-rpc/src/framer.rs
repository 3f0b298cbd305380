//! Framer: pulls whole frames out of the transport's byte stream.

use std::time::{Duration, Instant};

use spike_protocol::{Frame, FrameCodec};
use tracing::trace;

use crate::error::{Result, RpcError, TransportFault};
use crate::transport::Transport;

/// Largest read issued in one go.
const READ_CHUNK_SIZE: usize = 4096;

/// Owns the transport and the receive buffer.
pub struct FrameReader<T: Transport> {
    transport: T,
    codec: FrameCodec,
    scratch: Vec<u8>,
}

impl<T: Transport> FrameReader<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        FrameReader {
            transport,
            codec: FrameCodec::new(),
            scratch: vec![0; READ_CHUNK_SIZE],
        }
    }

    /// Extract one frame, reading from the transport as needed.
    ///
    /// Returns `Ok(None)` once `timeout` has elapsed (measured from entry)
    /// and the transport has nothing queued. A zero timeout only consumes
    /// what is already buffered or available and never blocks waiting for
    /// new bytes. Malformed frames are skipped.
    pub fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        let start = Instant::now();
        loop {
            if let Some(frame) = self.codec.next_frame() {
                trace!("received: {}", frame);
                return Ok(Some(frame));
            }

            let available = self
                .transport
                .bytes_available()
                .map_err(RpcError::transport(TransportFault::Read))?;
            if available == 0 && start.elapsed() >= timeout {
                return Ok(None);
            }

            let want = available.clamp(1, self.scratch.len());
            let n = self
                .transport
                .read(&mut self.scratch[..want])
                .map_err(RpcError::transport(TransportFault::Read))?;
            self.codec.push(&self.scratch[..n]);
        }
    }

    /// Encode and write one frame.
    pub fn send_frame(&mut self, frame: &Frame, fault: TransportFault) -> Result<()> {
        let bytes = FrameCodec::encode(frame)?;
        self.transport
            .write_all(&bytes)
            .map_err(RpcError::transport(fault))
    }

    /// Number of malformed chunks dropped so far.
    pub fn malformed_count(&self) -> u64 {
        self.codec.malformed_count()
    }

    /// Bytes received but not yet framed.
    pub fn buffered_len(&self) -> usize {
        self.codec.buffered_len()
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwrap the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
