//! Delimiter codec for the hub's frame stream.
//!
//! Frames are JSON documents separated by a single carriage return:
//!
//! ```text
//! +----------------------+----+----------------------+----+
//! | {"m":3,"p":[0,0]}    | \r | {"i":"ab12","r":0}   | \r |
//! +----------------------+----+----------------------+----+
//! ```
//!
//! Bytes after the last delimiter are kept until the rest of the frame
//! arrives. A delimited chunk that does not parse is dropped and scanning
//! continues with the next one.

use bytes::{Buf, BytesMut};

use crate::constants::{FRAME_DELIMITER, RECEIVE_BUFFER_CAPACITY};
use crate::error::ProtocolError;
use crate::frame::Frame;

/// A codec for reading and writing delimited frames.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Number of delimited chunks dropped because they did not parse.
    malformed: u64,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(RECEIVE_BUFFER_CAPACITY),
            malformed: 0,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Split off the bytes before the next delimiter, consuming the delimiter.
    ///
    /// Returns `None` if no complete frame is buffered.
    pub fn next_chunk(&mut self) -> Option<BytesMut> {
        let pos = self.buffer.iter().position(|&b| b == FRAME_DELIMITER)?;
        let chunk = self.buffer.split_to(pos);
        self.buffer.advance(1);
        Some(chunk)
    }

    /// Decode the next well-formed frame from the buffer.
    ///
    /// Malformed chunks are logged and skipped. Returns `None` once no
    /// complete chunk remains.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while let Some(chunk) = self.next_chunk() {
            match Frame::parse(&chunk) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    self.malformed += 1;
                    log::debug!(
                        "Cannot parse frame ({}): {}",
                        e,
                        String::from_utf8_lossy(&chunk)
                    );
                }
            }
        }
        None
    }

    /// Encode a frame for transmission, appending the delimiter.
    pub fn encode(frame: &Frame) -> Result<Vec<u8>, ProtocolError> {
        let json = frame.to_json()?;
        let mut buf = Vec::with_capacity(json.len() + 1);
        buf.extend_from_slice(json.as_bytes());
        buf.push(FRAME_DELIMITER);
        Ok(buf)
    }

    /// Number of chunks dropped as malformed so far.
    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
