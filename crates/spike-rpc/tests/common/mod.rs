//! Scripted in-memory hub for driving the engine in tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use serde_json::Value;
use spike_protocol::{Frame, FrameCodec};
use spike_rpc::{DecodeFailure, EventSink, Transport};

type Responder = Box<dyn FnMut(&Frame) -> Vec<Vec<u8>>>;

/// Encode a JSON value as one delimited frame.
pub fn frame_bytes(value: Value) -> Vec<u8> {
    let mut bytes = serde_json::to_vec(&value).unwrap();
    bytes.push(b'\r');
    bytes
}

/// Encode a successful response to `request`.
pub fn reply(request: &Frame, result: Value) -> Vec<u8> {
    frame_bytes(serde_json::json!({ "i": request.id, "r": result }))
}

/// A hub that answers every request through a closure.
///
/// Bytes queued for the client are handed out at most `max_read` at a time
/// so frames arrive split across reads.
pub struct MockHub {
    inbox: VecDeque<u8>,
    outbox: FrameCodec,
    responder: Responder,
    max_read: usize,
    /// Every frame the client wrote, in order.
    pub sent: Vec<Frame>,
    /// Every write as text, delimiter included.
    pub written: Vec<String>,
    /// Bytes still unread by the client at each write.
    pub pending_at_write: Vec<usize>,
    pub closed: bool,
    pub fail_writes: bool,
}

impl MockHub {
    /// A hub that answers every request with `{"r": null}`.
    pub fn new() -> Self {
        Self::with_responder(|request| {
            if request.method.is_some() {
                vec![reply(request, Value::Null)]
            } else {
                Vec::new()
            }
        })
    }

    pub fn with_responder(responder: impl FnMut(&Frame) -> Vec<Vec<u8>> + 'static) -> Self {
        MockHub {
            inbox: VecDeque::new(),
            outbox: FrameCodec::new(),
            responder: Box::new(responder),
            max_read: 5,
            sent: Vec::new(),
            written: Vec::new(),
            pending_at_write: Vec::new(),
            closed: false,
            fail_writes: false,
        }
    }

    /// Queue raw bytes for the client before any request is made.
    pub fn queue(&mut self, bytes: &[u8]) {
        self.inbox.extend(bytes.iter().copied());
    }

    pub fn set_max_read(&mut self, max_read: usize) {
        self.max_read = max_read;
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Frames the client wrote that carry a method.
    pub fn requests(&self) -> Vec<&Frame> {
        self.sent.iter().filter(|f| f.method.is_some()).collect()
    }

    /// Frames the client wrote without a method (acknowledgments).
    pub fn acknowledgments(&self) -> Vec<&Frame> {
        self.sent.iter().filter(|f| f.method.is_none()).collect()
    }
}

impl Transport for MockHub {
    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.inbox.len().min(self.max_read))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max_read).min(self.inbox.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "cable pulled"));
        }
        self.pending_at_write.push(self.inbox.len());
        self.written.push(String::from_utf8_lossy(data).into_owned());
        self.outbox.push(data);
        while let Some(frame) = self.outbox.next_frame() {
            for bytes in (self.responder)(&frame) {
                self.inbox.extend(bytes);
            }
            self.sent.push(frame);
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Everything a sink was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported {
    Pressed,
    Released(i64),
    Finished,
    Printed(String),
    ProgramError(String, String),
    DecodeFailed(DecodeFailure),
    Unrecognized(Frame),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<Reported>,
}

impl EventSink for RecordingSink {
    fn button_pressed(&mut self) {
        self.reports.push(Reported::Pressed);
    }

    fn button_released(&mut self, duration_ms: i64) {
        self.reports.push(Reported::Released(duration_ms));
    }

    fn program_finished(&mut self, _frame: &Frame) {
        self.reports.push(Reported::Finished);
    }

    fn print(&mut self, text: &str) {
        self.reports.push(Reported::Printed(text.to_string()));
    }

    fn program_error(&mut self, message: &str, traceback: &str) {
        self.reports
            .push(Reported::ProgramError(message.to_string(), traceback.to_string()));
    }

    fn decode_failed(&mut self, failure: DecodeFailure, _frame: &Frame) {
        self.reports.push(Reported::DecodeFailed(failure));
    }

    fn unrecognized(&mut self, frame: &Frame) {
        self.reports.push(Reported::Unrecognized(frame.clone()));
    }
}
