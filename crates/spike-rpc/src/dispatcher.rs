//! Event dispatcher: streams push events while a program runs on the hub.
//!
//! ```text
//! RUNNING --(noise, button, print, error, unknown)--> RUNNING
//! RUNNING --(program status: stopped, program set)--> DONE
//! ```
//!
//! Unknown frames are reported and never end the loop. A transport fault
//! aborts the loop with an error.

use spike_protocol::{ButtonEvent, Event, Frame};
use tracing::{trace, warn};

use crate::client::RpcClient;
use crate::error::Result;
use crate::transport::Transport;

/// Which push payload failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    /// A `userProgram.print` value.
    Print,
    /// A `user_program_error` message or traceback.
    ProgramError,
}

/// Receives everything a running program reports.
pub trait EventSink {
    /// The center button went down.
    fn button_pressed(&mut self);

    /// The center button was released after `duration_ms`.
    fn button_released(&mut self, duration_ms: i64);

    /// The program finished. `frame` is the status frame that said so.
    fn program_finished(&mut self, frame: &Frame);

    /// The program printed `text` (no trailing newline is added).
    fn print(&mut self, text: &str);

    /// The program crashed.
    fn program_error(&mut self, message: &str, traceback: &str);

    /// A print or error payload could not be decoded.
    fn decode_failed(&mut self, failure: DecodeFailure, frame: &Frame);

    /// A frame of unknown format arrived.
    fn unrecognized(&mut self, frame: &Frame);
}

impl<T: Transport> RpcClient<T> {
    /// Stream events of the program started from `slot` until it stops.
    pub fn consume_until_done<S: EventSink + ?Sized>(&mut self, slot: u8, sink: &mut S) -> Result<()> {
        let timeout = self.config().receive_timeout;
        loop {
            let frame = match self.receive_frame(timeout)? {
                Some(frame) => frame,
                None => continue,
            };

            let event = Event::classify(&frame);
            if event.is_terminal() {
                trace!("program in slot {} finished", slot);
                sink.program_finished(&frame);
                return Ok(());
            }

            match event {
                Event::Untagged | Event::Telemetry { .. } | Event::ProgramStatus { .. } => {}
                Event::Button(ButtonEvent::Pressed) => sink.button_pressed(),
                Event::Button(ButtonEvent::Released { duration_ms }) => {
                    sink.button_released(duration_ms)
                }
                Event::Print(print) => match print.text() {
                    Ok(text) => {
                        sink.print(&text);
                        match &print.token {
                            Some(token) => self.write_acknowledgment(token)?,
                            None => warn!("print event without token cannot be acknowledged: {}", frame),
                        }
                    }
                    Err(e) => {
                        trace!("cannot decode print payload: {}", e);
                        sink.decode_failed(DecodeFailure::Print, &frame);
                    }
                },
                Event::ProgramError(error) => match error.decode() {
                    Ok((message, traceback)) => sink.program_error(&message, &traceback),
                    Err(e) => {
                        trace!("cannot decode program error: {}", e);
                        sink.decode_failed(DecodeFailure::ProgramError, &frame);
                    }
                },
                Event::Unrecognized => sink.unrecognized(&frame),
            }
        }
    }
}
