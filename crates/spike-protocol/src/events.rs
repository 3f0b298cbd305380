//! Push events sent by the hub while a program runs.
//!
//! The hub interleaves several kinds of unsolicited frames with responses.
//! [`Event::classify`] maps any frame onto a closed set of variants once, so
//! consumers can `match` exhaustively instead of probing tags and shapes.

use serde_json::Value;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::{Frame, Method};
use crate::text::decode_text;

/// Center button activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// The button went down.
    Pressed,
    /// The button was released after being held.
    Released {
        /// How long it was held, in milliseconds, as the hub reported it.
        duration_ms: i64,
    },
}

/// Text printed by the user program.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintEvent {
    /// Token the hub expects to be acknowledged, if it sent one.
    pub token: Option<String>,
    /// The base64 payload as received.
    pub value: Value,
}

impl PrintEvent {
    /// Decode the printed text.
    pub fn text(&self) -> Result<String, ProtocolError> {
        decode_payload(&self.value)
    }
}

/// An uncaught exception in the user program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramErrorEvent {
    /// Base64 error message.
    pub message: Value,
    /// Base64 traceback.
    pub traceback: Value,
}

impl ProgramErrorEvent {
    /// Decode `(message, traceback)`.
    pub fn decode(&self) -> Result<(String, String), ProtocolError> {
        Ok((decode_payload(&self.message)?, decode_payload(&self.traceback)?))
    }
}

/// A frame classified by its method tag and parameter shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// No method tag: a stray response or an empty object.
    Untagged,

    /// High-frequency sensor telemetry.
    Telemetry {
        /// The integer event tag.
        code: i64,
    },

    /// Center button press or release.
    Button(ButtonEvent),

    /// Program running state changed.
    ProgramStatus {
        /// Slot (or other identifier) of the program, `None` when absent/null.
        slot: Option<Value>,
        /// Whether a program is running.
        running: bool,
    },

    /// Program output that must be acknowledged.
    Print(PrintEvent),

    /// Program crashed.
    ProgramError(ProgramErrorEvent),

    /// A tag or shape this client does not know.
    Unrecognized,
}

impl Event {
    /// Classify a frame.
    pub fn classify(frame: &Frame) -> Event {
        let method = match &frame.method {
            Some(method) => method,
            None => return Event::Untagged,
        };

        match method {
            Method::Code(code) if EVENT_TELEMETRY_CODES.contains(code) => {
                Event::Telemetry { code: *code }
            }
            Method::Code(EVENT_BUTTON) => {
                Self::classify_button(frame).unwrap_or(Event::Unrecognized)
            }
            Method::Code(EVENT_PROGRAM_STATUS) => {
                Self::classify_program_status(frame).unwrap_or(Event::Unrecognized)
            }
            Method::Name(name) if name == EVENT_USER_PROGRAM_PRINT => {
                match frame.param("value") {
                    Some(value) => Event::Print(PrintEvent {
                        token: frame.id.clone(),
                        value: value.clone(),
                    }),
                    None => Event::Unrecognized,
                }
            }
            Method::Name(name) if name == EVENT_USER_PROGRAM_ERROR => {
                match frame.params_array() {
                    Some(params) if params.len() == PROGRAM_ERROR_PARAM_COUNT => {
                        Event::ProgramError(ProgramErrorEvent {
                            message: params[PROGRAM_ERROR_MESSAGE_INDEX].clone(),
                            traceback: params[PROGRAM_ERROR_TRACEBACK_INDEX].clone(),
                        })
                    }
                    _ => Event::Unrecognized,
                }
            }
            _ => Event::Unrecognized,
        }
    }

    fn classify_button(frame: &Frame) -> Option<Event> {
        let params = frame.params_array()?;
        if params.len() != BUTTON_PARAM_COUNT {
            return None;
        }
        let duration = params[1].as_f64()?;
        if duration == 0.0 {
            Some(Event::Button(ButtonEvent::Pressed))
        } else {
            Some(Event::Button(ButtonEvent::Released {
                duration_ms: duration.round() as i64,
            }))
        }
    }

    fn classify_program_status(frame: &Frame) -> Option<Event> {
        let params = frame.params_array()?;
        if params.len() != PROGRAM_STATUS_PARAM_COUNT {
            return None;
        }
        let slot = match &params[0] {
            Value::Null => None,
            other => Some(other.clone()),
        };
        Some(Event::ProgramStatus {
            slot,
            running: is_truthy(&params[1]),
        })
    }

    /// Whether this event ends a program run.
    ///
    /// Only a "not running" status naming a program counts; the hub also
    /// reports a null program at startup.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::ProgramStatus { slot: Some(_), running: false })
    }
}

fn decode_payload(value: &Value) -> Result<String, ProtocolError> {
    match value.as_str() {
        Some(encoded) => decode_text(encoded),
        None => Err(ProtocolError::InvalidBase64(format!(
            "expected a string, got {}",
            value
        ))),
    }
}

/// JSON truthiness: `null`, `false`, zero, `""`, `[]` and `{}` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
