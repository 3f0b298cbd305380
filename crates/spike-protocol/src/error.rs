//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the hub protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame bytes are not valid UTF-8.
    #[error("invalid UTF-8 in frame")]
    InvalidUtf8,

    /// Frame text is not a valid JSON message.
    #[error("invalid frame JSON: {0}")]
    InvalidJson(String),

    /// A text payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// A response result does not have the expected shape.
    #[error("unexpected result for {method}: {reason}")]
    UnexpectedResult {
        /// Request method the result answers.
        method: String,
        /// Why the result was rejected.
        reason: String,
    },

    /// A frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::InvalidJson(err.to_string())
    }
}

impl From<base64::DecodeError> for ProtocolError {
    fn from(err: base64::DecodeError) -> Self {
        ProtocolError::InvalidBase64(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ProtocolError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        ProtocolError::InvalidUtf8
    }
}
