//! Base64 text payloads.
//!
//! The hub base64-encodes anything that may contain arbitrary bytes: printed
//! program output, error payloads, program names and upload chunks.

use base64::prelude::{Engine as _, BASE64_STANDARD};

use crate::error::ProtocolError;

/// Decode a base64 payload into UTF-8 text.
pub fn decode_text(encoded: &str) -> Result<String, ProtocolError> {
    let bytes = BASE64_STANDARD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode raw bytes as base64.
pub fn encode_data(data: &[u8]) -> String {
    BASE64_STANDARD.encode(data)
}
