//! The frame: one JSON message on the wire.
//!
//! ```text
//! {"m":"get_hub_info","p":{},"i":"aB3_"}\r
//! {"i":"aB3_","r":{"firmware":{"version":[1,3,0]}}}\r
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::token::CorrelationToken;

/// Method or event tag of a frame.
///
/// Requests and most named events use strings; the hub's periodic push
/// events use small integers. Any other JSON value is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Method {
    /// Integer event tag.
    Code(i64),
    /// Named method or event.
    Name(String),
    /// A tag of some other JSON type.
    Other(Value),
}

impl Method {
    /// Method name, if this is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Method::Name(name) => Some(name),
            Method::Code(_) | Method::Other(_) => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Code(code) => write!(f, "{}", code),
            Method::Name(name) => write!(f, "{}", name),
            Method::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        Method::Name(name.to_string())
    }
}

impl From<i64> for Method {
    fn from(code: i64) -> Self {
        Method::Code(code)
    }
}

/// A single protocol message.
///
/// All fields are optional on the wire; which ones are present decides
/// whether the frame is a request, a response or a push event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Method or event tag (`m`).
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    /// Parameters (`p`).
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Correlation token (`i`). A non-string token is kept in its JSON text
    /// form.
    #[serde(
        rename = "i",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Result (`r`). `Some(Value::Null)` is written as an explicit `null`.
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Base64-encoded JSON error payload (`e`), or its JSON text when the
    /// hub sent something other than a string.
    #[serde(
        rename = "e",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

/// Accept any JSON value where text is expected; `null` counts as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl Frame {
    /// Build a request frame.
    pub fn request(method: impl Into<Method>, params: Value, token: &CorrelationToken) -> Self {
        Frame {
            method: Some(method.into()),
            params: Some(params),
            id: Some(token.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Build the bare `{i, r: null}` reply that acknowledges a push request.
    pub fn acknowledgment(id: &str) -> Self {
        Frame {
            id: Some(id.to_string()),
            result: Some(Value::Null),
            ..Default::default()
        }
    }

    /// Parse a frame from the bytes between two delimiters.
    ///
    /// Anything that is not a JSON object is rejected. Every JSON object is
    /// accepted, whatever the types of its fields.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(data).map_err(|_| ProtocolError::InvalidUtf8)?;
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ProtocolError::InvalidJson(format!(
                "expected a JSON object, got {}",
                text
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to JSON text (without the delimiter).
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Whether this frame carries the given correlation token.
    pub fn answers(&self, token: &CorrelationToken) -> bool {
        self.id.as_deref() == Some(token.as_str())
    }

    /// Parameters as an array, if they are one.
    pub fn params_array(&self) -> Option<&Vec<Value>> {
        self.params.as_ref().and_then(Value::as_array)
    }

    /// Look up a named parameter, if the parameters are an object.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|p| p.get(key))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}
