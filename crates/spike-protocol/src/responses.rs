//! Typed results of hub requests.
//!
//! Results arrive as arbitrary JSON in the `r` field; these types cover the
//! requests whose results the client actually reads. Unknown fields are
//! ignored so newer firmware keeps working.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::error::ProtocolError;
use crate::text::decode_text;

/// Parse a request result into a typed value.
pub fn parse_result<T: DeserializeOwned>(method: &str, result: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(result).map_err(|e| ProtocolError::UnexpectedResult {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Storage
// ============================================================================

/// Result of `get_storage_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageStatus {
    /// Overall storage usage.
    pub storage: StorageSummary,
    /// Programs keyed by slot number (as a string).
    #[serde(default)]
    pub slots: BTreeMap<String, SlotInfo>,
}

impl StorageStatus {
    /// Get the program stored in a slot.
    pub fn slot(&self, slot: u8) -> Option<&SlotInfo> {
        self.slots.get(&slot.to_string())
    }
}

/// Storage usage figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    /// Free space.
    pub free: Number,
    /// Total space.
    pub total: Number,
    /// Unit of `free` and `total` (e.g. `kb`).
    pub unit: String,
}

/// A program stored in a slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Program name, normally base64-encoded.
    #[serde(default)]
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification, milliseconds since the Unix epoch.
    #[serde(default)]
    pub modified: Option<i64>,
    /// Creation, milliseconds since the Unix epoch.
    #[serde(default)]
    pub created: Option<i64>,
    /// Project id.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Program type (e.g. `python`, `scratch`).
    #[serde(default, rename = "type")]
    pub program_type: Option<String>,
    /// Hub-assigned program id.
    #[serde(default)]
    pub id: Option<Value>,
}

impl SlotInfo {
    /// The decoded program name, or the raw name if it is not base64 text.
    pub fn display_name(&self) -> String {
        decode_text(&self.name).unwrap_or_else(|_| self.name.clone())
    }
}

// ============================================================================
// Hub info
// ============================================================================

/// Result of `get_hub_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubInfo {
    /// Firmware version.
    pub firmware: VersionInfo,
    /// Runtime version.
    pub runtime: VersionInfo,
}

/// A component version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version components, most significant first.
    pub version: Vec<u32>,
}

impl VersionInfo {
    /// Format as `a.b.c`.
    pub fn dotted(&self) -> String {
        self.version
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

// ============================================================================
// Upload
// ============================================================================

/// Result of `start_write_program`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStart {
    /// Maximum chunk size the hub accepts.
    #[serde(rename = "blocksize")]
    pub block_size: usize,
    /// Transfer id to quote in every chunk.
    #[serde(rename = "transferid")]
    pub transfer_id: String,
}

// ============================================================================
// Errors
// ============================================================================

/// An error the hub reported for a request.
///
/// The wire form is base64 of a JSON document. If it does not decode, the
/// raw text is kept as a JSON string so nothing is lost.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{payload}")]
pub struct RemoteError {
    /// The structured error payload.
    pub payload: Value,
}

impl RemoteError {
    /// Decode the `e` field of a response.
    pub fn decode(encoded: &str) -> Self {
        let payload = decode_text(encoded)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_else(|| Value::String(encoded.to_string()));
        RemoteError { payload }
    }
}
